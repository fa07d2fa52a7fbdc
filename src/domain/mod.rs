//! Pure game logic: geometry, traces, players and round rules.

pub mod entity;
pub mod geometry;
pub mod rules;
pub mod trace;
