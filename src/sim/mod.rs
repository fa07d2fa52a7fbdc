pub mod clock;
pub mod elimination;
pub mod event;
pub mod export;
pub mod round;
pub mod snapshot;
pub mod step;
pub mod world;
