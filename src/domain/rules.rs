/// Round rules: pure functions, no side effects.
///
/// ## Border (inclusive)
/// ┌──────────────────────────────┬──────────────┐
/// │ Condition                     │ Out?         │
/// ├──────────────────────────────┼──────────────┤
/// │ |x| >= width / 2              │ YES          │
/// │ |y| >= height / 2             │ YES          │
/// │ Otherwise                     │ NO           │
/// └──────────────────────────────┴──────────────┘
/// Touching the boundary is a collision; nobody rides the edge.
///
/// ## Speed (step function of score)
/// speed = base × alive × (floor(score / 1000) × 0.5 + 1)
///
/// ## Elimination threshold
/// 1 % players → 0 for a solo round, 1 (last one standing) otherwise.

use super::entity::Heading;
use super::geometry::{round2, Point};
use crate::error::SetupError;

/// Score units per speed step.
pub const SCORE_STEP: f64 = 1000.0;
/// Fraction of base speed gained per step.
pub const STEP_BONUS: f64 = 0.5;
/// Roster limit (one key pair per player).
pub const MAX_PLAYERS: usize = 4;

/// Play field centred on the origin.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

impl Field {
    pub fn new(width: f64, height: f64) -> Result<Self, SetupError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SetupError::InvalidField { width, height });
        }
        Ok(Field { width, height })
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

pub fn is_out_of_bounds(p: Point, field: &Field) -> bool {
    p.x.abs() >= field.half_width() || p.y.abs() >= field.half_height()
}

/// Speed for a given score; a frozen player's speed is 0.
pub fn speed_for(base_speed: f64, score: f64, alive: bool) -> f64 {
    let alive = if alive { 1.0 } else { 0.0 };
    base_speed * alive * ((score / SCORE_STEP).floor() * STEP_BONUS + 1.0)
}

/// Alive count at or below which the round ends. `players` must be > 0.
pub fn elimination_threshold(players: usize) -> usize {
    1 % players
}

/// Starting layout: players spread evenly along y = 0, all heading North.
/// Player 1 is rightmost.
pub fn spawn_points(players: usize, field: &Field) -> Vec<(Point, Heading)> {
    let gap = round2(field.width / (players as f64 + 1.0));
    (1..=players)
        .map(|i| {
            let x = round2(field.half_width() - i as f64 * gap);
            (Point::new(x, 0.0), Heading::North)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(w: f64, h: f64) -> Field {
        Field::new(w, h).unwrap()
    }

    #[test]
    fn field_rejects_non_positive_dimensions() {
        assert!(Field::new(0.0, 10.0).is_err());
        assert!(Field::new(10.0, -1.0).is_err());
        assert!(Field::new(f64::NAN, 10.0).is_err());
        assert!(Field::new(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn border_is_inclusive() {
        let f = field(100.0, 100.0);
        for &(x, y, out) in &[
            (49.0, 0.0, false), (50.0, 0.0, true), (51.0, 0.0, true),
            (-49.0, 0.0, false), (-50.0, 0.0, true), (-51.0, 0.0, true),
            (0.0, 49.0, false), (0.0, 50.0, true), (0.0, 51.0, true),
            (0.0, -49.0, false), (0.0, -50.0, true), (0.0, -51.0, true),
        ] {
            assert_eq!(is_out_of_bounds(Point::new(x, y), &f), out, "({x}, {y})");
        }
    }

    #[test]
    fn border_uses_each_axis_own_extent() {
        let f = field(200.0, 100.0);
        assert!(!is_out_of_bounds(Point::new(99.99, 0.0), &f));
        assert!(is_out_of_bounds(Point::new(0.0, 50.0), &f));
    }

    #[test]
    fn speed_steps_every_thousand() {
        assert_eq!(speed_for(2.5, 0.0, true), 2.5);
        assert_eq!(speed_for(2.5, 999.0, true), 2.5);
        assert_eq!(speed_for(2.5, 1000.0, true), 3.75);
        assert_eq!(speed_for(2.5, 1999.0, true), 3.75);
        assert_eq!(speed_for(2.5, 2000.0, true), 5.0);
    }

    #[test]
    fn frozen_speed_is_zero() {
        assert_eq!(speed_for(2.5, 1500.0, false), 0.0);
    }

    #[test]
    fn threshold_solo_vs_multi() {
        assert_eq!(elimination_threshold(1), 0);
        assert_eq!(elimination_threshold(2), 1);
        assert_eq!(elimination_threshold(4), 1);
    }

    #[test]
    fn spawn_spreads_players_across_width() {
        let f = field(400.0, 300.0);
        let one = spawn_points(1, &f);
        assert_eq!(one, vec![(Point::new(0.0, 0.0), Heading::North)]);

        let three: Vec<f64> = spawn_points(3, &f).iter().map(|(p, _)| p.x).collect();
        assert_eq!(three, vec![100.0, 0.0, -100.0]);
    }
}
