/// Entities: Heading, Turn and Player.
/// A player only ever moves along one of four cardinal headings.

use super::geometry::{Point, Segment};
use super::trace::Trace;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

/// Turn command: ±90°.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Turn {
    Left,
    Right,
}

impl Heading {
    /// Unit step. y grows upwards, origin at the field centre.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Heading::North => (0.0, 1.0),
            Heading::East => (1.0, 0.0),
            Heading::South => (0.0, -1.0),
            Heading::West => (-1.0, 0.0),
        }
    }

    pub fn turned(self, turn: Turn) -> Heading {
        match (self, turn) {
            (Heading::North, Turn::Left) => Heading::West,
            (Heading::West, Turn::Left) => Heading::South,
            (Heading::South, Turn::Left) => Heading::East,
            (Heading::East, Turn::Left) => Heading::North,
            (Heading::North, Turn::Right) => Heading::East,
            (Heading::East, Turn::Right) => Heading::South,
            (Heading::South, Turn::Right) => Heading::West,
            (Heading::West, Turn::Right) => Heading::North,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Heading::North => "N",
            Heading::East => "E",
            Heading::South => "S",
            Heading::West => "W",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: usize,
    pub heading: Heading,
    pub trace: Trace,
    pub score: f64,
    pub speed: f64,
    pub base_speed: f64,
    pub alive: bool,
    // unrounded accumulator; read through `position()`
    pos: Point,
}

impl Player {
    pub fn new(id: usize, start: Point, heading: Heading, base_speed: f64) -> Self {
        Player {
            id,
            heading,
            trace: Trace::new(start),
            score: 0.0,
            speed: base_speed,
            base_speed,
            alive: true,
            pos: start,
        }
    }

    /// Current head, rounded to the fixed precision.
    pub fn position(&self) -> Point {
        self.pos.rounded()
    }

    /// Rotate 90° and record the turn point.
    pub fn turn(&mut self, turn: Turn) -> Heading {
        self.heading = self.heading.turned(turn);
        let here = self.position();
        self.trace.record(here);
        self.heading
    }

    /// Move `speed` units along the heading.
    pub fn advance(&mut self) {
        let (dx, dy) = self.heading.unit();
        self.pos.x += dx * self.speed;
        self.pos.y += dy * self.speed;
    }

    pub fn tail(&self) -> Option<Segment> {
        self.trace.tail(self.position())
    }

    pub fn polyline(&self) -> Vec<Point> {
        self.trace.polyline(self.position())
    }

    /// Permanently stop this player. Returns true only on the first call.
    pub fn freeze(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        self.speed = 0.0;
        was_alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_lefts_and_four_rights_come_home() {
        let mut h = Heading::North;
        for _ in 0..4 { h = h.turned(Turn::Left); }
        assert_eq!(h, Heading::North);
        for _ in 0..4 { h = h.turned(Turn::Right); }
        assert_eq!(h, Heading::North);
        assert_eq!(Heading::North.turned(Turn::Right), Heading::East);
        assert_eq!(Heading::North.turned(Turn::Left), Heading::West);
    }

    #[test]
    fn new_player_starts_alive_at_base_speed() {
        let p = Player::new(0, Point::new(-5.0, 0.0), Heading::North, 2.5);
        assert!(p.alive);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.speed, 2.5);
        assert_eq!(p.position(), Point::new(-5.0, 0.0));
        assert_eq!(p.trace.breakpoints(), &[Point::new(-5.0, 0.0)]);
    }

    #[test]
    fn move_then_turn_then_move() {
        let mut p = Player::new(0, Point::ORIGIN, Heading::East, 0.5);
        p.advance();
        assert_eq!(p.turn(Turn::Left), Heading::North);
        p.advance();
        assert_eq!(p.position(), Point::new(0.5, 0.5));
        assert_eq!(p.trace.breakpoints(), &[Point::ORIGIN, Point::new(0.5, 0.0)]);
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut p = Player::new(0, Point::ORIGIN, Heading::North, 2.5);
        assert!(p.freeze());
        assert!(!p.freeze());
        assert!(!p.alive);
        assert_eq!(p.speed, 0.0);
    }
}
