/// Read-only view of a round, handed to the renderer, the round-over
/// callback and the trace exporter. Positions and polylines are already
/// rounded.

use crate::domain::entity::Heading;
use crate::domain::geometry::Point;
use super::world::GameState;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub id: usize,
    pub position: Point,
    pub heading: Heading,
    pub speed: f64,
    pub score: f64,
    pub alive: bool,
    pub polyline: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub paused: bool,
    pub round_over: bool,
    pub width: f64,
    pub height: f64,
    pub players: Vec<PlayerView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        Snapshot {
            tick: state.tick,
            paused: state.paused,
            round_over: state.round_over,
            width: state.field.width,
            height: state.field.height,
            players: state
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    position: p.position(),
                    heading: p.heading,
                    speed: p.speed,
                    score: p.score,
                    alive: p.alive,
                    polyline: p.polyline(),
                })
                .collect(),
        }
    }

    pub fn survivors(&self) -> Vec<usize> {
        self.players.iter().filter(|p| p.alive).map(|p| p.id).collect()
    }

    /// The single survivor of a multi-player round, if there is one.
    pub fn winner(&self) -> Option<usize> {
        match self.survivors().as_slice() {
            [id] if self.players.len() > 1 => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Field;
    use crate::sim::world::RoundSetup;

    fn state(players: usize) -> GameState {
        let setup = RoundSetup::standard(players, Field::new(300.0, 200.0).unwrap(), 2.5);
        GameState::new(&setup).unwrap()
    }

    #[test]
    fn capture_copies_every_player() {
        let snap = Snapshot::capture(&state(2));
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.players[0].position, Point::new(50.0, 0.0));
        assert_eq!(snap.players[1].position, Point::new(-50.0, 0.0));
        assert_eq!(snap.players[0].polyline, vec![Point::new(50.0, 0.0)]);
        assert_eq!(snap.width, 300.0);
        assert!(!snap.round_over);
    }

    #[test]
    fn winner_needs_a_lone_survivor_of_many() {
        let mut s = state(2);
        assert_eq!(Snapshot::capture(&s).winner(), None);
        s.players[1].freeze();
        assert_eq!(Snapshot::capture(&s).winner(), Some(0));
        s.players[0].freeze();
        assert_eq!(Snapshot::capture(&s).winner(), None);

        let solo = state(1);
        assert_eq!(Snapshot::capture(&solo).winner(), None);
    }
}
