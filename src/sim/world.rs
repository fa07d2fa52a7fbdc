/// GameState: everything a running round owns.
///
/// The roster is fixed at setup and never resized. Players are mutated
/// only by the step (`advance`) and the elimination resolver (`freeze`).
/// `round_over` is terminal: once set, no further simulation steps run.

use crate::domain::entity::{Heading, Player};
use crate::domain::geometry::Point;
use crate::domain::rules::{self, Field, MAX_PLAYERS};
use crate::error::SetupError;

/// Starting placement for one player.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Spawn {
    pub position: Point,
    pub heading: Heading,
}

/// Everything needed to build a round.
#[derive(Clone, Debug)]
pub struct RoundSetup {
    pub field: Field,
    pub base_speed: f64,
    pub start_paused: bool,
    pub spawns: Vec<Spawn>,
}

impl RoundSetup {
    /// Standard layout for `players` players (see `rules::spawn_points`).
    pub fn standard(players: usize, field: Field, base_speed: f64) -> Self {
        let spawns = rules::spawn_points(players, &field)
            .into_iter()
            .map(|(position, heading)| Spawn { position, heading })
            .collect();
        RoundSetup { field, base_speed, start_paused: false, spawns }
    }

    pub fn paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub players: Vec<Player>,
    pub field: Field,
    pub elimination_threshold: usize,
    pub paused: bool,
    pub round_over: bool,
    /// Simulation steps executed (paused ticks excluded).
    pub tick: u64,
}

impl GameState {
    pub fn new(setup: &RoundSetup) -> Result<Self, SetupError> {
        if setup.spawns.is_empty() {
            return Err(SetupError::NoPlayers);
        }
        if setup.spawns.len() > MAX_PLAYERS {
            return Err(SetupError::TooManyPlayers {
                requested: setup.spawns.len(),
                max: MAX_PLAYERS,
            });
        }
        if !(setup.base_speed.is_finite() && setup.base_speed > 0.0) {
            return Err(SetupError::InvalidBaseSpeed(setup.base_speed));
        }
        // re-validate: Field's fields are public
        let field = Field::new(setup.field.width, setup.field.height)?;

        let players: Vec<Player> = setup
            .spawns
            .iter()
            .enumerate()
            .map(|(id, s)| Player::new(id, s.position, s.heading, setup.base_speed))
            .collect();

        Ok(GameState {
            elimination_threshold: rules::elimination_threshold(players.len()),
            players,
            field,
            paused: setup.start_paused,
            round_over: false,
            tick: 0,
        })
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn survivors(&self) -> Vec<usize> {
        self.players.iter().filter(|p| p.alive).map(|p| p.id).collect()
    }

    pub fn player_mut(&mut self, id: usize) -> Option<&mut Player> {
        self.players.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field::new(400.0, 300.0).unwrap()
    }

    #[test]
    fn zero_players_is_a_setup_error() {
        let setup = RoundSetup::standard(0, field(), 2.5);
        assert_eq!(GameState::new(&setup).unwrap_err(), SetupError::NoPlayers);
    }

    #[test]
    fn oversized_roster_is_a_setup_error() {
        let setup = RoundSetup::standard(6, field(), 2.5);
        assert_eq!(
            GameState::new(&setup).unwrap_err(),
            SetupError::TooManyPlayers { requested: 6, max: 4 }
        );
        assert!(GameState::new(&RoundSetup::standard(MAX_PLAYERS, field(), 2.5)).is_ok());
    }

    #[test]
    fn bad_field_is_a_setup_error() {
        let mut setup = RoundSetup::standard(1, field(), 2.5);
        setup.field.height = 0.0;
        assert!(matches!(GameState::new(&setup), Err(SetupError::InvalidField { .. })));
    }

    #[test]
    fn bad_speed_is_a_setup_error() {
        let setup = RoundSetup::standard(1, field(), 0.0);
        assert_eq!(GameState::new(&setup).unwrap_err(), SetupError::InvalidBaseSpeed(0.0));
    }

    #[test]
    fn thresholds_follow_roster_size() {
        let solo = GameState::new(&RoundSetup::standard(1, field(), 2.5)).unwrap();
        assert_eq!(solo.elimination_threshold, 0);
        let duel = GameState::new(&RoundSetup::standard(2, field(), 2.5)).unwrap();
        assert_eq!(duel.elimination_threshold, 1);
        assert_eq!(duel.alive_count(), 2);
        assert_eq!(duel.survivors(), vec![0, 1]);
    }

    #[test]
    fn paused_flag_comes_from_setup() {
        let s = GameState::new(&RoundSetup::standard(1, field(), 2.5).paused(true)).unwrap();
        assert!(s.paused);
        assert!(!s.round_over);
        assert_eq!(s.tick, 0);
    }
}
