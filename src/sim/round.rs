/// Round: the scheduler-facing surface of the engine.
///
/// Owns the GameState and is driven from a single thread. Commands take
/// `&mut self`, so they can only land between ticks.

use tracing::debug;

use crate::domain::entity::Turn;
use crate::error::SetupError;
use super::clock::TickClock;
use super::event::GameEvent;
use super::snapshot::Snapshot;
use super::step::step;
use super::world::{GameState, RoundSetup};

type RoundOverCallback = Box<dyn FnMut(&Snapshot)>;

pub struct Round {
    state: GameState,
    on_round_over: Option<RoundOverCallback>,
    notified: bool,
}

impl Round {
    pub fn new(setup: &RoundSetup) -> Result<Self, SetupError> {
        Ok(Round {
            state: GameState::new(setup)?,
            on_round_over: None,
            notified: false,
        })
    }

    /// Rotate a player's heading by 90°. Returns whether it was applied:
    /// unknown ids, frozen players and finished rounds are ignored. Turns are
    /// accepted while paused, so players can aim before the round starts.
    pub fn submit_turn(&mut self, player: usize, turn: Turn) -> bool {
        if self.state.round_over {
            return false;
        }
        match self.state.player_mut(player) {
            Some(p) if p.alive => {
                let heading = p.turn(turn);
                debug!(player, ?turn, ?heading, "turn");
                true
            }
            _ => false,
        }
    }

    /// Flip the pause flag; returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.paused = !self.state.paused;
        debug!(paused = self.state.paused, "pause toggled");
        self.state.paused
    }

    pub fn is_over(&self) -> bool {
        self.state.round_over
    }

    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Register the round-over callback. It runs once, inside the tick that
    /// ends the round.
    pub fn on_round_over<F>(&mut self, callback: F)
    where
        F: FnMut(&Snapshot) + 'static,
    {
        self.on_round_over = Some(Box::new(callback));
    }

    /// One scheduler tick: a simulation step unless paused or finished.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let events = step(&mut self.state);
        if self.state.round_over && !self.notified {
            self.notified = true;
            if let Some(callback) = self.on_round_over.as_mut() {
                let snap = Snapshot::capture(&self.state);
                callback(&snap);
            }
        }
        events
    }

    /// Wait for the next deadline, then tick.
    pub fn run_tick(&mut self, clock: &mut TickClock) -> Vec<GameEvent> {
        clock.wait();
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;
    use crate::domain::entity::Heading;
    use crate::domain::geometry::Point;
    use crate::domain::rules::Field;

    fn round(players: usize, paused: bool) -> Round {
        let setup = RoundSetup::standard(players, Field::new(100.0, 100.0).unwrap(), 2.5)
            .paused(paused);
        Round::new(&setup).unwrap()
    }

    #[test]
    fn oversized_roster_rejected() {
        let setup = RoundSetup::standard(6, Field::new(100.0, 100.0).unwrap(), 2.5);
        assert!(matches!(Round::new(&setup), Err(SetupError::TooManyPlayers { requested: 6, .. })));
    }

    #[test]
    fn zero_players_rejected() {
        let setup = RoundSetup::standard(0, Field::new(100.0, 100.0).unwrap(), 2.5);
        assert!(matches!(Round::new(&setup), Err(SetupError::NoPlayers)));
    }

    #[test]
    fn turns_are_accepted_while_paused() {
        let mut r = round(1, true);
        assert!(r.submit_turn(0, Turn::Right));
        assert_eq!(r.snapshot().players[0].heading, Heading::East);
        // the paused tick moves nobody
        assert!(r.tick().is_empty());
        assert_eq!(r.snapshot().players[0].position, Point::ORIGIN);

        assert!(!r.toggle_pause());
        r.tick();
        let snap = r.snapshot();
        let view = &snap.players[0];
        assert_eq!(view.position, Point::new(2.5, 0.0));
        assert_eq!(view.polyline, vec![Point::ORIGIN, Point::new(2.5, 0.0)]);
    }

    #[test]
    fn unknown_or_frozen_players_cannot_turn() {
        let mut r = round(2, false);
        assert!(!r.submit_turn(7, Turn::Right));
        r.state.players[1].freeze();
        assert!(!r.submit_turn(1, Turn::Right));
        assert!(r.submit_turn(0, Turn::Right));
    }

    #[test]
    fn paused_ticks_do_not_advance() {
        let mut r = round(1, true);
        for _ in 0..5 {
            assert!(r.tick().is_empty());
        }
        let snap = r.snapshot();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.players[0].position, Point::new(0.0, 0.0));
        r.toggle_pause();
        r.tick();
        assert_eq!(r.snapshot().players[0].position, Point::new(0.0, 2.5));
    }

    #[test]
    fn round_over_callback_fires_exactly_once() {
        let mut r = round(1, false);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        r.on_round_over(move |snap| {
            assert!(snap.round_over);
            seen.set(seen.get() + 1);
        });
        // 20 ticks reach the border at y = 50
        for _ in 0..30 {
            r.tick();
        }
        assert!(r.is_over());
        assert_eq!(calls.get(), 1);
        assert!(!r.submit_turn(0, Turn::Left));
    }

    #[test]
    fn run_tick_paces_with_the_clock() {
        let mut r = round(1, false);
        let mut clock = TickClock::new(Duration::from_millis(5));
        r.run_tick(&mut clock);
        r.run_tick(&mut clock);
        assert_eq!(r.snapshot().tick, 2);
    }
}
