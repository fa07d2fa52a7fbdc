/// The step function: advances the round by one simulation tick.
///
/// Processing order:
///   1. Score: every alive player gains its current speed
///   2. Speed: recomputed from score (0 once frozen)
///   3. Movement along each heading
///   4. Border check (freeze anything on or past the edge)
///   5. Elimination resolver (self / cross collisions)
///   6. Round-over check against the elimination threshold
///
/// Nothing happens while paused or after the round is over; the scheduler
/// still counts the tick, the simulation does not.

use tracing::info;

use crate::domain::rules;
use super::elimination;
use super::event::{FreezeCause, GameEvent};
use super::world::GameState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut GameState) -> Vec<GameEvent> {
    if state.paused || state.round_over {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    state.tick += 1;

    let movers: Vec<bool> = state.players.iter().map(|p| p.alive).collect();

    advance_players(state);
    resolve_border(state, &mut events);
    elimination::resolve(&mut state.players, &movers, &mut events);
    resolve_round_over(state, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn advance_players(state: &mut GameState) {
    for p in state.players.iter_mut() {
        if p.alive {
            p.score += p.speed;
        }
        p.speed = rules::speed_for(p.base_speed, p.score, p.alive);
        p.advance();
    }
}

// ══════════════════════════════════════════════════════════════
// Border
// ══════════════════════════════════════════════════════════════

fn resolve_border(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let field = state.field;
    for p in state.players.iter_mut().filter(|p| p.alive) {
        if rules::is_out_of_bounds(p.position(), &field) && p.freeze() {
            info!(player = p.id, x = p.position().x, y = p.position().y, "hit the border");
            events.push(GameEvent::Frozen { id: p.id, cause: FreezeCause::Border });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Round over
// ══════════════════════════════════════════════════════════════

fn resolve_round_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.alive_count() > state.elimination_threshold {
        return;
    }
    state.round_over = true;
    let survivors = state.survivors();
    info!(tick = state.tick, ?survivors, "round over");
    events.push(GameEvent::RoundOver { survivors });
}
