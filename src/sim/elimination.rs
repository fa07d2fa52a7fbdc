/// Elimination resolver: runs once per tick, after movement and the border
/// check.
///
/// Only players that moved this tick ("movers", alive when the step began)
/// are tested; each is tested through its tail, the segment from its last
/// breakpoint to its head. A tail keeps covering earlier crossings until the
/// next turn, so every hit goes through the distance rule: freezing a player
/// that is already frozen is a no-op.
///
///   1. Self-check   tail vs own stored segments, minus the one ending at
///                   the tail's start. Doubling back onto that segment also
///                   counts.
///   2. Cross-check  tail vs every other player's full polyline.
///
/// ## Cross-check outcome at hit point P
/// ┌───────────────────────────────┬───────────────────────────┐
/// │ Other player                   │ Frozen                    │
/// ├───────────────────────────────┼───────────────────────────┤
/// │ |P-head_self| < |P-head_other| │ self                      │
/// │ |P-head_other| < |P-head_self| │ other                     │
/// │ equal                          │ both                      │
/// └───────────────────────────────┴───────────────────────────┘
///
/// Freezes are collected first and applied afterwards, so roster order
/// never changes who ends up frozen.

use tracing::info;

use crate::domain::entity::Player;
use crate::domain::geometry::{intersect, segments, Point, Segment};
use super::event::{FreezeCause, GameEvent};

/// Distances closer than this count as a tie.
const TIE_EPSILON: f64 = 1e-6;

// ══════════════════════════════════════════════════════════════
// Entry point
// ══════════════════════════════════════════════════════════════

/// Detect and apply this tick's collisions. `movers[i]` is true when player
/// i was alive at the start of the step.
pub fn resolve(players: &mut [Player], movers: &[bool], events: &mut Vec<GameEvent>) {
    for (id, cause) in find_collisions(players, movers) {
        if players[id].freeze() {
            info!(player = id, ?cause, "player frozen");
            events.push(GameEvent::Frozen { id, cause });
        }
    }
}

/// Every (player, cause) pair to freeze. A player may appear more than once;
/// the first entry is the reported cause.
pub fn find_collisions(players: &[Player], movers: &[bool]) -> Vec<(usize, FreezeCause)> {
    let mut freezes = Vec::new();

    for (i, player) in players.iter().enumerate() {
        if !moved(movers, i) {
            continue;
        }
        // no movement since the last breakpoint: nothing to test
        let Some(tail) = player.tail() else { continue };

        if hits_own_trail(player, &tail) {
            freezes.push((i, FreezeCause::SelfTrail));
            continue;
        }

        for (j, other) in players.iter().enumerate() {
            if j == i {
                continue;
            }
            let Some(hit) = first_hit(&tail, &other.polyline()) else { continue };

            let di = hit.distance(player.position());
            let dj = hit.distance(other.position());
            if (di - dj).abs() <= TIE_EPSILON {
                freezes.push((i, FreezeCause::HeadOn { other: j }));
                freezes.push((j, FreezeCause::HeadOn { other: i }));
            } else if di < dj {
                freezes.push((i, FreezeCause::Trail { other: j }));
            } else {
                freezes.push((j, FreezeCause::Trail { other: i }));
            }
        }
    }

    freezes
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

fn moved(movers: &[bool], id: usize) -> bool {
    movers.get(id).copied().unwrap_or(false)
}

fn hits_own_trail(player: &Player, tail: &Segment) -> bool {
    if let Some(prev) = player.trace.predecessor() {
        if prev.reverses(tail) {
            return true;
        }
    }
    player
        .trace
        .settled_segments()
        .any(|s| intersect(tail, &s).is_some())
}

/// Hit on `polyline` closest to where the tail started.
fn first_hit(tail: &Segment, polyline: &[Point]) -> Option<Point> {
    segments(polyline)
        .filter_map(|r| intersect(tail, &r))
        .min_by(|a, b| {
            a.distance(tail.start)
                .total_cmp(&b.distance(tail.start))
        })
}
