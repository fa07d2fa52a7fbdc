/// Front-end session: which screen is up, the round in progress and the
/// result of the last one.
///
/// Phase flow:
///   Title ──ENTER──▶ Playing ──round over──▶ RoundOver ──Y──▶ Playing
///     ▲                 │ ESC                    │ N / ESC
///     └─────────────────┴────────────────────────┘
///
/// Round-over is observed through the round's callback: it exports the
/// traces and parks a `RoundResult` that `poll_finished` picks up.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::rules::MAX_PLAYERS;
use crate::error::SetupError;
use crate::sim::export::export_traces;
use crate::sim::round::Round;
use crate::sim::snapshot::Snapshot;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    RoundOver,
}

/// Outcome of a finished round, as shown on the result screen.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub winner: Option<usize>,
    pub scores: Vec<f64>,
    pub ticks: u64,
    /// None when export is disabled.
    pub export: Option<ExportStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExportStatus {
    Saved(PathBuf),
    Failed(String),
}

impl RoundResult {
    fn from_snapshot(snap: &Snapshot, export_to: Option<&PathBuf>) -> Self {
        let export = export_to.map(|dir| match export_traces(snap, dir) {
            Ok(files) => {
                info!(dir = %dir.display(), files = files.len(), "traces exported");
                ExportStatus::Saved(dir.clone())
            }
            Err(e) => {
                warn!("trace export failed: {e}");
                ExportStatus::Failed(e.to_string())
            }
        });
        RoundResult {
            winner: snap.winner(),
            scores: snap.players.iter().map(|p| p.score).collect(),
            ticks: snap.tick,
            export,
        }
    }
}

pub struct Session {
    pub phase: Phase,
    /// Player count chosen on the title screen.
    pub players: usize,
    pub round: Option<Round>,
    pub result: Option<RoundResult>,
    /// Round wins per player slot across this session.
    pub wins: [u32; MAX_PLAYERS],
    pub rounds_played: u32,
    /// One-line notice (setup errors and the like).
    pub message: String,
    finished: Rc<RefCell<Option<RoundResult>>>,
}

impl Session {
    pub fn new(players: usize) -> Self {
        Session {
            phase: Phase::Title,
            players: players.clamp(1, MAX_PLAYERS),
            round: None,
            result: None,
            wins: [0; MAX_PLAYERS],
            rounds_played: 0,
            message: String::new(),
            finished: Rc::new(RefCell::new(None)),
        }
    }

    // ── Title ──

    pub fn select_players(&mut self, n: usize) {
        self.players = n.clamp(1, MAX_PLAYERS);
    }

    pub fn more_players(&mut self) {
        self.select_players(self.players + 1);
    }

    pub fn fewer_players(&mut self) {
        self.select_players(self.players.saturating_sub(1));
    }

    // ── Round lifecycle ──

    /// Build a fresh round for the selected player count.
    pub fn start_round(&mut self, config: &GameConfig) -> Result<(), SetupError> {
        let setup = config.round_setup(self.players)?;
        let mut round = Round::new(&setup)?;

        let export_to = config.export.enabled.then(|| config.export_dir());
        let slot = Rc::clone(&self.finished);
        round.on_round_over(move |snap| {
            *slot.borrow_mut() = Some(RoundResult::from_snapshot(snap, export_to.as_ref()));
        });

        info!(players = self.players, "round started");
        self.finished.borrow_mut().take();
        self.round = Some(round);
        self.result = None;
        self.message.clear();
        self.phase = Phase::Playing;
        Ok(())
    }

    /// Move to the result screen once the round has reported in.
    pub fn poll_finished(&mut self) -> bool {
        let Some(result) = self.finished.borrow_mut().take() else { return false };
        if let Some(w) = result.winner {
            self.wins[w] += 1;
        }
        self.rounds_played += 1;
        self.result = Some(result);
        self.phase = Phase::RoundOver;
        true
    }

    pub fn back_to_title(&mut self) {
        if self.phase == Phase::Playing {
            info!("round abandoned");
        }
        self.round = None;
        self.phase = Phase::Title;
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.round.as_ref().map(Round::snapshot)
    }

    /// Scores to print on exit: the round on screen, else the last result.
    pub fn final_scores(&self) -> Vec<f64> {
        if let Some(snap) = self.snapshot() {
            return snap.players.iter().map(|p| p.score).collect();
        }
        self.result.as_ref().map(|r| r.scores.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::parse(
            "[round]\nstart_paused = false\n[field]\nwidth = 100.0\nheight = 100.0\n[export]\nenabled = false\n",
        )
    }

    fn play_out(session: &mut Session) {
        for _ in 0..10_000 {
            if let Some(round) = session.round.as_mut() {
                round.tick();
            }
            if session.poll_finished() {
                return;
            }
        }
        panic!("round never ended");
    }

    #[test]
    fn player_count_is_clamped() {
        let mut s = Session::new(9);
        assert_eq!(s.players, 4);
        s.more_players();
        assert_eq!(s.players, 4);
        s.select_players(1);
        s.fewer_players();
        assert_eq!(s.players, 1);
    }

    #[test]
    fn solo_round_runs_to_result() {
        let mut s = Session::new(1);
        s.start_round(&config()).unwrap();
        assert_eq!(s.phase, Phase::Playing);
        assert!(!s.poll_finished());

        play_out(&mut s);
        assert_eq!(s.phase, Phase::RoundOver);
        let result = s.result.as_ref().unwrap();
        assert_eq!(result.winner, None);
        // 20 ticks of 2.5 reach the top border of a 100 × 100 field
        assert_eq!(result.scores, vec![50.0]);
        assert_eq!(result.export, None);
        assert_eq!(s.rounds_played, 1);
        assert_eq!(s.final_scores(), vec![50.0]);
    }

    #[test]
    fn play_again_starts_a_clean_round() {
        let mut s = Session::new(1);
        s.start_round(&config()).unwrap();
        play_out(&mut s);
        s.start_round(&config()).unwrap();
        assert_eq!(s.phase, Phase::Playing);
        assert!(s.result.is_none());
        assert_eq!(s.snapshot().unwrap().tick, 0);
    }

    #[test]
    fn bad_config_keeps_title_screen() {
        let cfg = GameConfig::parse("[speed]\nbase_speed = -1.0\n");
        let mut s = Session::new(2);
        assert!(s.start_round(&cfg).is_err());
        assert_eq!(s.phase, Phase::Title);
        assert!(s.round.is_none());
    }

    #[test]
    fn abandon_returns_to_title() {
        let mut s = Session::new(2);
        s.start_round(&config()).unwrap();
        s.back_to_title();
        assert_eq!(s.phase, Phase::Title);
        assert!(s.snapshot().is_none());
    }

    #[test]
    fn export_runs_inside_round_over() {
        let dir = std::env::temp_dir().join(format!("linecross_session_{}", std::process::id()));
        let cfg = GameConfig::parse(&format!(
            "[round]\nstart_paused = false\n[field]\nwidth = 100.0\nheight = 100.0\n[export]\ndir = {:?}\n",
            dir.display().to_string()
        ));
        let mut s = Session::new(1);
        s.start_round(&cfg).unwrap();
        play_out(&mut s);

        let result = s.result.as_ref().unwrap();
        assert_eq!(result.export, Some(ExportStatus::Saved(dir.clone())));
        let csv = std::fs::read_to_string(dir.join("player1_trace.csv")).unwrap();
        assert_eq!(csv, "player1_x,player1_y\n0.00,0.00\n0.00,50.00\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
