/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/linecross`. Falls back to defaults if the file is
/// missing or incomplete. Values are validated when a round is built,
/// not at load time.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::rules::{Field, MAX_PLAYERS};
use crate::error::SetupError;
use crate::sim::world::RoundSetup;

const APP_DIR: &str = "linecross";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub field: FieldConfig,
    pub round: RoundConfig,
    pub export: ExportConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub base_speed: f64,
}

#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug)]
pub struct RoundConfig {
    pub players: usize,     // title-screen default
    pub start_paused: bool,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub enabled: bool,
    pub dir: Option<PathBuf>,   // None = data directory
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    field: TomlField,
    #[serde(default)]
    round: TomlRound,
    #[serde(default)]
    export: TomlExport,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_base_speed")]
    base_speed: f64,
}

#[derive(Deserialize, Debug)]
struct TomlField {
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_height")]
    height: f64,
}

#[derive(Deserialize, Debug)]
struct TomlRound {
    #[serde(default = "default_players")]
    players: usize,
    #[serde(default = "default_start_paused")]
    start_paused: bool,
}

#[derive(Deserialize, Debug)]
struct TomlExport {
    #[serde(default = "default_export_enabled")]
    enabled: bool,
    #[serde(default)]
    dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_turn_left")]
    turn_left: Vec<String>,
    #[serde(default = "default_turn_right")]
    turn_right: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 40 }      // 25 ticks/s
fn default_base_speed() -> f64 { 2.5 }
fn default_width() -> f64 { 480.0 }
fn default_height() -> f64 { 360.0 }
fn default_players() -> usize { 1 }
fn default_start_paused() -> bool { true }
fn default_export_enabled() -> bool { true }

fn default_turn_left() -> Vec<String> { vec!["L1".into(), "X".into()] }
fn default_turn_right() -> Vec<String> { vec!["R1".into(), "B".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate(), base_speed: default_base_speed() }
    }
}

impl Default for TomlField {
    fn default() -> Self {
        TomlField { width: default_width(), height: default_height() }
    }
}

impl Default for TomlRound {
    fn default() -> Self {
        TomlRound { players: default_players(), start_paused: default_start_paused() }
    }
}

impl Default for TomlExport {
    fn default() -> Self {
        TomlExport { enabled: default_export_enabled(), dir: String::new() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            turn_left: default_turn_left(),
            turn_right: default_turn_right(),
            pause: default_pause(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        GameConfig::from_toml(load_toml(&search_dirs))
    }

    /// Parse a config document. Parse errors yield the defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                warn!("config parse error, using defaults: {e}");
                GameConfig::from_toml(TomlConfig::default())
            }
        }
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let export_dir = Some(cfg.export.dir)
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms,
                base_speed: cfg.speed.base_speed,
            },
            field: FieldConfig {
                width: cfg.field.width,
                height: cfg.field.height,
            },
            round: RoundConfig {
                players: title_players(cfg.round.players),
                start_paused: cfg.round.start_paused,
            },
            export: ExportConfig {
                enabled: cfg.export.enabled,
                dir: export_dir,
            },
            gamepad: GamepadConfig {
                turn_left: cfg.gamepad.turn_left,
                turn_right: cfg.gamepad.turn_right,
                pause: cfg.gamepad.pause,
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export.dir.clone().unwrap_or_else(data_dir)
    }

    pub fn tick_period(&self) -> Result<Duration, SetupError> {
        if self.speed.tick_rate_ms == 0 {
            return Err(SetupError::InvalidTickRate);
        }
        Ok(Duration::from_millis(self.speed.tick_rate_ms))
    }

    /// Validated setup for a round with `players` players.
    pub fn round_setup(&self, players: usize) -> Result<RoundSetup, SetupError> {
        if players == 0 {
            return Err(SetupError::NoPlayers);
        }
        if players > MAX_PLAYERS {
            return Err(SetupError::TooManyPlayers { requested: players, max: MAX_PLAYERS });
        }
        let base = self.speed.base_speed;
        if !(base.is_finite() && base > 0.0) {
            return Err(SetupError::InvalidBaseSpeed(base));
        }
        self.tick_period()?;
        let field = Field::new(self.field.width, self.field.height)?;
        Ok(RoundSetup::standard(players, field, base).paused(self.round.start_paused))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

/// Title-screen player count, clamped into 1..=MAX_PLAYERS with a warning.
fn title_players(requested: usize) -> usize {
    let players = requested.clamp(1, MAX_PLAYERS);
    if players != requested {
        warn!(requested, used = players, "[round] players out of range");
    }
    players
}

// ── Paths ──

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (symlinks resolved)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Writable directory for the log file and trace exports.
pub fn data_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_linecross");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    info!(path = %path.display(), "loaded config");
                    return cfg;
                }
                Err(e) => {
                    warn!(path = %path.display(), "config parse error, using defaults: {e}");
                    return TomlConfig::default();
                }
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.speed.tick_rate_ms, 40);
        assert_eq!(cfg.speed.base_speed, 2.5);
        assert_eq!(cfg.field.width, 480.0);
        assert_eq!(cfg.field.height, 360.0);
        assert_eq!(cfg.round.players, 1);
        assert!(cfg.round.start_paused);
        assert!(cfg.export.enabled);
        assert_eq!(cfg.gamepad.pause, vec!["Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[speed]\nbase_speed = 4.0\n\n[round]\nplayers = 3\nstart_paused = false\n",
        );
        assert_eq!(cfg.speed.base_speed, 4.0);
        assert_eq!(cfg.speed.tick_rate_ms, 40);
        assert_eq!(cfg.round.players, 3);
        assert!(!cfg.round.start_paused);
    }

    #[test]
    fn broken_document_falls_back_to_defaults() {
        let cfg = GameConfig::parse("[speed\nbase_speed = ");
        assert_eq!(cfg.speed.base_speed, 2.5);
    }

    #[test]
    fn export_dir_override() {
        let cfg = GameConfig::parse("[export]\nenabled = false\ndir = \"/tmp/traces\"\n");
        assert!(!cfg.export.enabled);
        assert_eq!(cfg.export_dir(), PathBuf::from("/tmp/traces"));
        assert_eq!(GameConfig::parse("[export]\ndir = \"  \"\n").export.dir, None);
    }

    #[test]
    fn title_player_count_is_clamped() {
        assert_eq!(GameConfig::parse("[round]\nplayers = 9\n").round.players, MAX_PLAYERS);
        assert_eq!(GameConfig::parse("[round]\nplayers = 0\n").round.players, 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn clamped_player_count_is_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let counts = tracing::subscriber::with_default(subscriber, || {
            [title_players(9), title_players(2), title_players(0)]
        });
        assert_eq!(counts, [MAX_PLAYERS, 2, 1]);

        let log = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(log.matches("[round] players out of range").count(), 2);
        assert!(log.contains("requested=9"));
    }

    #[test]
    fn round_setup_validates() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.round_setup(0).unwrap_err(), SetupError::NoPlayers);
        assert_eq!(
            cfg.round_setup(5).unwrap_err(),
            SetupError::TooManyPlayers { requested: 5, max: 4 }
        );

        let setup = cfg.round_setup(2).unwrap();
        assert_eq!(setup.spawns.len(), 2);
        assert!(setup.start_paused);
        assert_eq!(setup.base_speed, 2.5);
    }

    #[test]
    fn bad_values_are_reported_not_defaulted() {
        let cfg = GameConfig::parse("[field]\nwidth = -10.0\n");
        assert!(matches!(cfg.round_setup(1), Err(SetupError::InvalidField { .. })));

        let cfg = GameConfig::parse("[speed]\nbase_speed = 0.0\n");
        assert_eq!(cfg.round_setup(1).unwrap_err(), SetupError::InvalidBaseSpeed(0.0));

        let cfg = GameConfig::parse("[speed]\ntick_rate_ms = 0\n");
        assert_eq!(cfg.round_setup(1).unwrap_err(), SetupError::InvalidTickRate);
        assert_eq!(cfg.tick_period().unwrap_err(), SetupError::InvalidTickRate);
    }
}
