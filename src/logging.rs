/// Log setup. The terminal is in raw mode on the alternate screen while the
/// game runs, so events go to `linecross.log` in the data directory.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Best effort: if the
/// file cannot be opened, logging stays off.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "linecross.log";

/// Install the global subscriber. Returns the log path when it succeeded.
pub fn init(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(LOG_FILE);
    let file = open_log(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "panic");
        default_hook(info);
    }));

    Some(path)
}

fn open_log(path: &Path) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}
