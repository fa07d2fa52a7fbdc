/// Trace export: one CSV per player, written when a round ends.
///
/// ## File format
///   `player{n}_trace.csv`, n 1-based.
///   Header `player{n}_x,player{n}_y`, then one `x,y` row per polyline
///   point (breakpoints followed by the final head), two decimals.
///
/// Write-only: nothing in the game reads these back.

use std::path::{Path, PathBuf};

use crate::error::ExportError;
use super::snapshot::{PlayerView, Snapshot};

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn trace_filename(id: usize) -> String {
    format!("player{}_trace.csv", id + 1)
}

// ══════════════════════════════════════════════════════════════
// Export
// ══════════════════════════════════════════════════════════════

/// Write every player's trace into `dir`. Returns the files written.
pub fn export_traces(snapshot: &Snapshot, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(snapshot.players.len());
    for view in &snapshot.players {
        let path = dir.join(trace_filename(view.id));
        std::fs::write(&path, trace_csv(view))
            .map_err(|source| ExportError::Io { path: path.clone(), source })?;
        written.push(path);
    }
    Ok(written)
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

pub fn trace_csv(view: &PlayerView) -> String {
    let n = view.id + 1;
    let mut out = String::with_capacity(32 + view.polyline.len() * 16);
    out.push_str(&format!("player{n}_x,player{n}_y\n"));
    for p in &view.polyline {
        out.push_str(&format!("{:.2},{:.2}\n", p.x, p.y));
    }
    out
}
