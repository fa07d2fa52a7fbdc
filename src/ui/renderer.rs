/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The play field is scaled to fit the terminal. World y grows upwards and
/// the origin sits at the field centre; screen rows grow downwards.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Heading;
use crate::domain::geometry::Point;
use crate::domain::rules::MAX_PLAYERS;
use crate::sim::snapshot::{PlayerView, Snapshot};
use super::session::{ExportStatus, Phase, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// Clear colour and every cell's background match exactly.
    const BASE_BG: Color = Color::Rgb { r: 12, g: 12, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Viewport: world → screen mapping
// ══════════════════════════════════════════════════════════════

/// Terminal cells are roughly twice as tall as wide.
const CELL_ASPECT: f64 = 2.0;

/// Field area on screen, in cells, excluding the border.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    pub cols: usize,
    pub rows: usize,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Largest area within `avail_cols × avail_rows` that keeps the field's
    /// aspect ratio.
    pub fn fit(avail_cols: usize, avail_rows: usize, width: f64, height: f64) -> Self {
        let avail_cols = avail_cols.max(1);
        let avail_rows = avail_rows.max(1);
        let ratio = width / height * CELL_ASPECT;
        let (cols, rows) = if avail_cols as f64 >= avail_rows as f64 * ratio {
            ((avail_rows as f64 * ratio).round() as usize, avail_rows)
        } else {
            (avail_cols, (avail_cols as f64 / ratio).round() as usize)
        };
        Viewport {
            cols: cols.clamp(1, avail_cols),
            rows: rows.clamp(1, avail_rows),
            width,
            height,
        }
    }

    /// (col, row) of a world point, clamped into the viewport.
    pub fn to_cell(&self, p: Point) -> (usize, usize) {
        let fx = (p.x + self.width / 2.0) / self.width;
        let fy = (self.height / 2.0 - p.y) / self.height;
        let col = (fx * self.cols as f64).floor().clamp(0.0, (self.cols - 1) as f64);
        let row = (fy * self.rows as f64).floor().clamp(0.0, (self.rows - 1) as f64);
        (col as usize, row as usize)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Up,
    Down,
    Left,
    Right,
}

fn screen_dir(a: (usize, usize), b: (usize, usize)) -> Option<Side> {
    use std::cmp::Ordering::*;
    match (b.0.cmp(&a.0), b.1.cmp(&a.1)) {
        (Greater, _) => Some(Side::Right),
        (Less, _) => Some(Side::Left),
        (Equal, Less) => Some(Side::Up),
        (Equal, Greater) => Some(Side::Down),
        (Equal, Equal) => None,
    }
}

fn opposite(s: Side) -> Side {
    match s {
        Side::Up => Side::Down,
        Side::Down => Side::Up,
        Side::Left => Side::Right,
        Side::Right => Side::Left,
    }
}

/// Box-drawing glyph joining two sides of a cell.
fn joint(a: Side, b: Side) -> char {
    use Side::*;
    match (a, b) {
        (Left, Right) | (Right, Left) => '─',
        (Up, Down) | (Down, Up) => '│',
        (Left, Down) | (Down, Left) => '┐',
        (Left, Up) | (Up, Left) => '┘',
        (Right, Down) | (Down, Right) => '┌',
        (Right, Up) | (Up, Right) => '└',
        _ => '┼',
    }
}

/// Cells and glyphs for a trail polyline. Later entries overwrite earlier.
pub fn rasterize(polyline: &[Point], vp: &Viewport) -> Vec<(usize, usize, char)> {
    let cells: Vec<(usize, usize)> = polyline.iter().map(|&p| vp.to_cell(p)).collect();
    let mut out = Vec::new();
    let mut dirs: Vec<Option<Side>> = Vec::with_capacity(cells.len());

    for w in cells.windows(2) {
        let (a, b) = (w[0], w[1]);
        let dir = screen_dir(a, b);
        dirs.push(dir);
        let Some(d) = dir else { continue };
        let glyph = joint(d, opposite(d));
        if a.1 == b.1 {
            for c in a.0.min(b.0)..=a.0.max(b.0) {
                out.push((c, a.1, glyph));
            }
        } else {
            for r in a.1.min(b.1)..=a.1.max(b.1) {
                out.push((a.0, r, glyph));
            }
        }
    }

    // corners at the breakpoints
    for (i, pair) in dirs.windows(2).enumerate() {
        if let (Some(din), Some(dout)) = (pair[0], pair[1]) {
            if din != dout && din != opposite(dout) {
                let (c, r) = cells[i + 1];
                out.push((c, r, joint(opposite(din), dout)));
            }
        }
    }
    out
}

// ══════════════════════════════════════════════════════════════
// Renderer
// ══════════════════════════════════════════════════════════════

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 2;
/// Rows below the field: gap + help bar.
const FOOTER_ROWS: usize = 2;

const PLAYER_COLORS: [Color; MAX_PLAYERS] = [
    Color::Rgb { r: 80, g: 220, b: 255 },
    Color::Rgb { r: 255, g: 160, b: 60 },
    Color::Rgb { r: 120, g: 255, b: 120 },
    Color::Rgb { r: 255, g: 100, b: 220 },
];

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BORDER: Color = Color::Rgb { r: 120, g: 120, b: 160 };
const CRASH: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const ACCENT: Color = Color::Rgb { r: 255, g: 220, b: 50 };

/// Turn keys per player, as shown in help text.
pub const KEY_HINTS: [&str; MAX_PLAYERS] = ["←/→", "A/D", "J/L", "Z/C"];

fn player_color(id: usize) -> Color {
    PLAYER_COLORS[id % MAX_PLAYERS]
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        if self.last_phase != Some(session.phase) {
            self.invalidate()?;
            self.last_phase = Some(session.phase);
        }

        self.front.clear();

        match session.phase {
            Phase::Title => self.compose_title(session),
            Phase::Playing | Phase::RoundOver => {
                if let Some(snap) = session.snapshot() {
                    self.compose_game(&snap);
                    if snap.paused && session.phase == Phase::Playing {
                        self.compose_pause_overlay();
                    }
                }
                if session.phase == Phase::RoundOver {
                    self.compose_round_over(session);
                }
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Force a full repaint on the next flush.
    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
            // next row always needs an explicit move
            need_move = true;
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn viewport(&self, snap: &Snapshot) -> Viewport {
        let avail_cols = self.front.width.saturating_sub(2);
        let avail_rows = self.front.height.saturating_sub(FIELD_ROW + 2 + FOOTER_ROWS);
        Viewport::fit(avail_cols, avail_rows, snap.width, snap.height)
    }

    fn compose_game(&mut self, snap: &Snapshot) {
        self.compose_hud(snap);

        let vp = self.viewport(snap);
        let (ox, oy) = (1, FIELD_ROW + 1);
        self.compose_border(vp.cols, vp.rows);

        for p in &snap.players {
            let color = player_color(p.id);
            for (c, r, glyph) in rasterize(&p.polyline, &vp) {
                self.front.set(ox + c, oy + r, Cell::new(glyph, color, Color::Reset));
            }
        }
        // heads on top of every trail
        for p in &snap.players {
            let (c, r) = vp.to_cell(p.position);
            let (glyph, fg) = head_glyph(p);
            self.front.set(ox + c, oy + r, Cell::new(glyph, fg, Color::Reset));
        }

        let help_row = FIELD_ROW + vp.rows + 3;
        if help_row < self.front.height {
            let mut help = String::from(" ");
            for (i, keys) in KEY_HINTS.iter().enumerate().take(snap.players.len()) {
                help.push_str(&format!("P{} {}  ", i + 1, keys));
            }
            help.push_str("│ SPACE Pause  ESC Title");
            self.front.put_str(0, help_row, &help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_hud(&mut self, snap: &Snapshot) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let mut x = 1;
        for p in &snap.players {
            let status = if p.alive { p.heading.label() } else { "✕" };
            let text = format!("P{} {} {:>7.1} v{:.2}  ", p.id + 1, status, p.score, p.speed);
            self.front.put_str(x, HUD_ROW, &text, player_color(p.id), HUD_BG);
            x += text.chars().count();
        }
        let tick = format!("tick {}", snap.tick);
        let tx = self.front.width.saturating_sub(tick.len() + 1);
        if tx > x {
            self.front.put_str(tx, HUD_ROW, &tick, Color::Grey, HUD_BG);
        }
    }

    fn compose_border(&mut self, cols: usize, rows: usize) {
        let top = FIELD_ROW;
        let bottom = FIELD_ROW + rows + 1;
        let right = cols + 1;
        for x in 1..right {
            self.front.set(x, top, Cell::new('═', BORDER, Color::Reset));
            self.front.set(x, bottom, Cell::new('═', BORDER, Color::Reset));
        }
        for y in top + 1..bottom {
            self.front.set(0, y, Cell::new('║', BORDER, Color::Reset));
            self.front.set(right, y, Cell::new('║', BORDER, Color::Reset));
        }
        self.front.set(0, top, Cell::new('╔', BORDER, Color::Reset));
        self.front.set(right, top, Cell::new('╗', BORDER, Color::Reset));
        self.front.set(0, bottom, Cell::new('╚', BORDER, Color::Reset));
        self.front.set(right, bottom, Cell::new('╝', BORDER, Color::Reset));
    }

    fn compose_title(&mut self, s: &Session) {
        let title = [
            r"  _     _              ____                   ",
            r" | |   (_)_ __   ___  / ___|_ __ ___  ___ ___ ",
            r" | |   | | '_ \ / _ \| |   | '__/ _ \/ __/ __|",
            r" | |___| | | | |  __/| |___| | | (_) \__ \__ \",
            r" |_____|_|_| |_|\___| \____|_|  \___/|___/___/",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 1 + i, line, PLAYER_COLORS[i % MAX_PLAYERS], Color::Reset);
        }

        let menu = 8;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        let players = format!("Players:  ◀ {} ▶", s.players);
        self.front.put_str(8, menu, &players, ACCENT, Color::Reset);
        self.front.put_str(8, menu + 2, "ENTER   Start round", hi, Color::Reset);
        self.front.put_str(8, menu + 3, "1-4 ←→  Choose players", Color::White, Color::Reset);
        self.front.put_str(8, menu + 4, "  Q     Quit", Color::White, Color::Reset);

        let help = menu + 6;
        self.front.put_str(8, help, "Controls", ACCENT, Color::Reset);
        for i in 0..s.players {
            let line = format!("  P{}  {}  turn left/right", i + 1, KEY_HINTS[i]);
            self.front.put_str(8, help + 1 + i, &line, player_color(i), Color::Reset);
        }
        let after = help + 1 + s.players;
        self.front.put_str(8, after, "  SPACE pause/resume   ESC back to title", Color::White, Color::Reset);
        self.front.put_str(8, after + 1, "  Gamepad n steers player n", Color::DarkGrey, Color::Reset);

        if s.rounds_played > 0 {
            let wins: Vec<String> = (0..MAX_PLAYERS)
                .filter(|&i| s.wins[i] > 0)
                .map(|i| format!("P{}:{}", i + 1, s.wins[i]))
                .collect();
            let line = format!("Rounds {}   Wins {}", s.rounds_played, if wins.is_empty() { "-".into() } else { wins.join(" ") });
            self.front.put_str(8, after + 3, &line, Color::Grey, Color::Reset);
        }

        if !s.message.is_empty() {
            let row = self.front.height.saturating_sub(1);
            self.front.fill_row(row, ACCENT);
            self.front.put_str(1, row, &format!("◈ {}", s.message), Color::Black, ACCENT);
        }
    }

    fn compose_pause_overlay(&mut self) {
        let lines = ["  ▶  PAUSED  ◀  ", "SPACE  start / resume"];
        self.compose_box(&lines, ACCENT);
    }

    fn compose_round_over(&mut self, s: &Session) {
        let Some(result) = &s.result else { return };
        let mut lines: Vec<String> = vec!["ROUND OVER".into(), String::new()];
        match (result.winner, result.scores.len()) {
            (Some(w), _) => lines.push(format!("Player {} wins!", w + 1)),
            (None, 1) => lines.push("Frozen!".into()),
            (None, _) => lines.push("All players frozen".into()),
        }
        lines.push(String::new());
        for (i, score) in result.scores.iter().enumerate() {
            lines.push(format!("P{}  {:>9.1}", i + 1, score));
        }
        lines.push(String::new());
        match &result.export {
            Some(ExportStatus::Saved(dir)) => lines.push(format!("Traces saved to {}", dir.display())),
            Some(ExportStatus::Failed(e)) => lines.push(format!("Export failed: {e}")),
            None => {}
        }
        lines.push("Play again? [Y/N]".into());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.compose_box(&refs, CRASH);
    }

    /// Centered framed box over the field area.
    fn compose_box(&mut self, lines: &[&str], frame: Color) {
        let bg = Color::Rgb { r: 30, g: 30, b: 40 };
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let box_w = (inner + 2).min(self.front.width);
        let box_h = lines.len() + 2;
        let x0 = self.front.width.saturating_sub(box_w) / 2;
        let y0 = FIELD_ROW + self.front.height.saturating_sub(FIELD_ROW + box_h) / 2;

        self.front.fill_rect(x0, y0, box_w, box_h, bg);
        let rule: String = "═".repeat(box_w.saturating_sub(2));
        self.front.put_str(x0, y0, &format!("╔{rule}╗"), frame, bg);
        self.front.put_str(x0, y0 + box_h - 1, &format!("╚{rule}╝"), frame, bg);
        for (i, line) in lines.iter().enumerate() {
            let y = y0 + 1 + i;
            self.front.set(x0, y, Cell::new('║', frame, bg));
            self.front.set(x0 + box_w - 1, y, Cell::new('║', frame, bg));
            let pad = box_w.saturating_sub(2 + line.chars().count()) / 2;
            self.front.put_str(x0 + 1 + pad, y, line, Color::White, bg);
        }
    }
}

fn head_glyph(p: &PlayerView) -> (char, Color) {
    if !p.alive {
        return ('✕', CRASH);
    }
    let ch = match p.heading {
        Heading::North => '▲',
        Heading::East => '▶',
        Heading::South => '▼',
        Heading::West => '◀',
    };
    (ch, Color::White)
}
