/// Keyboard input tracker.
///
/// Turns are one-shot: every key Press counts, in arrival order, so two quick
/// taps between ticks give two turns. Release and Repeat events are ignored.
///
/// `drain_events` blocks for at most `wait` for the first event and then
/// empties the queue without blocking. The game loop passes the time left
/// until the next tick, so waiting for input doubles as tick pacing.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Pressed keys from the most recent drain, in order. Letters lowercased.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Wait up to `wait` for input, then drain everything pending.
    pub fn drain_events(&mut self, wait: Duration) {
        self.presses.clear();
        self.raw_events.clear();

        let mut timeout = wait;
        while poll(timeout).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.push_key(key),
                // resizes are picked up by the renderer's size check
                _ => {}
            }
            timeout = Duration::ZERO;
        }
    }

    fn push_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind == KeyEventKind::Press {
            self.presses.push(normalize(key.code));
        }
    }

    /// Keys pressed this drain, in arrival order.
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Was any of these keys pressed this drain?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|c| codes.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn presses_keep_order_and_duplicates() {
        let mut kb = InputState::new();
        kb.push_key(key(KeyCode::Right, KeyEventKind::Press));
        kb.push_key(key(KeyCode::Char('A'), KeyEventKind::Press));
        kb.push_key(key(KeyCode::Right, KeyEventKind::Press));
        assert_eq!(kb.presses(), &[KeyCode::Right, KeyCode::Char('a'), KeyCode::Right]);
        assert!(kb.any_pressed(&[KeyCode::Char('a')]));
        assert!(!kb.any_pressed(&[KeyCode::Left]));
    }

    #[test]
    fn releases_and_repeats_are_ignored() {
        let mut kb = InputState::new();
        kb.push_key(key(KeyCode::Left, KeyEventKind::Release));
        kb.push_key(key(KeyCode::Left, KeyEventKind::Repeat));
        assert!(kb.presses().is_empty());
    }

    #[test]
    fn ctrl_c_detected() {
        let mut kb = InputState::new();
        kb.push_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(kb.ctrl_c_pressed());
    }
}
