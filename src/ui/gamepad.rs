/// Gamepad input tracker using gilrs.
///
/// Pads are assigned to player slots in the order they are first seen:
/// the first pad steers player 1, the second player 2, and so on.
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad Left  / L1 / X  →  Turn left
///   D-pad Right / R1 / B  →  Turn right
///   Start                 →  Pause
///   A                     →  Confirm
///   Select                →  Cancel

#[cfg(feature = "gamepad")]
use gilrs::{Button, EventType, GamepadId, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::Turn;
use crate::domain::rules::MAX_PLAYERS;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
    Left,    // DPadLeft
    Right,   // DPadRight
}

const BTN_COUNT: usize = 12;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            "LEFT" | "DPADLEFT" => Some(Btn::Left),
            "RIGHT" | "DPADRIGHT" => Some(Btn::Right),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            Button::DPadLeft  => Some(Btn::Left),
            Button::DPadRight => Some(Btn::Right),
            _ => None,
        }
    }
}

/// Edge presses of one pad since the last update.
#[derive(Clone, Copy, Debug, Default)]
struct PadSlot {
    just_pressed: [bool; BTN_COUNT],
}

impl PadSlot {
    fn any(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    turn_left: Vec<Btn>,
    turn_right: Vec<Btn>,
    pause: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            turn_left:  vec![Btn::Left, Btn::L1, Btn::X],
            turn_right: vec![Btn::Right, Btn::R1, Btn::B],
            pause:      vec![Btn::Start],
            confirm:    vec![Btn::A],
            cancel:     vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Configured names replace the defaults; unknown names are dropped and
    /// an action left with no buttons keeps its default. D-pad turns are
    /// always kept.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        fn pick(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed = parse_list(names);
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        let mut map = ActionMap {
            turn_left: pick(&cfg.turn_left, d.turn_left),
            turn_right: pick(&cfg.turn_right, d.turn_right),
            pause: pick(&cfg.pause, d.pause),
            confirm: pick(&cfg.confirm, d.confirm),
            cancel: pick(&cfg.cancel, d.cancel),
        };
        if !map.turn_left.contains(&Btn::Left) { map.turn_left.insert(0, Btn::Left); }
        if !map.turn_right.contains(&Btn::Right) { map.turn_right.insert(0, Btn::Right); }
        map
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Pad id per player slot, in first-seen order.
    #[cfg(feature = "gamepad")]
    pads: Vec<GamepadId>,

    slots: [PadSlot; MAX_PLAYERS],

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, pads) = match Gilrs::new() {
            Ok(g) => {
                let pads: Vec<GamepadId> = g.gamepads().map(|(id, _)| id).take(MAX_PLAYERS).collect();
                (Some(g), pads)
            }
            Err(e) => {
                tracing::warn!("gamepad support unavailable: {e}");
                (None, Vec::new())
            }
        };
        #[cfg(feature = "gamepad")]
        let connected = !pads.is_empty();
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            #[cfg(feature = "gamepad")]
            pads,
            slots: [PadSlot::default(); MAX_PLAYERS],
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        for s in &mut self.slots { *s = PadSlot::default(); }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    let Some(slot) = self.slot_of(event.id) else { continue };
                    if let Some(b) = Btn::from_gilrs(btn) {
                        self.slots[slot].just_pressed[b as usize] = true;
                    }
                }
                EventType::Connected => {
                    self.slot_of(event.id);
                }
                EventType::Disconnected => {
                    tracing::info!(pad = ?event.id, "gamepad disconnected");
                }
                _ => {}
            }
        }
        self.connected = !self.pads.is_empty();
    }

    /// Slot for a pad, assigning the next free one on first sight.
    #[cfg(feature = "gamepad")]
    fn slot_of(&mut self, id: GamepadId) -> Option<usize> {
        if let Some(i) = self.pads.iter().position(|&p| p == id) {
            return Some(i);
        }
        if self.pads.len() >= MAX_PLAYERS {
            return None;
        }
        self.pads.push(id);
        tracing::info!(pad = ?id, slot = self.pads.len() - 1, "gamepad assigned");
        Some(self.pads.len() - 1)
    }

    // ── Action queries (config-driven) ──

    /// Turn pressed on the pad steering `player`, if any. Left wins a tie.
    pub fn turn_pressed(&self, player: usize) -> Option<Turn> {
        let slot = self.slots.get(player)?;
        if slot.any(&self.action_map.turn_left) {
            Some(Turn::Left)
        } else if slot.any(&self.action_map.turn_right) {
            Some(Turn::Right)
        } else {
            None
        }
    }

    pub fn pause_pressed(&self) -> bool {
        self.slots.iter().any(|s| s.any(&self.action_map.pause))
    }
    pub fn confirm_pressed(&self) -> bool {
        self.slots.iter().any(|s| s.any(&self.action_map.confirm))
    }
    pub fn cancel_pressed(&self) -> bool {
        self.slots.iter().any(|s| s.any(&self.action_map.cancel))
    }
}
