/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::Duration;

use crossterm::event::KeyCode;
use tracing::{error, info, warn};

use config::GameConfig;
use domain::entity::Turn;
use domain::rules::MAX_PLAYERS;
use error::AppError;
use sim::clock::{TickClock, DEFAULT_PERIOD};
use sim::event::GameEvent;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::session::{Phase, Session};
use ui::sound::SoundEngine;

/// Input wait outside of a round, so gamepads and resizes are still polled.
const FRAME_WAIT: Duration = Duration::from_millis(16);

fn main() {
    let log_path = logging::init(&config::data_dir());
    let config = GameConfig::load();
    info!(log = ?log_path, "linecross starting");

    let mut session = Session::new(config.round.players);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Line Cross!");
    for (i, score) in session.final_scores().iter().enumerate() {
        println!("Player {}: {:.1}", i + 1, score);
    }
    info!(rounds = session.rounds_played, "linecross exiting");
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), AppError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let period = config.tick_period().unwrap_or_else(|e| {
        warn!("{e}; using {} ms", DEFAULT_PERIOD.as_millis());
        DEFAULT_PERIOD
    });
    let mut clock = TickClock::new(period);
    info!(period_ms = clock.period().as_millis() as u64, "tick clock ready");

    loop {
        // while playing, waiting for input runs out at the tick deadline
        let wait = match session.phase {
            Phase::Playing => clock.remaining(),
            _ => FRAME_WAIT,
        };
        kb.drain_events(wait);
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        match handle_meta(session, sound, &kb, &gp, config) {
            Meta::Quit => break,
            Meta::Started => clock = TickClock::new(period),
            Meta::Continue => {}
        }

        if session.phase == Phase::Playing {
            apply_turns(session, sound, &kb, &gp);

            if let Some(round) = session.round.as_mut() {
                let events = round.run_tick(&mut clock);
                process_sound_events(sound, &events);
            }
            session.poll_finished();
        }

        renderer.render(session)?;
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Frozen { .. } => sfx.play_crash(),
            GameEvent::RoundOver { survivors } if survivors.is_empty() => sfx.play_all_frozen(),
            GameEvent::RoundOver { .. } => sfx.play_win(),
        }
    }
}

// ── Key Constants ──

/// Turn keys per player slot: (left, right).
const TURN_KEYS: [(KeyCode, KeyCode); MAX_PLAYERS] = [
    (KeyCode::Left, KeyCode::Right),
    (KeyCode::Char('a'), KeyCode::Char('d')),
    (KeyCode::Char('j'), KeyCode::Char('l')),
    (KeyCode::Char('z'), KeyCode::Char('c')),
];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('p')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_YES: &[KeyCode] = &[KeyCode::Char('y'), KeyCode::Enter];
const KEYS_NO: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Esc];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Esc];

/// Map a pressed key to the player and turn it stands for.
fn turn_for_key(code: KeyCode) -> Option<(usize, Turn)> {
    TURN_KEYS.iter().enumerate().find_map(|(player, &(left, right))| {
        if code == left {
            Some((player, Turn::Left))
        } else if code == right {
            Some((player, Turn::Right))
        } else {
            None
        }
    })
}

/// Submit every turn pressed since the last drain, in arrival order.
fn apply_turns(session: &mut Session, sound: Option<&SoundEngine>, kb: &InputState, gp: &GamepadState) {
    let Some(round) = session.round.as_mut() else { return };
    let count = round.player_count();

    let keyed = kb.presses().iter().filter_map(|&code| turn_for_key(code));
    let padded = (0..count).filter_map(|p| gp.turn_pressed(p).map(|t| (p, t)));

    for (player, turn) in keyed.chain(padded) {
        if player < count && round.submit_turn(player, turn) {
            if let Some(sfx) = sound {
                sfx.play_turn(player);
            }
        }
    }
}

enum Meta {
    Continue,
    Started,
    Quit,
}

fn start_round(session: &mut Session, sound: Option<&SoundEngine>, config: &GameConfig) -> Meta {
    match session.start_round(config) {
        Ok(()) => {
            if let Some(sfx) = sound {
                sfx.play_select();
            }
            Meta::Started
        }
        Err(e) => {
            warn!("cannot start round: {e}");
            session.message = format!("Cannot start: {e}");
            session.back_to_title();
            Meta::Continue
        }
    }
}

fn handle_meta(
    session: &mut Session,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
    config: &GameConfig,
) -> Meta {
    match session.phase {
        Phase::Title => {
            if kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
                return Meta::Quit;
            }
            for (i, digit) in ['1', '2', '3', '4'].into_iter().enumerate() {
                if kb.any_pressed(&[KeyCode::Char(digit)]) {
                    session.select_players(i + 1);
                }
            }
            if kb.any_pressed(&[KeyCode::Left]) {
                session.fewer_players();
            }
            if kb.any_pressed(&[KeyCode::Right]) {
                session.more_players();
            }
            if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
                return start_round(session, sound, config);
            }
        }
        Phase::Playing => {
            if kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed() {
                session.back_to_title();
                return Meta::Continue;
            }
            if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
                if let Some(round) = session.round.as_mut() {
                    let paused = round.toggle_pause();
                    info!(paused, "pause toggled");
                }
            }
        }
        Phase::RoundOver => {
            if kb.any_pressed(KEYS_YES) || gp.confirm_pressed() {
                return start_round(session, sound, config);
            }
            if kb.any_pressed(KEYS_NO) || gp.cancel_pressed() {
                session.back_to_title();
            }
        }
    }
    Meta::Continue
}
