//! Terminal runner (default binary).
//!
//! Plays the game in the terminal: crossterm for input, the framebuffer
//! renderer for output. The engine is driven by hand from this loop at the
//! configured tick rate.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, Level};

use tetromino::core::{seed_from_env, GameConfig, GameState};
use tetromino::input::{control_key, ControlKey, KeyState};
use tetromino::logging::{self, LogConfig, LogTarget};
use tetromino::term::{FrameBuffer, GameView, HudSink, HudState, SharedHud, TerminalRenderer, Viewport};
use tetromino::types::GamePhase;

fn main() -> Result<()> {
    logging::init(&LogConfig::from_env(Level::INFO, LogTarget::Off))?;

    let config = GameConfig::from_env();
    config.validate()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    let seed = seed_from_env();
    let mut game = GameState::new(config.clone(), seed)?;

    let hud: SharedHud = Arc::new(Mutex::new(HudState::new(
        config.width,
        config.height,
        game.next_piece_size(),
    )));
    let sink = HudSink::new(Arc::clone(&hud));
    game.set_render_sink(Box::new(sink.clone()));
    game.add_observer(Box::new(sink));
    info!(seed, "terminal session started");

    let view = GameView::default();
    let mut keys = KeyState::new();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = config.tick_interval();
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        {
            let hud = hud.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            view.render_into(&hud, Viewport::new(w, h), &mut fb);
        }
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Release {
                        if let Some(control) = control_key(key) {
                            match control {
                                ControlKey::Quit => return Ok(()),
                                ControlKey::StartOrPause => start_or_pause(&mut game, &mut keys),
                                ControlKey::TogglePause => {
                                    if game.phase().is_active() {
                                        let paused = game.is_paused();
                                        game.set_paused(!paused);
                                    }
                                }
                            }
                            continue;
                        }
                    }
                    if let Some(mask) = keys.handle_key_event(key, Instant::now()) {
                        game.set_input_event(mask);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Terminals without key-release events.
        if let Some(mask) = keys.expire(Instant::now()) {
            game.set_input_event(mask);
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            game.tick(elapsed.as_millis() as u32);
        }
    }
}

fn start_or_pause(game: &mut GameState, keys: &mut KeyState) {
    match game.phase() {
        GamePhase::Running => game.set_paused(true),
        GamePhase::Paused => game.set_paused(false),
        GamePhase::Idle | GamePhase::GameOver => {
            keys.clear();
            game.start();
        }
    }
}
