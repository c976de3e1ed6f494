//! Game runtime: one task owning one engine.
//!
//! The runtime is the single mutator. It selects over the live tick stream and
//! the host command channel, feeds real elapsed time into `GameState::tick`,
//! and forwards every engine notification as an [`EngineMessage`].

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::core::{GameConfig, GameObserver, GameState, RenderSink, TickOutcome};
use crate::input::{TouchEvent, TouchGestures};
use crate::protocol::{EngineMessage, HostMessage};
use crate::scheduler::{IntervalScheduler, TickReceiver, TickSignal};
use crate::types::{Color, InputEvent};

/// Command delivered to the game task.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Start,
    Stop,
    SetPaused(bool),
    /// Start a game, or toggle pause while one is in progress
    TogglePrimary,
    Input(InputEvent),
    Touch(TouchEvent),
    TriggerRender,
    Shutdown,
}

impl TryFrom<HostMessage> for HostCommand {
    type Error = crate::protocol::ErrorMessage;

    fn try_from(msg: HostMessage) -> Result<Self, Self::Error> {
        Ok(match msg {
            HostMessage::Start => HostCommand::Start,
            HostMessage::Stop => HostCommand::Stop,
            HostMessage::SetPaused { paused } => HostCommand::SetPaused(paused),
            HostMessage::Toggle => HostCommand::TogglePrimary,
            HostMessage::Input { events, names } => {
                HostCommand::Input(HostMessage::input_event(events, &names)?)
            }
            HostMessage::Touch {
                phase,
                touches,
                x,
                y,
            } => HostCommand::Touch(HostMessage::touch_event(phase, touches, x, y)),
            HostMessage::TriggerRender => HostCommand::TriggerRender,
        })
    }
}

/// Render sink and observer that forwards everything to a channel.
#[derive(Debug, Clone)]
pub struct MessageSink {
    tx: mpsc::UnboundedSender<EngineMessage>,
}

impl MessageSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineMessage>) -> Self {
        Self { tx }
    }

    fn send(&self, msg: EngineMessage) {
        // Receiver gone means the host left; the runtime is about to stop.
        let _ = self.tx.send(msg);
    }
}

impl RenderSink for MessageSink {
    fn render(&mut self, width: usize, height: usize, cells: &[Color]) {
        self.send(EngineMessage::Render {
            width,
            height,
            cells: cells.to_vec(),
        });
    }

    fn next_piece_changed(&mut self, width: usize, height: usize, cells: &[bool], color: Color) {
        self.send(EngineMessage::next_piece(width, height, cells, color));
    }
}

impl GameObserver for MessageSink {
    fn started(&mut self) {
        self.send(EngineMessage::Started);
    }

    fn paused_changed(&mut self, paused: bool) {
        self.send(EngineMessage::PausedChanged { paused });
    }

    fn game_over(&mut self) {
        self.send(EngineMessage::GameOver);
    }

    fn lines_changed(&mut self, lines: u32) {
        self.send(EngineMessage::LinesChanged { lines });
    }

    fn level_changed(&mut self, level: u32) {
        self.send(EngineMessage::LevelChanged { level });
    }

    fn score_changed(&mut self, score: u32) {
        self.send(EngineMessage::ScoreChanged { score });
    }
}

/// Engine plus its tick stream and touch recognizer
pub struct GameRuntime {
    game: GameState,
    ticks: TickReceiver,
    touch: TouchGestures,
    last_tick: Option<Instant>,
}

impl GameRuntime {
    /// Build an engine driven by tokio interval ticks, reporting to `events`.
    pub fn new(
        config: GameConfig,
        seed: u32,
        events: mpsc::UnboundedSender<EngineMessage>,
    ) -> Result<Self> {
        let (scheduler, ticks) = IntervalScheduler::new();
        let mut game = GameState::new(config, seed)?.with_scheduler(Box::new(scheduler));
        let sink = MessageSink::new(events);
        game.set_render_sink(Box::new(sink.clone()));
        game.add_observer(Box::new(sink));

        Ok(Self {
            game,
            ticks,
            touch: TouchGestures::new(),
            last_tick: None,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// Apply one host command. Returns false on shutdown.
    pub fn apply(&mut self, command: HostCommand) -> bool {
        match command {
            HostCommand::Start => self.start(),
            HostCommand::Stop => self.game.stop(),
            HostCommand::SetPaused(paused) => self.game.set_paused(paused),
            HostCommand::TogglePrimary => {
                if self.game.phase().is_active() {
                    let paused = self.game.is_paused();
                    self.game.set_paused(!paused);
                } else {
                    self.start();
                }
            }
            HostCommand::Input(event) => self.game.set_input_event(event),
            HostCommand::Touch(event) => {
                if let Some(mask) = self.touch.handle(event) {
                    self.game.set_input_event(mask);
                }
            }
            HostCommand::TriggerRender => self.game.trigger_render(),
            HostCommand::Shutdown => return false,
        }
        true
    }

    fn start(&mut self) {
        self.touch = TouchGestures::with_threshold(self.touch.threshold());
        self.last_tick = Some(Instant::now());
        self.game.start();
    }

    fn on_tick(&mut self, signal: TickSignal) -> TickOutcome {
        let elapsed_ms = match self.last_tick {
            Some(last) => signal.at.saturating_duration_since(last).as_millis() as u32,
            None => self.game.config().tick_ms().round() as u32,
        };
        self.last_tick = Some(signal.at);

        let outcome = self.game.tick(elapsed_ms);
        if let TickOutcome::Locked { lines } = outcome {
            debug!(lines, score = self.game.score(), "lock");
        }
        outcome
    }

    /// Drive the engine until shutdown or until the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<HostCommand>) -> Result<()> {
        info!("game runtime started");
        loop {
            tokio::select! {
                Some(signal) = self.ticks.recv() => {
                    self.on_tick(signal);
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.apply(command) {
                        break;
                    }
                }
            }
        }
        self.game.stop();
        info!(score = self.game.score(), "game runtime stopped");
        Ok(())
    }
}
