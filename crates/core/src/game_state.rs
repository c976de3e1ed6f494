//! Game state module - the board engine
//!
//! Ties together the grid, the falling and next pieces, the input queue, scoring
//! and the tick timer. `tick` is the only mutator during a run: input producers
//! only enqueue, and the periodic timer (see [`crate::timer`]) decides when `tick`
//! is called.
//!
//! Per tick while running:
//!
//! | Step | What happens |
//! |------|--------------|
//! | pause edge | entering pause renders once (blank) and returns; leaving renders once and continues |
//! | input | one queued event, bits applied as advance, move-left, move-right, rotate-left, rotate-right |
//! | gravity | elapsed time accumulates; past the move interval the piece advances or locks |
//! | render | the composited board is pushed to the render sink |

use std::fmt;

use anyhow::{ensure, Result};
use tracing::{debug, info};

use crate::board::Board;
use crate::config::GameConfig;
use crate::observer::{GameObserver, RenderSink};
use crate::piece::Piece;
use crate::queue::InputQueue;
use crate::rng::SimpleRng;
use crate::scoring::{level_for_lines, line_clear_score, move_interval_ms};
use crate::shape::{max_extent, standard_shapes, Shape};
use crate::timer::{ManualScheduler, TickHandle, TickScheduler};
use crate::types::{Color, GamePhase, InputEvent, EMPTY};

/// What a single call to [`GameState::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running (idle or game over)
    Skipped,
    /// Paused; nothing consumed
    Paused,
    /// Input applied, gravity not yet due
    Continued,
    /// Gravity moved the piece down one row
    Advanced,
    /// The piece locked and a new one spawned
    Locked { lines: u32 },
    /// The piece locked and the next one could not spawn
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    Over,
}

/// Complete engine state
pub struct GameState {
    config: GameConfig,
    shapes: Vec<Shape>,
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    queue: InputQueue,
    rng: SimpleRng,
    run_state: RunState,
    paused: bool,
    /// Pause edge already handled by `tick`
    was_paused: bool,
    lines: u32,
    level: u32,
    score: u32,
    move_time_ms: f64,
    elapsed_ms: f64,
    scheduler: Box<dyn TickScheduler>,
    timer: Option<Box<dyn TickHandle>>,
    render_sink: Option<Box<dyn RenderSink + Send>>,
    observers: Vec<Box<dyn GameObserver + Send>>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase())
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lines", &self.lines)
            .field("current", &self.current)
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Engine with the seven standard shapes
    pub fn new(config: GameConfig, seed: u32) -> Result<Self> {
        Self::with_shapes(config, standard_shapes(), seed)
    }

    /// Engine with a custom shape set.
    ///
    /// Fails on an invalid config, an empty shape set, or a shape larger than the
    /// board.
    pub fn with_shapes(config: GameConfig, shapes: Vec<Shape>, seed: u32) -> Result<Self> {
        config.validate()?;
        ensure!(!shapes.is_empty(), "shape set must not be empty");
        for (i, shape) in shapes.iter().enumerate() {
            ensure!(
                shape.width() <= config.width && shape.height() <= config.height,
                "shape {i} ({}x{}) does not fit a {}x{} board",
                shape.width(),
                shape.height(),
                config.width,
                config.height
            );
        }

        let move_time_ms = move_interval_ms(
            config.initial_move_time_ms,
            config.increment_per_level,
            0,
            config.tick_ms(),
        );

        Ok(Self {
            board: Board::new(config.width, config.height),
            config,
            shapes,
            current: None,
            next: None,
            queue: InputQueue::new(),
            rng: SimpleRng::new(seed),
            run_state: RunState::Idle,
            paused: false,
            was_paused: false,
            lines: 0,
            level: 0,
            score: 0,
            move_time_ms,
            elapsed_ms: 0.0,
            scheduler: Box::new(ManualScheduler::new()),
            timer: None,
            render_sink: None,
            observers: Vec::new(),
        })
    }

    /// Replace the tick scheduler. Takes effect at the next `start()`.
    pub fn with_scheduler(mut self, scheduler: Box<dyn TickScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn set_render_sink(&mut self, sink: Box<dyn RenderSink + Send>) {
        self.render_sink = Some(sink);
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver + Send>) {
        self.observers.push(observer);
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Start (or restart) a game with fresh state.
    pub fn start(&mut self) {
        self.cancel_timer();

        self.board.clear();
        self.next = Some(self.spawn());
        self.current = Some(self.spawn());
        self.queue.clear();
        self.lines = 0;
        self.level = 0;
        self.score = 0;
        self.paused = false;
        self.was_paused = false;
        self.elapsed_ms = 0.0;
        self.move_time_ms = self.interval_for_level(0);

        self.timer = Some(self.scheduler.schedule(self.config.tick_interval()));
        self.run_state = RunState::Running;

        info!(
            width = self.config.width,
            height = self.config.height,
            rng_state = self.rng.state(),
            "game started"
        );

        let (lines, level, score) = (self.lines, self.level, self.score);
        self.notify(|o| o.lines_changed(lines));
        self.notify(|o| o.level_changed(level));
        self.notify(|o| o.score_changed(score));
        self.push_next_piece();
        self.notify(|o| o.started());
    }

    /// End the current run without a game-over notification.
    pub fn stop(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        self.cancel_timer();
        self.run_state = RunState::Over;
        info!(score = self.score, "game stopped");
    }

    /// Set the pause flag. Setting the current value does nothing.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        debug!(paused, "pause changed");
        self.notify(|o| o.paused_changed(paused));
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn phase(&self) -> GamePhase {
        match self.run_state {
            RunState::Idle => GamePhase::Idle,
            RunState::Over => GamePhase::GameOver,
            RunState::Running if self.paused => GamePhase::Paused,
            RunState::Running => GamePhase::Running,
        }
    }

    // ---------------------------------------------------------------------
    // Input and rendering
    // ---------------------------------------------------------------------

    /// Queue an input bitmask for the next tick. With the shipped capacity of one
    /// the latest call wins.
    pub fn set_input_event(&mut self, event: InputEvent) {
        self.queue.enqueue(event);
    }

    /// Push the next-piece preview and the board to the render sink now.
    ///
    /// While paused the board is blank and the preview empty.
    pub fn trigger_render(&mut self) {
        self.push_next_piece();
        if self.paused {
            if let Some(sink) = self.render_sink.as_mut() {
                let blank = vec![EMPTY; self.config.width * self.config.height];
                sink.render(self.config.width, self.config.height, &blank);
            }
        } else {
            self.render();
        }
    }

    /// Largest width and height across the shape set, for preview layout.
    pub fn next_piece_size(&self) -> (usize, usize) {
        max_extent(&self.shapes)
    }

    /// The grid with the falling piece composited on top.
    pub fn view_board(&self) -> Vec<Color> {
        self.board.composite(self.current.as_ref())
    }

    pub fn can_place(&self, piece: &Piece) -> bool {
        self.board.can_place(piece)
    }

    // ---------------------------------------------------------------------
    // Moves: copy, test, commit
    // ---------------------------------------------------------------------

    pub fn move_left(&mut self) -> bool {
        self.try_transform(Piece::move_left)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_transform(Piece::move_right)
    }

    pub fn advance(&mut self) -> bool {
        self.try_transform(Piece::advance)
    }

    pub fn rotate_left(&mut self) -> bool {
        self.try_transform(Piece::rotate_left)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.try_transform(Piece::rotate_right)
    }

    fn try_transform(&mut self, transform: impl FnOnce(&mut Piece)) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        let mut candidate = current.clone();
        transform(&mut candidate);
        if !self.board.can_place(&candidate) {
            return false;
        }
        self.current = Some(candidate);
        true
    }

    fn apply_input(&mut self, event: InputEvent) {
        for bit in InputEvent::ORDERED {
            if !event.contains(bit) {
                continue;
            }
            match bit {
                InputEvent::ADVANCE => self.advance(),
                InputEvent::MOVE_LEFT => self.move_left(),
                InputEvent::MOVE_RIGHT => self.move_right(),
                InputEvent::ROTATE_LEFT => self.rotate_left(),
                InputEvent::ROTATE_RIGHT => self.rotate_right(),
                _ => false,
            };
        }
    }

    // ---------------------------------------------------------------------
    // Game loop
    // ---------------------------------------------------------------------

    /// Run one game loop step. `elapsed_ms` is the time since the previous tick.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickOutcome {
        if self.run_state != RunState::Running {
            return TickOutcome::Skipped;
        }

        if self.paused {
            if !self.was_paused {
                self.was_paused = true;
                self.trigger_render();
            }
            return TickOutcome::Paused;
        }
        if self.was_paused {
            self.was_paused = false;
            self.trigger_render();
        }

        let event = self.queue.dequeue();
        self.apply_input(event);

        let mut outcome = TickOutcome::Continued;
        self.elapsed_ms += elapsed_ms as f64;
        if self.elapsed_ms >= self.move_time_ms {
            self.elapsed_ms = 0.0;
            outcome = if self.advance() {
                TickOutcome::Advanced
            } else {
                self.lock_current()
            };
        }

        self.render();
        outcome
    }

    fn lock_current(&mut self) -> TickOutcome {
        let Some(piece) = self.current.take() else {
            return TickOutcome::Continued;
        };

        self.board.lock_piece(&piece);
        let cleared = self.board.clear_lines();

        self.lines += cleared;
        self.level = level_for_lines(self.lines, self.config.lines_per_level);
        self.score = self
            .score
            .saturating_add(line_clear_score(cleared, self.level));
        debug!(
            cleared,
            lines = self.lines,
            level = self.level,
            score = self.score,
            "piece locked"
        );

        let (lines, level, score) = (self.lines, self.level, self.score);
        self.notify(|o| o.lines_changed(lines));
        self.notify(|o| o.level_changed(level));
        self.notify(|o| o.score_changed(score));

        self.move_time_ms = self.interval_for_level(self.level);

        match self.next.take() {
            Some(next) if self.board.can_place(&next) => {
                self.current = Some(next);
                self.next = Some(self.spawn());
                self.push_next_piece();
                TickOutcome::Locked { lines: cleared }
            }
            blocked => {
                self.next = blocked;
                self.cancel_timer();
                self.run_state = RunState::Over;
                info!(
                    score = self.score,
                    lines = self.lines,
                    level = self.level,
                    "game over"
                );
                self.notify(|o| o.game_over());
                TickOutcome::GameOver
            }
        }
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn spawn(&mut self) -> Piece {
        let index = self.rng.pick_index(self.shapes.len());
        Piece::new(self.config.width, self.config.height, &self.shapes[index])
    }

    fn interval_for_level(&self, level: u32) -> f64 {
        move_interval_ms(
            self.config.initial_move_time_ms,
            self.config.increment_per_level,
            level,
            self.config.tick_ms(),
        )
    }

    fn cancel_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn render(&mut self) {
        if self.render_sink.is_none() {
            return;
        }
        let view = self.view_board();
        if let Some(sink) = self.render_sink.as_mut() {
            sink.render(self.config.width, self.config.height, &view);
        }
    }

    fn push_next_piece(&mut self) {
        let Some(sink) = self.render_sink.as_mut() else {
            return;
        };
        match (&self.next, self.paused) {
            (Some(next), false) => {
                let shape = next.shape();
                sink.next_piece_changed(shape.width(), shape.height(), shape.cells(), shape.color());
            }
            _ => sink.next_piece_changed(0, 0, &[], EMPTY),
        }
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn GameObserver)) {
        for observer in self.observers.iter_mut() {
            f(&mut **observer);
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable grid access for setting up positions (tests, replays)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Current interval between forced advances
    pub fn move_time_ms(&self) -> f64 {
        self.move_time_ms
    }
}

impl Drop for GameState {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Render(Vec<Color>),
        Next(usize, usize, Vec<bool>, Color),
        Started,
        Paused(bool),
        GameOver,
        Lines(u32),
        Level(u32),
        Score(u32),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl Recorder {
        fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }

        fn push(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl RenderSink for Recorder {
        fn render(&mut self, _width: usize, _height: usize, cells: &[Color]) {
            self.push(Event::Render(cells.to_vec()));
        }

        fn next_piece_changed(&mut self, width: usize, height: usize, cells: &[bool], color: Color) {
            self.push(Event::Next(width, height, cells.to_vec(), color));
        }
    }

    impl GameObserver for Recorder {
        fn started(&mut self) {
            self.push(Event::Started);
        }
        fn paused_changed(&mut self, paused: bool) {
            self.push(Event::Paused(paused));
        }
        fn game_over(&mut self) {
            self.push(Event::GameOver);
        }
        fn lines_changed(&mut self, lines: u32) {
            self.push(Event::Lines(lines));
        }
        fn level_changed(&mut self, level: u32) {
            self.push(Event::Level(level));
        }
        fn score_changed(&mut self, score: u32) {
            self.push(Event::Score(score));
        }
    }

    fn dot() -> Shape {
        Shape::new(1, 1, vec![true], 0x00ff00).unwrap()
    }

    fn recorded(game: &mut GameState) -> Recorder {
        let recorder = Recorder::default();
        game.set_render_sink(Box::new(recorder.clone()));
        game.add_observer(Box::new(recorder.clone()));
        recorder
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(GameState::with_shapes(GameConfig::default(), Vec::new(), 1).is_err());

        let tiny = GameConfig {
            width: 3,
            height: 3,
            ..GameConfig::default()
        };
        // The 4-wide bar does not fit.
        assert!(GameState::new(tiny, 1).is_err());

        let zero = GameConfig {
            frame_rate: 0,
            ..GameConfig::default()
        };
        assert!(GameState::new(zero, 1).is_err());
    }

    #[test]
    fn starts_idle_with_empty_view() {
        let game = GameState::new(GameConfig::default(), 1).unwrap();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.current().is_none());
        assert!(game.view_board().iter().all(|&c| c == EMPTY));
        assert_eq!(game.next_piece_size(), (4, 2));
    }

    #[test]
    fn start_notifies_in_order() {
        let mut game = GameState::new(GameConfig::default(), 9).unwrap();
        let recorder = recorded(&mut game);
        game.start();

        let events = recorder.take();
        assert_eq!(&events[..3], &[Event::Lines(0), Event::Level(0), Event::Score(0)]);
        assert!(matches!(events[3], Event::Next(w, h, _, c) if w > 0 && h > 0 && c != EMPTY));
        assert_eq!(events[4], Event::Started);
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn completing_a_row_clears_it_and_scores() {
        let mut game = GameState::with_shapes(GameConfig::default(), vec![dot()], 3).unwrap();
        game.start();
        for x in 0..10 {
            if x != 4 {
                game.board_mut().set(x, 19, 0xff0000);
            }
        }
        game.board_mut().set(0, 18, 0x0000ff);

        // Dot spawns at row -1 and needs 20 advances to reach row 19.
        for _ in 0..20 {
            assert_eq!(game.tick(1000), TickOutcome::Advanced);
        }
        assert_eq!(game.tick(1000), TickOutcome::Locked { lines: 1 });

        assert_eq!(game.lines(), 1);
        assert_eq!(game.level(), 0);
        assert_eq!(game.score(), 100);
        // The row above shifted down.
        assert_eq!(game.board().get(0, 19), Some(0x0000ff));
        assert_eq!(game.board().cells().iter().filter(|&&c| c != EMPTY).count(), 1);
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let o = standard_shapes()[1].clone();
        let probe = ManualScheduler::new();
        let mut game = GameState::with_shapes(GameConfig::default(), vec![o], 5)
            .unwrap()
            .with_scheduler(Box::new(probe.clone()));
        let recorder = recorded(&mut game);
        game.start();
        game.board_mut().set(4, 1, 0xff0000);
        recorder.take();

        assert_eq!(game.tick(1000), TickOutcome::GameOver);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.current().is_none());
        assert!(game.next().is_some());
        assert_eq!(probe.active(), 0);

        let events = recorder.take();
        assert!(events.contains(&Event::GameOver));
        // Final render still happens after game over.
        assert!(matches!(events.last(), Some(Event::Render(_))));

        assert_eq!(game.tick(1000), TickOutcome::Skipped);
        assert_eq!(probe.cancelled(), 1);
    }

    #[test]
    fn restart_cancels_previous_timer() {
        let probe = ManualScheduler::new();
        let mut game = GameState::new(GameConfig::default(), 2)
            .unwrap()
            .with_scheduler(Box::new(probe.clone()));

        game.start();
        game.start();
        assert_eq!(probe.scheduled(), 2);
        assert_eq!(probe.cancelled(), 1);
        assert_eq!(probe.active(), 1);
        assert_eq!(probe.last_interval(), Some(std::time::Duration::from_millis(10)));

        game.stop();
        assert_eq!(probe.active(), 0);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn pause_blanks_render_and_freezes_time() {
        let mut game = GameState::new(GameConfig::default(), 4).unwrap();
        let recorder = recorded(&mut game);
        game.start();
        game.set_paused(true);
        game.set_paused(true);
        recorder.take();

        game.trigger_render();
        let events = recorder.take();
        assert_eq!(events[0], Event::Next(0, 0, Vec::new(), EMPTY));
        assert_eq!(events[1], Event::Render(vec![EMPTY; 200]));

        let before = game.current().cloned();
        assert_eq!(game.tick(5000), TickOutcome::Paused);
        assert_eq!(game.tick(5000), TickOutcome::Paused);
        assert_eq!(game.current().cloned(), before);
        // Only the entering edge rendered.
        assert_eq!(recorder.take().len(), 2);

        game.set_paused(false);
        game.trigger_render();
        let events = recorder.take();
        assert_eq!(events[0], Event::Paused(false));
        assert!(matches!(&events[1], Event::Next(w, _, _, _) if *w > 0));
        assert_eq!(events[2], Event::Render(game.view_board()));
    }

    #[test]
    fn set_paused_same_value_is_silent() {
        let mut game = GameState::new(GameConfig::default(), 4).unwrap();
        let recorder = recorded(&mut game);
        game.start();
        recorder.take();

        game.set_paused(false);
        assert!(recorder.take().is_empty());
        game.set_paused(true);
        assert_eq!(recorder.take(), vec![Event::Paused(true)]);
    }

    #[test]
    fn input_bits_apply_in_fixed_order() {
        let bar = standard_shapes()[0].clone();
        let mut game = GameState::with_shapes(GameConfig::default(), vec![bar], 6).unwrap();
        game.start();

        game.set_input_event(InputEvent::MOVE_LEFT | InputEvent::ROTATE_RIGHT);
        assert_eq!(game.tick(0), TickOutcome::Continued);

        let piece = game.current().unwrap();
        assert_eq!(piece.center(), (4.0, 0.0));
        assert_eq!((piece.shape().width(), piece.shape().height()), (1, 4));

        // Queue is drained: the next tick applies nothing.
        assert_eq!(game.tick(0), TickOutcome::Continued);
        assert_eq!(game.current().unwrap().center(), (4.0, 0.0));
    }

    #[test]
    fn gravity_waits_for_move_interval() {
        let mut game = GameState::new(GameConfig::default(), 8).unwrap();
        game.start();
        let start = game.current().unwrap().center();

        for _ in 0..99 {
            assert_eq!(game.tick(10), TickOutcome::Continued);
        }
        assert_eq!(game.tick(10), TickOutcome::Advanced);
        assert_eq!(game.current().unwrap().center(), (start.0, start.1 + 1.0));
    }

    #[test]
    fn start_resets_move_interval() {
        let config = GameConfig {
            lines_per_level: 1,
            ..GameConfig::default()
        };
        let mut game = GameState::with_shapes(config, vec![dot()], 3).unwrap();
        game.start();
        for x in 0..10 {
            if x != 4 {
                game.board_mut().set(x, 19, 0xff0000);
            }
        }
        for _ in 0..21 {
            game.tick(1000);
        }
        assert_eq!(game.level(), 1);
        // Level 1 score uses the updated level.
        assert_eq!(game.score(), 200);
        assert!((game.move_time_ms() - 850.0).abs() < 1e-9);

        game.start();
        assert_eq!(game.move_time_ms(), 1000.0);
        assert_eq!(game.score(), 0);
    }
}
