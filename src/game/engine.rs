use super::{
    action::Direction,
    config::GameConfig,
    state::GridState,
};
use crate::persistence::{BestScore, ScoreStore};
use rand::Rng;
use rand::rngs::ThreadRng;

/// Lifecycle of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Board is set up, no tick has run yet
    Idle,
    Running,
    Paused,
    /// Terminal until [`GameEngine::restart`]
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The head ran into the body
    SelfCollision,
    /// The snake covers every cell, so there is nowhere left for a fruit
    BoardFull,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The engine was not running, nothing changed
    Skipped,
    Moved,
    Ate,
    GameOver(GameOverReason),
}

/// Instruction for whoever owns the timer driving [`GameEngine::tick`].
///
/// `Every` means: cancel the current timer, then tick at the new period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Every(u64),
    Stop,
}

/// Result of a game tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub event: TickEvent,
    /// Score after the tick
    pub score: u32,
    /// Best score for this board after the tick
    pub best_score: u32,
    /// Set when the scheduler has to change
    pub schedule: Option<Schedule>,
}

/// Drives one snake game: lifecycle, ticks, speed and best score.
///
/// The engine never owns a timer. Anything that changes the tick rate is
/// returned as a [`Schedule`] for the caller to apply.
pub struct GameEngine<S, R = ThreadRng> {
    config: GameConfig,
    grid: GridState,
    phase: GamePhase,
    interval_ms: u64,
    /// Last accepted turn since the previous tick; read once per tick
    pending_heading: Option<Direction>,
    best: BestScore<S>,
    rng: R,
}

impl<S: ScoreStore> GameEngine<S, ThreadRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig, store: S, board_id: &str) -> Self {
        Self::with_rng(config, store, board_id, rand::thread_rng())
    }
}

impl<S: ScoreStore, R: Rng> GameEngine<S, R> {
    pub fn with_rng(config: GameConfig, store: S, board_id: &str, mut rng: R) -> Self {
        let grid = GridState::centered(config.grid_width, config.grid_height, &mut rng);
        let interval_ms = config.base_interval_ms;

        Self {
            config,
            grid,
            phase: GamePhase::Idle,
            interval_ms,
            pending_heading: None,
            best: BestScore::new(store, board_id),
            rng,
        }
    }

    /// Set up a fresh board on the current grid size and go back to Idle
    pub fn init(&mut self) {
        self.grid = GridState::centered(self.grid.width, self.grid.height, &mut self.rng);
        self.phase = GamePhase::Idle;
        self.interval_ms = self.config.base_interval_ms;
        self.pending_heading = None;
        self.best.refresh();
    }

    /// Begin ticking from Idle, or resume from Paused
    pub fn start(&mut self) -> Option<Schedule> {
        match self.phase {
            GamePhase::Idle | GamePhase::Paused => {
                tracing::info!(interval_ms = self.interval_ms, "game started");
                self.phase = GamePhase::Running;
                Some(Schedule::Every(self.interval_ms))
            }
            GamePhase::Running | GamePhase::GameOver => {
                tracing::debug!(phase = ?self.phase, "start ignored");
                None
            }
        }
    }

    pub fn pause_toggle(&mut self) -> Option<Schedule> {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                tracing::info!("game paused");
                Some(Schedule::Stop)
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                tracing::info!("game resumed");
                Some(Schedule::Every(self.interval_ms))
            }
            GamePhase::Idle | GamePhase::GameOver => {
                tracing::debug!(phase = ?self.phase, "pause toggle ignored");
                None
            }
        }
    }

    /// Throw the current run away and start a new one at base speed
    pub fn restart(&mut self) -> Schedule {
        self.init();
        self.phase = GamePhase::Running;
        tracing::info!(
            width = self.grid.width,
            height = self.grid.height,
            "game restarted"
        );
        Schedule::Every(self.interval_ms)
    }

    /// Queue a turn for the next tick.
    ///
    /// Only the latest accepted turn survives until the tick. A turn along
    /// the axis the snake is already travelling is rejected.
    pub fn set_heading(&mut self, direction: Direction) -> bool {
        let heading = self.grid.snake.direction;
        if !heading.can_turn_to(direction) {
            tracing::debug!(?heading, ?direction, "turn rejected");
            return false;
        }

        self.pending_heading = Some(direction);
        true
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> TickResult {
        if self.phase != GamePhase::Running {
            return self.result(TickEvent::Skipped, None);
        }

        if let Some(direction) = self.pending_heading.take() {
            self.grid.snake.direction = direction;
        }

        let new_head = self.grid.compute_next_head(self.grid.snake.direction);

        if self.grid.would_self_collide(new_head) {
            return self.finish(GameOverReason::SelfCollision);
        }

        let ate = new_head == self.grid.fruit;
        self.grid.advance(new_head, ate);

        if !ate {
            return self.result(TickEvent::Moved, None);
        }

        if !self.grid.has_free_cell() {
            return self.finish(GameOverReason::BoardFull);
        }
        self.grid.place_fruit_randomly(&mut self.rng);

        let score = self.score();
        let schedule = self.speed_up(score);
        self.best.record(score);

        self.result(TickEvent::Ate, schedule)
    }

    /// Adapt to a new grid size. Segments outside the new border are clamped
    /// onto it and the fruit moves somewhere free.
    pub fn on_resize(&mut self, rows: usize, cols: usize) -> Option<Schedule> {
        if rows == 0 || cols == 0 {
            tracing::debug!(rows, cols, "ignoring empty layout");
            return None;
        }

        self.grid.clamp_to_bounds(rows, cols);

        let overlapping = self.grid.overlapping_cells();
        if overlapping > 0 {
            tracing::warn!(overlapping, rows, cols, "resize stacked snake segments");
        }

        if !self.grid.has_free_cell() {
            if self.phase == GamePhase::GameOver {
                return None;
            }
            self.finish(GameOverReason::BoardFull);
            return Some(Schedule::Stop);
        }
        self.grid.place_fruit_randomly(&mut self.rng);

        match self.phase {
            GamePhase::Running => Some(Schedule::Every(self.interval_ms)),
            _ => None,
        }
    }

    /// Current score: one point per segment beyond the head
    pub fn score(&self) -> u32 {
        self.grid.snake.len().saturating_sub(1) as u32
    }

    pub fn best_score(&self) -> u32 {
        self.best.value()
    }

    /// Current tick interval
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Direct board access for scripted setups
    pub fn grid_mut(&mut self) -> &mut GridState {
        &mut self.grid
    }

    pub fn pending_heading(&self) -> Option<Direction> {
        self.pending_heading
    }

    fn speed_up(&mut self, score: u32) -> Option<Schedule> {
        let floor = self.config.min_interval_ms;
        if score == 0 || score % self.config.speedup_every != 0 || self.interval_ms <= floor {
            return None;
        }

        self.interval_ms = self
            .interval_ms
            .saturating_sub(self.config.interval_step_ms)
            .max(floor);
        tracing::info!(score, interval_ms = self.interval_ms, "speeding up");
        Some(Schedule::Every(self.interval_ms))
    }

    fn finish(&mut self, reason: GameOverReason) -> TickResult {
        self.phase = GamePhase::GameOver;
        let score = self.score();
        self.best.record(score);
        tracing::info!(?reason, score, "game over");
        self.result(TickEvent::GameOver(reason), Some(Schedule::Stop))
    }

    fn result(&self, event: TickEvent, schedule: Option<Schedule>) -> TickResult {
        TickResult {
            event,
            score: self.score(),
            best_score: self.best_score(),
            schedule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Position, Snake};
    use crate::persistence::{MemoryStore, ScoreStore, StoreError};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Memory store that counts reads through a shared counter
    struct ReadCounter {
        inner: MemoryStore,
        reads: Rc<Cell<usize>>,
    }

    impl ScoreStore for ReadCounter {
        fn get(&self, key: &str) -> Result<Option<u32>, StoreError> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }
    }

    fn engine() -> GameEngine<MemoryStore, StdRng> {
        GameEngine::with_rng(
            GameConfig::small(),
            MemoryStore::new(),
            "test",
            StdRng::seed_from_u64(3),
        )
    }

    fn running_engine() -> GameEngine<MemoryStore, StdRng> {
        let mut engine = engine();
        engine.start();
        engine
    }

    /// Put the fruit right in front of the head
    fn feed<S: ScoreStore>(engine: &mut GameEngine<S, StdRng>) {
        let grid = engine.grid_mut();
        grid.fruit = grid.compute_next_head(grid.snake.direction);
    }

    /// Park the fruit where the next move will not reach it
    fn starve<S: ScoreStore>(engine: &mut GameEngine<S, StdRng>) {
        let grid = engine.grid_mut();
        let head = grid.snake.head();
        grid.fruit = Position::new(head.x, (head.y + 3) % grid.height as i32);
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = engine();
        assert_eq!(engine.phase(), GamePhase::Idle);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.interval_ms(), 120);
        assert_eq!(engine.grid().snake.head(), Position::new(5, 5));
    }

    #[test]
    fn test_tick_is_noop_unless_running() {
        let mut engine = engine();
        let before = engine.grid().clone();

        let result = engine.tick();
        assert_eq!(result.event, TickEvent::Skipped);
        assert_eq!(result.schedule, None);
        assert_eq!(engine.grid(), &before);

        engine.start();
        engine.pause_toggle();
        let before = engine.grid().clone();
        assert_eq!(engine.tick().event, TickEvent::Skipped);
        assert_eq!(engine.grid(), &before);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut engine = engine();

        assert_eq!(engine.pause_toggle(), None);
        assert_eq!(engine.start(), Some(Schedule::Every(120)));
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.start(), None);

        assert_eq!(engine.pause_toggle(), Some(Schedule::Stop));
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert_eq!(engine.pause_toggle(), Some(Schedule::Every(120)));
        assert_eq!(engine.phase(), GamePhase::Running);

        assert_eq!(engine.pause_toggle(), Some(Schedule::Stop));
        assert_eq!(engine.start(), Some(Schedule::Every(120)));
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = running_engine();
        starve(&mut engine);

        let result = engine.tick();

        assert_eq!(result.event, TickEvent::Moved);
        assert_eq!(result.schedule, None);
        assert_eq!(engine.grid().snake.head(), Position::new(6, 5));
        assert_eq!(engine.grid().snake.len(), 1);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut engine = running_engine();
        feed(&mut engine);

        let result = engine.tick();

        assert_eq!(result.event, TickEvent::Ate);
        assert_eq!(result.score, 1);
        assert_eq!(result.best_score, 1);
        assert_eq!(engine.grid().snake.len(), 2);
        assert!(!engine.grid().snake.occupies(engine.grid().fruit));
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut engine = running_engine();
        starve(&mut engine);

        assert!(!engine.set_heading(Direction::Left));
        assert_eq!(engine.pending_heading(), None);
        engine.tick();
        assert_eq!(engine.grid().snake.direction, Direction::Right);
        assert_eq!(engine.grid().snake.head(), Position::new(6, 5));

        assert!(engine.set_heading(Direction::Up));
        engine.tick();
        assert_eq!(engine.grid().snake.direction, Direction::Up);
        assert_eq!(engine.grid().snake.head(), Position::new(6, 4));
    }

    #[test]
    fn test_last_turn_before_tick_wins() {
        let mut engine = running_engine();
        starve(&mut engine);

        assert!(engine.set_heading(Direction::Up));
        assert!(engine.set_heading(Direction::Down));
        // still compared against the heading in effect, so this one is dropped
        assert!(!engine.set_heading(Direction::Left));
        assert_eq!(engine.pending_heading(), Some(Direction::Down));

        engine.tick();
        assert_eq!(engine.grid().snake.direction, Direction::Down);
        assert_eq!(engine.pending_heading(), None);
    }

    #[test]
    fn test_turn_does_not_apply_before_tick() {
        let mut engine = running_engine();
        engine.set_heading(Direction::Up);
        assert_eq!(engine.grid().snake.direction, Direction::Right);
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut engine = running_engine();
        // Body: (5,5) (5,6) (6,6) (6,5), heading up; turning right hits (6,5)
        let body = vec![
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(6, 6),
            Position::new(6, 5),
            Position::new(7, 5),
        ];
        let grid = engine.grid_mut();
        grid.snake = Snake::from_segments(body, Direction::Up);
        grid.fruit = Position::new(0, 0);

        assert!(engine.set_heading(Direction::Right));
        let result = engine.tick();

        assert_eq!(
            result.event,
            TickEvent::GameOver(GameOverReason::SelfCollision)
        );
        assert_eq!(result.schedule, Some(Schedule::Stop));
        assert_eq!(result.score, 4);
        assert_eq!(result.best_score, 4);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.grid().snake.len(), 5);

        assert_eq!(engine.tick().event, TickEvent::Skipped);
        assert_eq!(engine.start(), None);
        assert_eq!(engine.pause_toggle(), None);
    }

    #[test]
    fn test_length_changes_by_zero_or_one() {
        let mut engine = running_engine();
        let mut rng = StdRng::seed_from_u64(99);
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

        for step in 0..500 {
            if step % 4 == 0 {
                engine.set_heading(turns[rng.gen_range(0..turns.len())]);
            }
            if step % 3 == 0 {
                feed(&mut engine);
            }
            let before = engine.grid().snake.len();
            let result = engine.tick();
            let after = engine.grid().snake.len();

            assert!(after == before || after == before + 1);
            assert!(!engine.grid().snake.occupies(engine.grid().fruit) || result.event != TickEvent::Ate);
            if engine.phase() == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_speed_steps_every_third_fruit() {
        let mut engine = running_engine();
        let mut schedules = Vec::new();

        for _ in 0..6 {
            feed(&mut engine);
            let result = engine.tick();
            assert_eq!(result.event, TickEvent::Ate);
            schedules.push(result.schedule);
        }

        assert_eq!(schedules, vec![
            None,
            None,
            Some(Schedule::Every(112)),
            None,
            None,
            Some(Schedule::Every(104)),
        ]);
        assert_eq!(engine.interval_ms(), 104);
    }

    #[test]
    fn test_speed_stops_at_floor() {
        let config = GameConfig {
            grid_width: 40,
            grid_height: 40,
            base_interval_ms: 60,
            ..Default::default()
        };
        let mut engine =
            GameEngine::with_rng(config, MemoryStore::new(), "floor", StdRng::seed_from_u64(5));
        engine.start();

        let mut intervals = Vec::new();
        for _ in 0..9 {
            feed(&mut engine);
            if let Some(Schedule::Every(ms)) = engine.tick().schedule {
                intervals.push(ms);
            }
        }

        // 60 -> 52 -> 50 then no further changes
        assert_eq!(intervals, vec![52, 50]);
        assert_eq!(engine.interval_ms(), 50);
    }

    #[test]
    fn test_moving_never_changes_speed() {
        let mut engine = running_engine();
        for _ in 0..30 {
            starve(&mut engine);
            assert_eq!(engine.tick().schedule, None);
        }
        assert_eq!(engine.interval_ms(), 120);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut engine = running_engine();
        for _ in 0..4 {
            feed(&mut engine);
            engine.tick();
        }
        engine.set_heading(Direction::Up);
        assert_eq!(engine.score(), 4);
        assert_eq!(engine.interval_ms(), 112);

        assert_eq!(engine.restart(), Schedule::Every(120));

        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.interval_ms(), 120);
        assert_eq!(engine.pending_heading(), None);
        assert_eq!(engine.grid().snake.direction, Direction::Right);
        assert_eq!(engine.grid().snake.head(), Position::new(5, 5));
        assert_eq!(engine.best_score(), 4);
    }

    #[test]
    fn test_best_score_survives_engines() {
        let mut store = MemoryStore::new();
        store.set("snake_best_shared", 2).unwrap();

        let mut engine =
            GameEngine::with_rng(GameConfig::small(), store, "shared", StdRng::seed_from_u64(8));
        assert_eq!(engine.best_score(), 2);

        engine.start();
        feed(&mut engine);
        assert_eq!(engine.tick().best_score, 2);
        feed(&mut engine);
        assert_eq!(engine.tick().best_score, 2);
        feed(&mut engine);
        assert_eq!(engine.tick().best_score, 3);
    }

    #[test]
    fn test_best_score_is_not_reread_every_tick() {
        let reads = Rc::new(Cell::new(0));
        let store = ReadCounter {
            inner: MemoryStore::new(),
            reads: Rc::clone(&reads),
        };
        let mut engine =
            GameEngine::with_rng(GameConfig::small(), store, "reads", StdRng::seed_from_u64(4));
        engine.start();
        let after_setup = reads.get();

        for _ in 0..3 {
            starve(&mut engine);
            assert_eq!(engine.tick().event, TickEvent::Moved);
        }
        for _ in 0..100 {
            assert_eq!(engine.best_score(), 0);
        }
        assert_eq!(reads.get(), after_setup);

        // eating updates the score, which re-reads once
        feed(&mut engine);
        assert_eq!(engine.tick().best_score, 1);
        assert_eq!(reads.get(), after_setup + 1);

        // a new game reads the stored value again
        engine.restart();
        assert_eq!(reads.get(), after_setup + 2);
    }

    #[test]
    fn test_board_full_ends_game() {
        let config = GameConfig::new(3, 1);
        let mut engine =
            GameEngine::with_rng(config, MemoryStore::new(), "tiny", StdRng::seed_from_u64(1));
        engine.start();

        feed(&mut engine);
        assert_eq!(engine.tick().event, TickEvent::Ate);
        feed(&mut engine);
        let result = engine.tick();

        assert_eq!(result.event, TickEvent::GameOver(GameOverReason::BoardFull));
        assert_eq!(result.score, 2);
        assert_eq!(engine.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_resize_clamps_and_replaces_fruit() {
        let mut engine = running_engine();
        let body = vec![Position::new(9, 9), Position::new(8, 9), Position::new(7, 9)];
        engine.grid_mut().snake = Snake::from_segments(body, Direction::Right);

        let schedule = engine.on_resize(6, 8);

        assert_eq!(schedule, Some(Schedule::Every(120)));
        let grid = engine.grid();
        assert_eq!((grid.width, grid.height), (8, 6));
        assert_eq!(grid.snake.body, vec![
            Position::new(7, 5),
            Position::new(7, 5),
            Position::new(7, 5)
        ]);
        assert!(grid.is_in_bounds(grid.fruit));
        assert!(!grid.snake.occupies(grid.fruit));
        // stacked segments are tolerated
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.score(), 2);
    }

    #[test]
    fn test_resize_onto_covered_board_ends_game() {
        let mut engine = running_engine();
        let body = vec![Position::new(5, 5), Position::new(4, 5)];
        engine.grid_mut().snake = Snake::from_segments(body, Direction::Right);

        assert_eq!(engine.on_resize(1, 1), Some(Schedule::Stop));
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.grid().snake.body, vec![Position::new(0, 0); 2]);
        assert_eq!(engine.best_score(), 1);

        assert_eq!(engine.on_resize(1, 1), None);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.tick().event, TickEvent::Skipped);
    }

    #[test]
    fn test_resize_outside_running_keeps_scheduler() {
        let mut engine = engine();
        assert_eq!(engine.on_resize(8, 8), None);
        assert_eq!(engine.phase(), GamePhase::Idle);

        engine.start();
        engine.pause_toggle();
        assert_eq!(engine.on_resize(7, 7), None);
        assert_eq!(engine.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_resize_ignores_empty_layout() {
        let mut engine = running_engine();
        let before = engine.grid().clone();
        assert_eq!(engine.on_resize(0, 12), None);
        assert_eq!(engine.grid(), &before);
    }

    #[test]
    fn test_restart_uses_latest_layout() {
        let mut engine = running_engine();
        engine.on_resize(6, 14);
        engine.restart();
        assert_eq!(engine.grid().snake.head(), Position::new(7, 3));
        assert_eq!(engine.grid().width, 14);
    }
}
