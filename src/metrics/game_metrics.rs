use std::time::{Duration, Instant};

use crate::game::GamePhase;

/// Per-session play statistics shown next to the board.
///
/// The clock only advances while a run is actually ticking.
pub struct GameMetrics {
    last_update: Instant,
    pub elapsed_time: Duration,
    pub games_played: u32,
    /// Best score of this session only; the persisted best lives in the store
    pub session_best: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            elapsed_time: Duration::ZERO,
            games_played: 0,
            session_best: 0,
        }
    }

    pub fn update(&mut self, phase: GamePhase) {
        let now = Instant::now();
        if phase == GamePhase::Running {
            self.elapsed_time += now.duration_since(self.last_update);
        }
        self.last_update = now;
    }

    pub fn on_game_start(&mut self) {
        self.last_update = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        self.session_best = self.session_best.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
