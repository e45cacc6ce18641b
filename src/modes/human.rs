use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{interval, sleep};

use super::scheduler::Ticker;
use crate::game::{GameEngine, GamePhase, Schedule, TickEvent, TickResult};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::persistence::ScoreStore;
use crate::render::{Renderer, grid_size_for_area};

/// How the interactive session behaves around the engine
#[derive(Debug, Clone)]
pub struct PlaySettings {
    /// Size the board from the terminal and follow resizes
    pub responsive_grid: bool,
    /// Start the first run on its own after this delay
    pub autostart_delay: Option<Duration>,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            responsive_grid: true,
            autostart_delay: Some(Duration::from_millis(300)),
        }
    }
}

pub struct HumanMode<S> {
    engine: GameEngine<S>,
    settings: PlaySettings,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<S: ScoreStore> HumanMode<S> {
    pub fn new(engine: GameEngine<S>, settings: PlaySettings) -> Self {
        Self {
            engine,
            settings,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        if self.settings.responsive_grid {
            let size = terminal.size().context("Failed to read terminal size")?;
            self.resize(size.width, size.height);
        }

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = Ticker::stopped();

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        let autostart = sleep(self.settings.autostart_delay.unwrap_or_default());
        tokio::pin!(autostart);
        let mut autostart_pending = self.settings.autostart_delay.is_some();

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        if let Some(schedule) = self.handle_event(event) {
                            ticker.apply(schedule);
                        }
                    }
                }

                // Game logic tick
                _ = ticker.tick() => {
                    let result = self.update_game();
                    if let Some(schedule) = result.schedule {
                        ticker.apply(schedule);
                    }
                }

                _ = &mut autostart, if autostart_pending => {
                    autostart_pending = false;
                    if let Some(schedule) = self.handle_action(KeyAction::Start) {
                        ticker.apply(schedule);
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update(self.engine.phase());
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.engine, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Option<Schedule> {
        match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = self.input_handler.handle_key_event(key);
                self.handle_action(action)
            }
            Event::Resize(width, height) if self.settings.responsive_grid => {
                self.resize(width, height)
            }
            _ => None,
        }
    }

    fn handle_action(&mut self, action: KeyAction) -> Option<Schedule> {
        match action {
            KeyAction::Turn(direction) => {
                self.engine.set_heading(direction);
                None
            }
            KeyAction::Start => {
                let was_idle = self.engine.phase() == GamePhase::Idle;
                let schedule = self.engine.start();
                if was_idle && schedule.is_some() {
                    self.metrics.on_game_start();
                }
                schedule
            }
            KeyAction::PauseToggle => self.engine.pause_toggle(),
            KeyAction::Restart => {
                self.metrics.on_game_start();
                Some(self.engine.restart())
            }
            KeyAction::Quit => {
                self.should_quit = true;
                None
            }
            KeyAction::None => None,
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> Option<Schedule> {
        let (rows, cols) = grid_size_for_area(width, height);
        let grid = self.engine.grid();
        if (grid.height, grid.width) == (rows, cols) {
            return None;
        }

        tracing::debug!(rows, cols, "terminal resized");
        let schedule = self.engine.on_resize(rows, cols);

        if schedule == Some(Schedule::Stop) && self.engine.phase() == GamePhase::GameOver {
            let score = self.engine.score();
            tracing::info!(score, best = self.engine.best_score(), "run finished by resize");
            self.metrics.on_game_over(score);
        }

        schedule
    }

    fn update_game(&mut self) -> TickResult {
        let result = self.engine.tick();

        if let TickEvent::GameOver(reason) = result.event {
            tracing::info!(?reason, score = result.score, best = result.best_score, "run finished");
            self.metrics.on_game_over(result.score);
        }

        result
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
