use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use rand::Rng;

use super::layout::CELL_WIDTH;
use crate::game::{GameEngine, GamePhase, GridState, Position};
use crate::metrics::GameMetrics;
use crate::persistence::ScoreStore;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<S: ScoreStore, R: Rng>(
        &self,
        frame: &mut Frame,
        engine: &GameEngine<S, R>,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(engine, metrics);
        frame.render_widget(stats, chunks[0]);

        let grid = engine.grid();
        let board_area = centered(
            chunks[1],
            grid.width as u16 * CELL_WIDTH + 2,
            grid.height as u16 + 2,
        );
        frame.render_widget(self.render_grid(grid), board_area);

        if let Some(overlay) = self.render_overlay(engine) {
            let overlay_area = centered(board_area, board_area.width.min(36), 7);
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(overlay, overlay_area);
        }

        let controls = self.render_controls(engine.phase());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, grid: &GridState) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(grid.height);
        let head = grid.snake.head();

        for y in 0..grid.height {
            let mut spans = Vec::with_capacity(grid.width);

            for x in 0..grid.width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if grid.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::LightBlue))
                } else if pos == grid.fruit {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats<S: ScoreStore, R: Rng>(
        &self,
        engine: &GameEngine<S, R>,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                engine.score().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(engine.best_score().to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}ms", engine.interval_ms()), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(metrics.games_played.to_string(), value),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_overlay<S: ScoreStore, R: Rng>(
        &self,
        engine: &GameEngine<S, R>,
    ) -> Option<Paragraph<'_>> {
        let key = |k: &'static str| {
            Span::styled(
                k,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let gray = Style::default().fg(Color::Gray);

        let (title, color, body) = match engine.phase() {
            GamePhase::Running => return None,
            GamePhase::Idle => (
                "READY",
                Color::Cyan,
                vec![Line::from(vec![
                    Span::styled("Press ", gray),
                    key("Enter"),
                    Span::styled(" to start", gray),
                ])],
            ),
            GamePhase::Paused => (
                "PAUSED",
                Color::Yellow,
                vec![Line::from(vec![
                    Span::styled("Press ", gray),
                    key("Space"),
                    Span::styled(" to resume", gray),
                ])],
            ),
            GamePhase::GameOver => (
                "GAME OVER",
                Color::Red,
                vec![
                    Line::from(vec![
                        Span::styled("Score: ", Style::default().fg(Color::Yellow)),
                        Span::styled(
                            engine.score().to_string(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("   "),
                        Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                        Span::raw(engine.best_score().to_string()),
                    ]),
                    Line::from(vec![
                        Span::styled("Press ", gray),
                        key("R"),
                        Span::styled(" to restart", gray),
                    ]),
                ],
            ),
        };

        let mut lines = vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(body);

        Some(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
        )
    }

    fn render_controls(&self, phase: GamePhase) -> Paragraph<'_> {
        let pause_label = if phase == GamePhase::Paused {
            " resume | "
        } else {
            " pause | "
        };

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" start | "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(pause_label),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` rect centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
