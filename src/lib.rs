//! Wrap Snake - a terminal Snake game on a wrap-around board
//!
//! This library provides:
//! - Core game logic: the board and the tick-driven engine (game module)
//! - Best-score persistence keyed by board (persistence module)
//! - TUI rendering and the responsive board layout (render module)
//! - Keyboard mapping (input module) and the interactive loop (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
