//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The board is a torus, so the only way to lose is to bite yourself.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Axis, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, GameOverReason, GamePhase, Schedule, TickEvent, TickResult};
pub use state::{GridState, Position, Snake};
