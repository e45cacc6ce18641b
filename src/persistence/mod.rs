//! Best-score persistence
//!
//! Scores live in a small key-value store. The engine only ever talks to
//! [`BestScore`], which derives the key from a board identity and performs
//! the read-modify-write.

pub mod best_score;
pub mod store;

pub use best_score::BestScore;
pub use store::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
