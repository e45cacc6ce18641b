pub mod human;
pub mod scheduler;

pub use human::{HumanMode, PlaySettings};
pub use scheduler::Ticker;
