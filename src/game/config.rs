use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid (columns)
    pub grid_width: usize,
    /// Height of the game grid (rows)
    pub grid_height: usize,

    // Speed progression
    /// Tick interval at the start of every run
    pub base_interval_ms: u64,
    /// The interval never drops below this
    pub min_interval_ms: u64,
    /// How much faster each speed-up makes the game
    pub interval_step_ms: u64,
    /// Speed up whenever the score reaches a multiple of this
    pub speedup_every: u32,

    /// Delay before the first run starts on its own
    pub start_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            base_interval_ms: 120,
            min_interval_ms: 50,
            interval_step_ms: 8,
            speedup_every: 3,
            start_delay_ms: 300,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            bail!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width,
                self.grid_height
            );
        }
        if self.grid_width * self.grid_height < 2 {
            bail!("grid needs room for the snake and one fruit");
        }
        if self.min_interval_ms == 0 {
            bail!("min_interval_ms must be positive");
        }
        if self.min_interval_ms > self.base_interval_ms {
            bail!(
                "min_interval_ms ({}) exceeds base_interval_ms ({})",
                self.min_interval_ms,
                self.base_interval_ms
            );
        }
        if self.speedup_every == 0 {
            bail!("speedup_every must be positive");
        }
        Ok(())
    }
}
