use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use wrap_snake::game::{GameConfig, GameEngine};
use wrap_snake::logging;
use wrap_snake::modes::{HumanMode, PlaySettings};
use wrap_snake::persistence::{JsonFileStore, MemoryStore, ScoreStore};

#[derive(Parser)]
#[command(name = "wrap_snake")]
#[command(version, about = "Snake on a wrap-around board")]
struct Cli {
    /// Fixed grid width. Without width and height the board follows the terminal size
    #[arg(long, requires = "height")]
    width: Option<usize>,

    /// Fixed grid height
    #[arg(long, requires = "width")]
    height: Option<usize>,

    /// Board identity; each board keeps its own best score
    #[arg(long, default_value = "default")]
    board: String,

    /// JSON game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Best score file
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Keep best scores in memory only
    #[arg(long, conflicts_with = "scores")]
    no_save: bool,

    /// Log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Wait for Enter instead of starting on launch
    #[arg(long)]
    no_autostart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        config.grid_width = width;
        config.grid_height = height;
    }
    config.validate()?;

    let settings = PlaySettings {
        responsive_grid: cli.width.is_none(),
        autostart_delay: (!cli.no_autostart).then(|| Duration::from_millis(config.start_delay_ms)),
    };

    if cli.no_save {
        return play(config, MemoryStore::new(), &cli.board, settings).await;
    }

    let store = JsonFileStore::new(cli.scores.unwrap_or_else(JsonFileStore::default_path));
    tracing::info!(path = ?store.path(), board = %cli.board, "using score file");
    play(config, store, &cli.board, settings).await
}

async fn play<S: ScoreStore>(
    config: GameConfig,
    store: S,
    board: &str,
    settings: PlaySettings,
) -> Result<()> {
    let engine = GameEngine::new(config, store, board);
    let mut human_mode = HumanMode::new(engine, settings);
    human_mode.run().await
}
