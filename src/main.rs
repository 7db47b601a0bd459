use anyhow::{Context, Result, anyhow};
use clap::Parser;
use duel_snake::game::{Difficulty, GameConfig};
use duel_snake::modes::HumanMode;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duel_snake")]
#[command(version, about = "Snake duel against an AI-controlled red snake")]
struct Cli {
    /// AI difficulty; also picks the grid size and fruit count
    #[arg(long, value_enum)]
    difficulty: Option<Difficulty>,

    /// Grid width (overrides the difficulty preset)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the difficulty preset)
    #[arg(long)]
    height: Option<usize>,

    /// Number of fruits on the grid (overrides the difficulty preset)
    #[arg(long)]
    fruits: Option<usize>,

    /// Simulation tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with base game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file; RUST_LOG sets the level
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Start playing right away instead of showing the difficulty menu
    #[arg(long)]
    skip_menu: bool,
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Config file first, then the difficulty preset, then explicit flags
fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };

    if let Some(difficulty) = cli.difficulty {
        config = config.with_difficulty(difficulty);
    }
    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    if let Some(fruits) = cli.fruits {
        config.fruit_count = fruits;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    config
        .validate()
        .map_err(|message| anyhow!("Invalid game configuration: {message}"))?;

    Ok(config)
}

/// Logs go to a file; the terminal belongs to the game
fn init_logging(path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = build_config(&cli)?;
    tracing::info!(
        difficulty = ?config.difficulty,
        width = config.grid_width,
        height = config.grid_height,
        tick_ms = config.tick_interval_ms,
        "starting"
    );

    let mut human_mode = HumanMode::new(config, !cli.skip_menu);
    human_mode.run().await?;

    Ok(())
}
