use anyhow::{Context, Result};
use clap::Parser;
use hazard_snake::game::{GameConfig, GameEngine};
use hazard_snake::modes::{HumanMode, SnapshotTrace};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hazard_snake")]
#[command(version, about = "Snake with lives, bombs, hearts and a time booster")]
struct Cli {
    /// JSON file with game settings (the flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Side length of the square grid
    #[arg(long)]
    grid_size: Option<usize>,

    /// Lives at the start of a round
    #[arg(long)]
    lives: Option<u32>,

    /// Initial movement interval in milliseconds
    #[arg(long)]
    speed: Option<u64>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Player name
    #[arg(long, default_value = "player")]
    name: String,

    /// Where to write the log
    #[arg(long, default_value = "hazard_snake.log")]
    log_file: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Record every snapshot as a JSON line to this file
    #[arg(long)]
    trace: Option<PathBuf>,
}

impl Cli {
    /// Settings from the config file (or defaults) with flag overrides applied
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if let Some(lives) = self.lives {
            config.initial_lives = lives;
        }
        if let Some(speed) = self.speed {
            config.initial_speed_ms = speed;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal is busy with the game, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    let config = cli.game_config()?;
    info!(
        "Starting on a {}x{} grid with {} lives",
        config.grid_size, config.grid_size, config.initial_lives
    );

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    }
    .context("Failed to set up the board")?;

    let mut human_mode = HumanMode::new(engine, cli.name.clone());
    if let Some(path) = &cli.trace {
        human_mode = human_mode.with_trace(SnapshotTrace::create(path)?);
    }

    let last = human_mode.run().await?;
    println!(
        "{}: {} fruits in {}",
        cli.name,
        last.fruits_eaten,
        last.format_time()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from(["hazard_snake", "--grid-size", "20", "--lives", "3"]).unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!(config.grid_size, 20);
        assert_eq!(config.initial_lives, 3);
        assert_eq!(config.initial_speed_ms, 200);
        assert_eq!(cli.name, "player");
        assert_eq!(cli.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_size": 12, "initial_speed_ms": 150}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["hazard_snake", "--config", &path, "--speed", "120"]).unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!(config.grid_size, 12);
        assert_eq!(config.initial_speed_ms, 120);
    }

    #[test]
    fn test_flags_repair_invalid_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_size": 3, "initial_speed_ms": 20}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["hazard_snake", "--config", &path]).unwrap();
        assert!(cli.game_config().is_err());

        let cli = Cli::try_parse_from([
            "hazard_snake",
            "--config",
            &path,
            "--grid-size",
            "12",
            "--speed",
            "150",
        ])
        .unwrap();
        let config = cli.game_config().unwrap();
        assert_eq!(config.grid_size, 12);
        assert_eq!(config.initial_speed_ms, 150);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::try_parse_from(["hazard_snake", "--lives", "0"]).unwrap();
        assert!(cli.game_config().is_err());

        let cli = Cli::try_parse_from(["hazard_snake", "--grid-size", "3"]).unwrap();
        assert!(cli.game_config().is_err());

        let cli = Cli::try_parse_from(["hazard_snake", "--grid-size", "50000"]).unwrap();
        assert!(cli.game_config().is_err());
    }
}
