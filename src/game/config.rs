use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Length of every freshly spawned snake
pub const INITIAL_SNAKE_LENGTH: usize = 2;

/// How the movement interval reacts to game events.
///
/// "Tighten" lowers the interval (faster snake) and never goes below the
/// floor that applies to the rule. "Relax" raises it, capped at the initial
/// speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedRules {
    /// Floor for collision, fruit, bomb and ramp tightening
    pub floor_ms: u64,
    /// Floor for time-booster tightening
    pub boost_floor_ms: u64,
    /// Tightening after losing a life to a wall or self collision
    pub collision_step: u64,
    /// Tightening applied on every `fruit_every`-th fruit
    pub fruit_step: u64,
    pub fruit_every: usize,
    /// Tightening after stepping on a bomb
    pub bomb_step: u64,
    /// Tightening while a time boost is active
    pub boost_step: u64,
    /// Relaxation when a time boost expires
    pub boost_restore_ms: u64,
    /// Tightening applied every `ramp_every_secs` seconds of play
    pub ramp_step: u64,
    /// `None` disables the time-based ramp
    pub ramp_every_secs: Option<u64>,
}

impl Default for SpeedRules {
    fn default() -> Self {
        Self {
            floor_ms: 50,
            boost_floor_ms: 30,
            collision_step: 20,
            fruit_step: 20,
            fruit_every: 3,
            bomb_step: 30,
            boost_step: 70,
            boost_restore_ms: 50,
            ramp_step: 30,
            ramp_every_secs: Some(30),
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Lives at the start of a round
    pub initial_lives: u32,
    /// Movement interval at the start of a round, and its upper bound
    pub initial_speed_ms: u64,
    /// Whole seconds of countdown before play starts
    pub countdown_secs: u32,
    /// How long a time boost lasts, in seconds of play
    pub boost_duration_secs: u64,

    // Item counts
    pub num_fruits: usize,
    pub num_bombs: usize,
    pub num_hearts: usize,

    pub speed: SpeedRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 15,
            initial_lives: 5,
            initial_speed_ms: 200,
            countdown_secs: 5,
            boost_duration_secs: 10,
            num_fruits: 1,
            num_bombs: 5,
            num_hearts: 1,
            speed: SpeedRules::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30)
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    ///
    /// Values are not validated here; call `validate` once any overrides
    /// are applied.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Cells reserved at the start of a round: the snake plus every item
    pub fn reserved_cells(&self) -> usize {
        INITIAL_SNAKE_LENGTH + self.num_fruits + self.num_bombs + self.num_hearts + 1
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size.saturating_mul(self.grid_size)
    }

    /// Check that the configuration can drive a round.
    ///
    /// Item placement samples until it finds a free cell, so at least half of
    /// the board has to stay free when a round starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
            });
        }

        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                size: self.grid_size,
            });
        }

        if self.initial_lives == 0 {
            return Err(ConfigError::NoLives);
        }

        if self.initial_speed_ms == 0 {
            return Err(ConfigError::ZeroSpeed);
        }

        let rules = &self.speed;
        if rules.boost_floor_ms == 0
            || rules.boost_floor_ms > rules.floor_ms
            || rules.floor_ms > self.initial_speed_ms
        {
            return Err(ConfigError::FloorsOutOfOrder {
                boost_floor: rules.boost_floor_ms,
                floor: rules.floor_ms,
                initial: self.initial_speed_ms,
            });
        }

        if rules.fruit_every == 0 {
            return Err(ConfigError::ZeroFruitCadence);
        }

        if rules.ramp_every_secs == Some(0) {
            return Err(ConfigError::ZeroRampCadence);
        }

        if self.countdown_secs == 0 {
            return Err(ConfigError::ZeroCountdown);
        }

        let capacity = self.cell_count();
        let limit = capacity / 2;
        let reserved = self.reserved_cells();
        if reserved > limit {
            return Err(ConfigError::Overcrowded {
                reserved,
                capacity,
                limit,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 15);
        assert_eq!(config.initial_lives, 5);
        assert_eq!(config.initial_speed_ms, 200);
        assert_eq!(config.countdown_secs, 5);
        assert_eq!(config.num_bombs, 5);
        assert_eq!(config.speed.floor_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(20);
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.initial_lives, 5);
        assert!(GameConfig::small().validate().is_ok());
        assert!(GameConfig::large().validate().is_ok());
    }

    #[test]
    fn test_grid_too_small() {
        let config = GameConfig::new(4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall { size: 4 })
        );
        assert!(GameConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_grid_too_large() {
        assert_eq!(
            GameConfig::new(50_000).validate(),
            Err(ConfigError::GridTooLarge { size: 50_000 })
        );

        let huge = (1usize << 32) + 15;
        assert_eq!(
            GameConfig::new(huge).validate(),
            Err(ConfigError::GridTooLarge { size: huge })
        );
        assert_eq!(GameConfig::new(huge).cell_count(), usize::MAX);

        assert!(GameConfig::new(MAX_GRID_SIZE).validate().is_ok());
    }

    #[test]
    fn test_zero_lives_and_speed_rejected() {
        let config = GameConfig {
            initial_lives: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoLives));

        let config = GameConfig {
            initial_speed_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpeed));
    }

    #[test]
    fn test_floors_must_be_ordered() {
        let mut config = GameConfig::default();
        config.speed.boost_floor_ms = 60;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FloorsOutOfOrder { .. })
        ));

        let mut config = GameConfig::default();
        config.speed.floor_ms = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cadences_rejected() {
        let mut config = GameConfig::default();
        config.speed.fruit_every = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroFruitCadence));

        let mut config = GameConfig::default();
        config.speed.ramp_every_secs = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroRampCadence));

        let mut config = GameConfig::default();
        config.speed.ramp_every_secs = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overcrowded_grid_rejected() {
        // 5x5 = 25 cells, limit 12; 2 + 1 + 10 + 1 + 1 = 15 reserved
        let config = GameConfig {
            grid_size: 5,
            num_bombs: 10,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Overcrowded {
                reserved: 15,
                capacity: 25,
                limit: 12,
            })
        );
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_size": 20, "speed": {{"bomb_step": 40}}}}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.speed.bomb_step, 40);
        assert_eq!(config.speed.fruit_step, 20);
        assert_eq!(config.initial_lives, 5);
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_size": 3}}"#).unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_size, 3);
        assert!(config.validate().is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(GameConfig::load(file.path()).is_err());
    }
}
