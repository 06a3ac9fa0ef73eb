use thiserror::Error;

/// Smallest grid whose safe spawn zone `[2, size - 2)` is non-empty.
pub const MIN_GRID_SIZE: usize = 5;

/// Largest grid whose cell count still fits in an `i32`.
pub const MAX_GRID_SIZE: usize = 46_340;

/// Rejected game configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size {size} is too small, need at least {MIN_GRID_SIZE}")]
    GridTooSmall { size: usize },

    #[error("grid size {size} is too large, at most {MAX_GRID_SIZE} is supported")]
    GridTooLarge { size: usize },

    #[error("initial_lives must be at least 1")]
    NoLives,

    #[error("initial_speed_ms must be positive")]
    ZeroSpeed,

    #[error("speed floors must satisfy 0 < boost_floor_ms ({boost_floor}) <= floor_ms ({floor}) <= initial_speed_ms ({initial})")]
    FloorsOutOfOrder { boost_floor: u64, floor: u64, initial: u64 },

    #[error("fruit_every must be at least 1")]
    ZeroFruitCadence,

    #[error("ramp_every_secs must be at least 1 when set")]
    ZeroRampCadence,

    #[error("countdown_secs must be at least 1")]
    ZeroCountdown,

    #[error("{reserved} reserved cells leave too little room on a {capacity}-cell grid (limit {limit})")]
    Overcrowded {
        reserved: usize,
        capacity: usize,
        limit: usize,
    },
}
