//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is driven by ticks and commands from the outside and hands back
//! snapshots for whatever presents the game.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod items;
pub mod movement;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::{GameConfig, SpeedRules};
pub use engine::{GameEngine, GameEvent, StepResult};
pub use error::ConfigError;
pub use grid::{Grid, Position};
pub use items::BoardItems;
pub use state::{CollisionType, GameSnapshot, GameState, Phase, Snake};
