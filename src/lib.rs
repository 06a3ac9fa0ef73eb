//! Hazard Snake - grid snake with lives, bombs, hearts and a time booster
//!
//! This library provides:
//! - Core game rules and state machine (game module)
//! - Keyboard and mouse mapping (input module)
//! - The timer-driven scheduler and terminal front-end (modes module)

pub mod game;
pub mod input;
pub mod modes;
