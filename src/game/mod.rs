//! Core simulation for the snake duel
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The terminal front end drives it through `GameEngine::tick` and reads `GameState`.

pub mod ai;
pub mod collision;
pub mod config;
pub mod direction;
pub mod engine;
pub mod movement;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use ai::AiController;
pub use config::{Difficulty, GameConfig};
pub use direction::Direction;
pub use engine::{GameEngine, HUNT_MESSAGE, TickInfo, TickResult};
pub use movement::MoveOutcome;
pub use state::{
    ActiveEffect, AiMode, EndReason, GamePhase, GameState, Grid, Position, PowerUp, PowerUpKind,
    Snake,
};
