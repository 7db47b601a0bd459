//! Snake Duel - a snake game against an AI-controlled rival
//!
//! This library provides:
//! - Core simulation: movement, collisions, AI steering, the tick state machine (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering: first-person corridor and minimap (render module)
//! - Session statistics (metrics module)
//! - Interactive play (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
