use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::state::Position;

/// Difficulty preset, chosen once per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Grid side length and number of fruits for this preset
    pub fn preset(&self) -> (usize, usize) {
        match self {
            Difficulty::Easy => (40, 3),
            Difficulty::Medium => (60, 5),
            Difficulty::Hard => (80, 7),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// AI tier for the red snake
    pub difficulty: Difficulty,
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Number of fruits kept on the grid
    pub fruit_count: usize,
    /// Initial length of the player snake
    pub player_initial_length: usize,
    /// Head cell of the red snake on reset
    pub opponent_start: Position,
    /// Initial length of the red snake
    pub opponent_initial_length: usize,

    /// Simulation tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Minimum time between power-up spawns
    pub power_up_spawn_interval_ms: u64,
    /// How long a collected power-up stays active
    pub power_up_duration_ms: u64,

    /// Chance per AI turn that the medium AI picks a random safe direction
    pub medium_random_move_chance: f64,
    /// Random placement attempts before falling back to a grid scan
    pub spawn_attempts: usize,
    /// Initial fruits are first tried within this many cells of the player head
    pub initial_fruit_radius: i32,

    /// Seed for the simulation RNG; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            grid_width: 60,
            grid_height: 60,
            fruit_count: 5,
            player_initial_length: 3,
            opponent_start: Position::new(5, 5),
            opponent_initial_length: 2,
            tick_interval_ms: 60,
            power_up_spawn_interval_ms: 60_000,
            power_up_duration_ms: 15_000,
            medium_random_move_chance: 0.2,
            spawn_attempts: 100,
            initial_fruit_radius: 3,
            seed: None,
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

    /// Configuration for one of the menu presets
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self::default().with_difficulty(difficulty)
    }

    /// Apply a difficulty preset, keeping timing and seed settings
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        let (side, fruits) = difficulty.preset();
        self.difficulty = difficulty;
        self.grid_width = side;
        self.grid_height = side;
        self.fruit_count = fruits;
        self
    }

    /// Check that the configuration describes a playable game
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width < 8 || self.grid_height < 8 {
            return Err(format!(
                "grid must be at least 8x8, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.grid_width > i32::MAX as usize || self.grid_height > i32::MAX as usize {
            return Err("grid dimensions do not fit in a cell coordinate".to_string());
        }

        if self.player_initial_length == 0 || self.opponent_initial_length == 0 {
            return Err("snakes need at least one segment".to_string());
        }

        if self.player_initial_length > self.grid_width / 2 + 1 {
            return Err(format!(
                "player_initial_length ({}) does not fit left of the grid centre",
                self.player_initial_length
            ));
        }

        let start = self.opponent_start;
        if start.x < 0
            || start.y < 0
            || start.x as usize >= self.grid_width
            || start.y as usize >= self.grid_height
        {
            return Err(format!(
                "opponent_start ({}, {}) is outside the grid",
                start.x, start.y
            ));
        }

        if (start.x as usize) + 1 < self.opponent_initial_length {
            return Err(format!(
                "opponent_initial_length ({}) does not fit left of opponent_start",
                self.opponent_initial_length
            ));
        }

        // Both snakes start as horizontal runs extending left of their heads
        let player_head_x = (self.grid_width / 2) as i32;
        let player_y = (self.grid_height / 2) as i32;
        let player_tail_x = player_head_x - self.player_initial_length as i32 + 1;
        let opponent_tail_x = start.x - self.opponent_initial_length as i32 + 1;
        if start.y == player_y && opponent_tail_x <= player_head_x && player_tail_x <= start.x {
            return Err(format!(
                "opponent_start ({}, {}) overlaps the player's starting body",
                start.x, start.y
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be at least 1".to_string());
        }

        if !(0.0..=1.0).contains(&self.medium_random_move_chance) {
            return Err(format!(
                "medium_random_move_chance must be in [0, 1], got {}",
                self.medium_random_move_chance
            ));
        }

        if self.initial_fruit_radius < 0 {
            return Err(format!(
                "initial_fruit_radius must be non-negative, got {}",
                self.initial_fruit_radius
            ));
        }

        Ok(())
    }
}
