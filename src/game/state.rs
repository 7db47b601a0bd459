use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::Difficulty;
use super::direction::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Fixed-size playing field; positions are clamped to it, never wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    /// Pull a position back onto the nearest edge cell
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, self.width as i32 - 1),
            pos.y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }
}

/// What the red snake is trying to do with respect to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    Chase,
    Flee,
}

/// A snake on the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
    /// Segments still to be added, one per move
    pub grow: u32,
    /// Behaviour of the AI; ignored for the player
    pub mode: AiMode,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self {
            body,
            direction,
            grow: 0,
            mode: AiMode::Chase,
        }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Self {
            body,
            direction,
            grow: 0,
            mode: AiMode::Chase,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if any segment, head included, is on the position
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Effect carried by a power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Fruit is worth double score and double growth
    DoubleScore,
}

impl PowerUpKind {
    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::DoubleScore => "x2",
        }
    }
}

/// A power-up lying on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub position: Position,
    pub kind: PowerUpKind,
}

/// A collected power-up whose effect is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    /// Episode time at which the effect ends
    pub expires_at: Duration,
}

/// Phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to pick a difficulty
    Start,
    /// The red snake chases the player
    Survival,
    /// The player is at least twice as long and may eat the red snake
    Hunt,
    Win,
    Lose,
}

impl GamePhase {
    /// Whether ticks advance the snakes
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Survival | GamePhase::Hunt)
    }

    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Win | GamePhase::Lose)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Start => "Start",
            GamePhase::Survival => "Survival",
            GamePhase::Hunt => "Hunt",
            GamePhase::Win => "Win",
            GamePhase::Lose => "Lose",
        }
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Player head ran into the player's own body
    PlayerSelfCollision,
    /// Red snake head ran into its own body
    OpponentSelfCollision,
    /// Heads met during the hunt while the player was twice as long
    OpponentEaten,
    /// Heads met under any other circumstances
    PlayerCaught,
}

impl EndReason {
    pub fn phase(&self) -> GamePhase {
        match self {
            EndReason::PlayerSelfCollision | EndReason::PlayerCaught => GamePhase::Lose,
            EndReason::OpponentSelfCollision | EndReason::OpponentEaten => GamePhase::Win,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EndReason::PlayerSelfCollision => "You ran into yourself!",
            EndReason::OpponentSelfCollision => "Red snake ran into itself!",
            EndReason::OpponentEaten => "You attacked and ate the red snake!",
            EndReason::PlayerCaught => "Red snake caught you!",
        }
    }
}

/// Complete simulation context for one episode
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub grid: Grid,
    pub difficulty: Difficulty,
    /// The green snake steered by the keyboard
    pub player: Snake,
    /// The red snake steered by the AI
    pub opponent: Snake,
    pub fruits: Vec<Position>,
    /// At most one power-up is on the grid at a time
    pub power_up: Option<PowerUp>,
    pub active_effect: Option<ActiveEffect>,
    pub score: u32,
    pub phase: GamePhase,
    /// Latest phase or end-of-game message
    pub message: Option<String>,
    pub ticks: u64,
    /// Flipped every tick; the AI decides when it turns true
    pub ai_turn: bool,
    /// Episode time of the last power-up spawn check that fired
    pub last_power_up_spawn: Duration,
    /// Episode time of the latest tick
    pub elapsed: Duration,
}

impl GameState {
    /// Create a new game state in the survival phase
    pub fn new(
        grid: Grid,
        difficulty: Difficulty,
        player: Snake,
        opponent: Snake,
        fruits: Vec<Position>,
    ) -> Self {
        Self {
            grid,
            difficulty,
            player,
            opponent,
            fruits,
            power_up: None,
            active_effect: None,
            score: 0,
            phase: GamePhase::Survival,
            message: None,
            ticks: 0,
            ai_turn: false,
            last_power_up_spawn: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    /// Check if a position is occupied by either snake
    pub fn is_occupied(&self, pos: Position) -> bool {
        super::collision::occupied(&self.player, &self.opponent, pos)
    }

    pub fn has_fruit(&self, pos: Position) -> bool {
        self.fruits.contains(&pos)
    }

    /// Whether an active effect of the given kind is running
    pub fn effect_active(&self, kind: PowerUpKind) -> bool {
        self.active_effect
            .is_some_and(|effect| effect.kind == kind && self.elapsed < effect.expires_at)
    }

    /// Time left on the active effect, if any
    pub fn effect_remaining(&self) -> Option<Duration> {
        self.active_effect
            .map(|effect| effect.expires_at.saturating_sub(self.elapsed))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Player is at least twice as long as the red snake
    pub fn player_dominates(&self) -> bool {
        self.player.len() >= 2 * self.opponent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        GameState::new(
            Grid::new(20, 20),
            Difficulty::Medium,
            Snake::new(Position::new(10, 10), Direction::Right, 3),
            Snake::new(Position::new(5, 5), Direction::Right, 2),
            vec![Position::new(15, 15)],
        )
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(1, 1);
        assert_eq!(a.manhattan_distance(Position::new(4, 5)), 7);
        assert_eq!(a.manhattan_distance(Position::new(-2, 1)), 3);
        assert_eq!(a.manhattan_distance(a), 0);
    }

    #[test]
    fn test_grid_clamp() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.clamp(Position::new(-1, 4)), Position::new(0, 4));
        assert_eq!(grid.clamp(Position::new(10, 10)), Position::new(9, 9));
        assert_eq!(grid.clamp(Position::new(3, 3)), Position::new(3, 3));
    }

    #[test]
    fn test_bounds_checking() {
        let grid = Grid::new(20, 20);
        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(19, 19)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(!grid.contains(Position::new(20, 0)));
        assert!(!grid.contains(Position::new(0, 20)));
    }

    #[test]
    fn test_grid_cells() {
        let grid = Grid::new(3, 2);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(cells[3], Position::new(0, 1));
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.body[1], Position::new(4, 5));
        assert_eq!(snake.tail(), Position::new(3, 5));
        assert_eq!(snake.grow, 0);
        assert_eq!(snake.mode, AiMode::Chase);
    }

    #[test]
    fn test_collision_detection() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert!(!snake.collides_with_body(Position::new(5, 5))); // head
        assert!(snake.collides_with_body(Position::new(4, 5))); // body
        assert!(!snake.collides_with_body(Position::new(10, 10))); // empty
        assert!(snake.occupies(Position::new(5, 5)));
    }

    #[test]
    fn test_occupancy_covers_both_snakes() {
        let state = sample_state();
        assert!(state.is_occupied(Position::new(9, 10)));
        assert!(state.is_occupied(Position::new(4, 5)));
        assert!(!state.is_occupied(Position::new(15, 15)));
        assert!(state.has_fruit(Position::new(15, 15)));
    }

    #[test]
    fn test_effect_window() {
        let mut state = sample_state();
        assert!(!state.effect_active(PowerUpKind::DoubleScore));

        state.active_effect = Some(ActiveEffect {
            kind: PowerUpKind::DoubleScore,
            expires_at: Duration::from_secs(15),
        });
        state.elapsed = Duration::from_secs(10);
        assert!(state.effect_active(PowerUpKind::DoubleScore));
        assert_eq!(state.effect_remaining(), Some(Duration::from_secs(5)));

        state.elapsed = Duration::from_secs(15);
        assert!(!state.effect_active(PowerUpKind::DoubleScore));
        assert_eq!(state.effect_remaining(), None);
    }

    #[test]
    fn test_player_dominates() {
        let mut state = sample_state();
        assert!(!state.player_dominates());

        state.player = Snake::new(Position::new(10, 10), Direction::Right, 4);
        assert!(state.player_dominates());
    }

    #[test]
    fn test_phase_flags() {
        assert!(GamePhase::Survival.is_running());
        assert!(GamePhase::Hunt.is_running());
        assert!(!GamePhase::Start.is_running());
        assert!(GamePhase::Win.is_over());
        assert!(GamePhase::Lose.is_over());
        assert!(!GamePhase::Hunt.is_over());
    }
}
