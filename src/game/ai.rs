//! Steering for the red snake.
//!
//! Every tier works from the one-step projection of the head (clamped to the
//! grid) and never picks a move that lands on its own body. Easy follows the
//! larger axis toward or away from the player; medium and hard minimise the
//! Manhattan distance to the player head, with medium adding random moves.

use rand::Rng;
use rand::seq::SliceRandom;

use super::config::Difficulty;
use super::direction::Direction;
use super::movement::project;
use super::state::{AiMode, Grid, Position, Snake};

/// Directions whose next cell is not part of the snake's body, in
/// evaluation order
pub fn safe_directions(snake: &Snake, grid: Grid) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&direction| !snake.occupies(project(snake.head(), direction, grid)))
        .collect()
}

/// Decides the red snake's facing direction for the current AI turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiController {
    difficulty: Difficulty,
    random_move_chance: f64,
}

impl AiController {
    pub fn new(difficulty: Difficulty, random_move_chance: f64) -> Self {
        Self {
            difficulty,
            random_move_chance,
        }
    }

    /// Update the snake's direction toward (or away from) `target`.
    ///
    /// Leaves the direction untouched when no move is safe; the movement step
    /// then freezes the snake in place.
    pub fn steer<R: Rng>(
        &self,
        snake: &mut Snake,
        target: Position,
        grid: Grid,
        rng: &mut R,
    ) {
        let chosen = match self.difficulty {
            Difficulty::Easy => easy_choice(snake, target, grid, rng),
            Difficulty::Medium => {
                let mut best = closest_approach(snake, target, grid);
                if rng.gen_bool(self.random_move_chance) {
                    if let Some(&random) = safe_directions(snake, grid).choose(rng) {
                        best = random;
                    }
                }
                Some(best)
            }
            Difficulty::Hard => Some(closest_approach(snake, target, grid)),
        };

        if let Some(direction) = chosen {
            tracing::trace!(
                difficulty = ?self.difficulty,
                mode = ?snake.mode,
                from = ?snake.direction,
                to = ?direction,
                "ai turn"
            );
            snake.direction = direction;
        }
    }
}

/// Greedy axis choice with a random fallback among safe moves
fn easy_choice<R: Rng>(
    snake: &Snake,
    target: Position,
    grid: Grid,
    rng: &mut R,
) -> Option<Direction> {
    let candidates = safe_directions(snake, grid);
    if candidates.is_empty() {
        return None;
    }

    let head = snake.head();
    let preferred = match snake.mode {
        AiMode::Chase => {
            let (dx, dy) = (target.x - head.x, target.y - head.y);
            if dx.abs() > dy.abs() {
                Some(if dx > 0 { Direction::Right } else { Direction::Left })
            } else if dy != 0 {
                Some(if dy > 0 { Direction::Down } else { Direction::Up })
            } else {
                None
            }
        }
        AiMode::Flee => {
            let (dx, dy) = (head.x - target.x, head.y - target.y);
            if dx.abs() > dy.abs() {
                Some(if dx > 0 { Direction::Right } else { Direction::Left })
            } else {
                Some(if dy > 0 { Direction::Down } else { Direction::Up })
            }
        }
    };

    match preferred {
        Some(direction) if candidates.contains(&direction) => Some(direction),
        _ => candidates.choose(rng).copied(),
    }
}

/// Safe move that ends closest to `target` without stepping onto it.
///
/// The first strictly shorter distance wins, so ties go to the earlier
/// direction in `Direction::ALL`; with no acceptable move the current
/// direction is kept.
fn closest_approach(snake: &Snake, target: Position, grid: Grid) -> Direction {
    let head = snake.head();
    let mut best = snake.direction;
    let mut best_distance = u32::MAX;

    for direction in Direction::ALL {
        let next = project(head, direction, grid);
        if snake.occupies(next) || next == target {
            continue;
        }

        let distance = next.manhattan_distance(target);
        if distance < best_distance {
            best_distance = distance;
            best = direction;
        }
    }

    best
}
