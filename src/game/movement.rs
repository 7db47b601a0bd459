use super::direction::Direction;
use super::state::{Grid, Position, Snake};

/// What happened to a snake during one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Head advanced and the tail followed
    Moved,
    /// Head advanced and the tail stayed, consuming one pending growth
    Grew,
    /// Next cell was part of the body; nothing changed
    Frozen,
}

/// Cell one step from `from` in `direction`, held inside the grid
pub fn project(from: Position, direction: Direction, grid: Grid) -> Position {
    grid.clamp(from.moved_in_direction(direction))
}

/// Advance a snake one step in its facing direction.
///
/// Walls stop the head instead of wrapping it. When the clamped next cell is
/// already part of the body (tail included) the snake stays exactly where it
/// is for this tick.
pub fn advance(snake: &mut Snake, grid: Grid) -> MoveOutcome {
    let next_head = project(snake.head(), snake.direction, grid);

    if snake.occupies(next_head) {
        return MoveOutcome::Frozen;
    }

    snake.body.insert(0, next_head);

    if snake.grow > 0 {
        snake.grow -= 1;
        MoveOutcome::Grew
    } else {
        snake.body.pop();
        MoveOutcome::Moved
    }
}
