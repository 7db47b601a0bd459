//! Pure queries over snake positions, evaluated once per tick after both
//! snakes have moved.

use super::state::{Position, Snake};

/// Head sits on one of the snake's own non-head segments
pub fn self_collided(snake: &Snake) -> bool {
    snake.collides_with_body(snake.head())
}

/// Both heads share a cell
pub fn heads_met(a: &Snake, b: &Snake) -> bool {
    a.head() == b.head()
}

/// Any segment of either snake covers the cell
pub fn occupied(player: &Snake, opponent: &Snake, pos: Position) -> bool {
    player.occupies(pos) || opponent.occupies(pos)
}
