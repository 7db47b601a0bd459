//! Placement of fruit and power-ups on free cells.
//!
//! Placement first tries a bounded number of random cells, then falls back to
//! a uniform pick among all free cells. A saturated grid yields `None` and the
//! spawn is skipped.

use rand::Rng;
use rand::seq::SliceRandom;

use super::state::{GameState, Grid, Position, PowerUp, PowerUpKind};

/// Random cell for which `blocked` is false
pub fn find_free_cell<R: Rng>(
    grid: Grid,
    attempts: usize,
    rng: &mut R,
    blocked: impl Fn(Position) -> bool,
) -> Option<Position> {
    for _ in 0..attempts {
        let pos = Position::new(
            rng.gen_range(0..grid.width as i32),
            rng.gen_range(0..grid.height as i32),
        );
        if !blocked(pos) {
            return Some(pos);
        }
    }

    let free: Vec<Position> = grid.cells().filter(|&pos| !blocked(pos)).collect();
    free.choose(rng).copied()
}

/// Add one fruit on a cell free of snakes and other fruit
pub fn spawn_fruit<R: Rng>(state: &mut GameState, attempts: usize, rng: &mut R) -> Option<Position> {
    let cell = find_free_cell(state.grid, attempts, rng, |pos| {
        state.is_occupied(pos) || state.has_fruit(pos)
    });

    match cell {
        Some(pos) => {
            state.fruits.push(pos);
            Some(pos)
        }
        None => {
            tracing::warn!(fruits = state.fruits.len(), "no free cell left for fruit");
            None
        }
    }
}

/// Fill the fruit set for a fresh episode.
///
/// Fruit is first scattered within `radius` cells of the player head (clamped
/// to the grid) so the opening is not empty-handed; whatever is still missing
/// after `attempts` tries lands anywhere on the grid.
pub fn spawn_initial_fruits<R: Rng>(
    state: &mut GameState,
    count: usize,
    radius: i32,
    attempts: usize,
    rng: &mut R,
) {
    state.fruits.clear();
    let head = state.player.head();

    let mut tries = 0;
    while state.fruits.len() < count && tries < attempts {
        let pos = state.grid.clamp(head.moved_by(
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
        ));
        if !state.is_occupied(pos) && !state.has_fruit(pos) {
            state.fruits.push(pos);
        }
        tries += 1;
    }

    while state.fruits.len() < count {
        if spawn_fruit(state, attempts, rng).is_none() {
            break;
        }
    }
}

/// Place a power-up unless one is already on the grid
pub fn spawn_power_up<R: Rng>(
    state: &mut GameState,
    kind: PowerUpKind,
    attempts: usize,
    rng: &mut R,
) -> Option<PowerUp> {
    if state.power_up.is_some() {
        return None;
    }

    let cell = find_free_cell(state.grid, attempts, rng, |pos| {
        state.is_occupied(pos) || state.has_fruit(pos)
    });

    let Some(position) = cell else {
        tracing::warn!("no free cell left for a power-up");
        return None;
    };

    let power_up = PowerUp { position, kind };
    state.power_up = Some(power_up);
    Some(power_up)
}
