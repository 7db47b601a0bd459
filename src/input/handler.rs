use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Difficulty, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Arrow or WASD key; turns the snake, or moves the menu cursor
    Steer(Direction),
    /// Pick a difficulty directly from the menu
    SelectDifficulty(Difficulty),
    /// Start the highlighted difficulty, or retry after a game ends
    Confirm,
    /// Restart with the current difficulty
    Restart,
    /// Back to the difficulty menu
    Menu,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        // Letter bindings ignore shift and caps lock
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        match code {
            KeyCode::Up | KeyCode::Char('w') => KeyAction::Steer(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => KeyAction::Steer(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => KeyAction::Steer(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => KeyAction::Steer(Direction::Right),

            KeyCode::Char(digit @ '1'..='3') => {
                let index = digit as usize - '1' as usize;
                KeyAction::SelectDifficulty(Difficulty::ALL[index])
            }
            KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Confirm,
            KeyCode::Char('m') => KeyAction::Menu,

            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
