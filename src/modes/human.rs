use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::game::{Difficulty, Direction, GameConfig, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::SessionStats;
use crate::render::{Overlay, Renderer};

/// Which screen has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu { selected: Difficulty },
    Playing,
}

pub struct HumanMode {
    /// Timing and seed settings shared by every difficulty
    config: GameConfig,
    engine: GameEngine,
    state: GameState,
    stats: SessionStats,
    renderer: Renderer,
    input_handler: InputHandler,
    screen: Screen,
    should_quit: bool,
}

impl HumanMode {
    /// Open on the difficulty menu, or go straight into a game with the
    /// configured settings when `show_menu` is false
    pub fn new(config: GameConfig, show_menu: bool) -> Self {
        let mut engine = GameEngine::new(config.clone());
        let mut stats = SessionStats::new();

        let (state, screen) = if show_menu {
            (
                engine.lobby(),
                Screen::Menu {
                    selected: config.difficulty,
                },
            )
        } else {
            stats.begin_episode();
            (engine.reset(), Screen::Playing)
        };

        Self {
            config,
            engine,
            state,
            stats,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            screen,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let tick_interval = Duration::from_millis(self.config.tick_interval_ms);
        let mut tick_timer = interval(tick_interval);
        // A slow frame must not be followed by a burst of catch-up ticks
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if self.screen == Screen::Playing && self.state.phase.is_running() {
                        self.update_game();
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.stats.refresh_clock();
                    let overlay = self.overlay();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.stats, overlay);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn overlay(&self) -> Overlay {
        match self.screen {
            Screen::Menu { selected } => Overlay::Menu { selected },
            Screen::Playing => Overlay::None,
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        if action == KeyAction::Quit {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Menu { selected } => match action {
                KeyAction::Steer(Direction::Up) => {
                    self.screen = Screen::Menu {
                        selected: cycle(selected, -1),
                    };
                }
                KeyAction::Steer(Direction::Down) => {
                    self.screen = Screen::Menu {
                        selected: cycle(selected, 1),
                    };
                }
                KeyAction::SelectDifficulty(difficulty) => self.start_game(difficulty),
                KeyAction::Confirm => self.start_game(selected),
                _ => {}
            },
            Screen::Playing => match action {
                KeyAction::Steer(direction) => {
                    self.engine.steer(&mut self.state, direction);
                }
                KeyAction::Restart => self.reset_game(),
                KeyAction::Menu => self.open_menu(),
                KeyAction::Confirm if self.state.phase.is_over() => self.open_menu(),
                _ => {}
            },
        }
    }

    fn update_game(&mut self) {
        let now = self.stats.episode_time();
        let result = self.engine.tick(&mut self.state, now);

        if let Some(reason) = result.end_reason {
            self.stats.record_end(&self.state, reason);
        }
    }

    /// Fresh engine for the chosen preset, then into survival
    fn start_game(&mut self, difficulty: Difficulty) {
        self.engine = GameEngine::new(preset_config(&self.config, difficulty));
        self.state = self.engine.lobby();
        self.engine.start(&mut self.state);
        self.stats.begin_episode();
        self.screen = Screen::Playing;
    }

    /// Same difficulty, new episode
    fn reset_game(&mut self) {
        self.state = self.engine.reset();
        self.stats.begin_episode();
    }

    /// A running episode left for the menu cannot be resumed
    fn open_menu(&mut self) {
        if self.state.phase.is_running() {
            self.stats.abandon_episode();
        }
        self.screen = Screen::Menu {
            selected: self.state.difficulty,
        };
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Custom settings on the preset grid. Starting positions and lengths that no
/// longer fit fall back to the preset's own, keeping timing, AI and seed.
fn preset_config(base: &GameConfig, difficulty: Difficulty) -> GameConfig {
    let config = base.clone().with_difficulty(difficulty);
    let Err(message) = config.validate() else {
        return config;
    };

    tracing::warn!(
        difficulty = difficulty.name(),
        %message,
        "custom layout does not fit the preset grid, using preset defaults"
    );
    GameConfig {
        tick_interval_ms: base.tick_interval_ms,
        power_up_spawn_interval_ms: base.power_up_spawn_interval_ms,
        power_up_duration_ms: base.power_up_duration_ms,
        medium_random_move_chance: base.medium_random_move_chance,
        spawn_attempts: base.spawn_attempts,
        seed: base.seed,
        ..GameConfig::for_difficulty(difficulty)
    }
}

/// Next preset up or down the menu, wrapping at the ends
fn cycle(current: Difficulty, step: isize) -> Difficulty {
    let all = Difficulty::ALL;
    let index = all
        .iter()
        .position(|&difficulty| difficulty == current)
        .unwrap_or(0) as isize;
    all[(index + step).rem_euclid(all.len() as isize) as usize]
}
