use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

use super::{
    ai::AiController,
    collision,
    config::GameConfig,
    direction::Direction,
    movement::{self, MoveOutcome},
    spawn,
    state::{
        ActiveEffect, AiMode, EndReason, GamePhase, GameState, Grid, Position, PowerUp,
        PowerUpKind, Snake,
    },
};

/// Shown once when the player becomes long enough to hunt
pub const HUNT_MESSAGE: &str = "Hunt phase! Chase the red snake!";

/// Information about a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInfo {
    /// How the player snake moved, if the tick ran
    pub player_move: Option<MoveOutcome>,
    /// How the red snake moved, if the tick got that far
    pub opponent_move: Option<MoveOutcome>,
    /// Score gained from fruit this tick (0, 1 or 2)
    pub score_gained: u32,
    pub opponent_ate: bool,
    /// Whether the AI picked a new direction this tick
    pub ai_turn: bool,
    pub entered_hunt: bool,
    pub power_up_spawned: Option<PowerUp>,
    pub power_up_collected: Option<PowerUpKind>,
    pub effect_expired: bool,
}

/// Result of a game tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Whether the episode has ended
    pub terminated: bool,
    /// Set on the tick that ended the episode
    pub end_reason: Option<EndReason>,
    /// Additional information about the tick
    pub info: TickInfo,
}

/// Drives the simulation: sequences each tick and decides phase changes
pub struct GameEngine {
    config: GameConfig,
    ai: AiController,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            ai: AiController::new(config.difficulty, config.medium_random_move_chance),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to a fresh episode in the survival phase
    pub fn reset(&mut self) -> GameState {
        let config = &self.config;
        let grid = Grid::new(config.grid_width, config.grid_height);

        let player = Snake::new(
            Position::new((config.grid_width / 2) as i32, (config.grid_height / 2) as i32),
            Direction::Right,
            config.player_initial_length,
        );
        let opponent = Snake::new(
            config.opponent_start,
            Direction::Right,
            config.opponent_initial_length,
        );

        let mut state = GameState::new(grid, config.difficulty, player, opponent, Vec::new());
        spawn::spawn_initial_fruits(
            &mut state,
            config.fruit_count,
            config.initial_fruit_radius,
            config.spawn_attempts,
            &mut self.rng,
        );

        tracing::info!(
            difficulty = ?config.difficulty,
            width = config.grid_width,
            height = config.grid_height,
            fruits = state.fruits.len(),
            "new episode"
        );

        state
    }

    /// A fresh episode held in the start phase until `start` is called
    pub fn lobby(&mut self) -> GameState {
        let mut state = self.reset();
        state.phase = GamePhase::Start;
        state
    }

    /// Leave the start phase
    pub fn start(&self, state: &mut GameState) {
        if state.phase == GamePhase::Start {
            state.phase = GamePhase::Survival;
        }
    }

    /// Propose a new facing direction for the player.
    ///
    /// Reversing straight into the neck is refused, as is any input while the
    /// episode is not running. Accepted changes apply on the next tick.
    pub fn steer(&self, state: &mut GameState, direction: Direction) -> bool {
        if !state.phase.is_running() || state.player.direction.is_opposite(direction) {
            return false;
        }

        state.player.direction = direction;
        true
    }

    /// Advance the simulation by one tick.
    ///
    /// `now` is the time since the episode started; it drives the power-up
    /// spawn clock and effect expiry.
    pub fn tick(&mut self, state: &mut GameState, now: Duration) -> TickResult {
        if !state.phase.is_running() {
            return TickResult {
                terminated: state.phase.is_over(),
                end_reason: None,
                info: TickInfo::default(),
            };
        }

        let mut info = TickInfo::default();
        state.elapsed = now;
        state.ticks += 1;

        if let Some(effect) = state.active_effect {
            if now >= effect.expires_at {
                state.active_effect = None;
                info.effect_expired = true;
                tracing::debug!(kind = ?effect.kind, "power-up effect expired");
            }
        }

        info.player_move = Some(movement::advance(&mut state.player, state.grid));
        info.score_gained = self.player_eats(state);

        state.ai_turn = !state.ai_turn;
        if state.ai_turn {
            let target = state.player.head();
            self.ai
                .steer(&mut state.opponent, target, state.grid, &mut self.rng);
            info.ai_turn = true;
        }

        info.opponent_move = Some(movement::advance(&mut state.opponent, state.grid));
        info.opponent_ate = self.opponent_eats(state);

        if let Some(reason) = Self::check_ending(state) {
            state.phase = reason.phase();
            state.message = Some(reason.message().to_string());
            tracing::info!(
                outcome = reason.phase().name(),
                reason = ?reason,
                score = state.score,
                ticks = state.ticks,
                "episode over"
            );

            return TickResult {
                terminated: true,
                end_reason: Some(reason),
                info,
            };
        }

        if state.phase == GamePhase::Survival && state.player_dominates() {
            state.phase = GamePhase::Hunt;
            state.opponent.mode = AiMode::Flee;
            state.message = Some(HUNT_MESSAGE.to_string());
            info.entered_hunt = true;
            tracing::info!(
                player_len = state.player.len(),
                opponent_len = state.opponent.len(),
                "hunt phase"
            );
        }

        self.update_power_up(state, now, &mut info);

        TickResult {
            terminated: false,
            end_reason: None,
            info,
        }
    }

    /// Player head on a fruit: grow and score, doubled while the x2 effect
    /// runs. Returns the score gained.
    fn player_eats(&mut self, state: &mut GameState) -> u32 {
        if !take_fruit(&mut state.fruits, state.player.head()) {
            return 0;
        }

        let gain = if state.effect_active(PowerUpKind::DoubleScore) {
            2
        } else {
            1
        };
        state.player.grow += gain;
        state.score += gain;
        spawn::spawn_fruit(state, self.config.spawn_attempts, &mut self.rng);

        tracing::debug!(score = state.score, gain, "player ate fruit");
        gain
    }

    /// Red snake head on a fruit: grow only, no score
    fn opponent_eats(&mut self, state: &mut GameState) -> bool {
        if !take_fruit(&mut state.fruits, state.opponent.head()) {
            return false;
        }

        state.opponent.grow += 1;
        spawn::spawn_fruit(state, self.config.spawn_attempts, &mut self.rng);

        tracing::debug!(opponent_len = state.opponent.len(), "red snake ate fruit");
        true
    }

    /// Terminal conditions, in priority order
    fn check_ending(state: &GameState) -> Option<EndReason> {
        if collision::self_collided(&state.player) {
            return Some(EndReason::PlayerSelfCollision);
        }

        if collision::self_collided(&state.opponent) {
            return Some(EndReason::OpponentSelfCollision);
        }

        if collision::heads_met(&state.player, &state.opponent) {
            if state.phase == GamePhase::Hunt && state.player_dominates() {
                return Some(EndReason::OpponentEaten);
            }
            return Some(EndReason::PlayerCaught);
        }

        None
    }

    /// Periodic spawn, then pickup by the player head
    fn update_power_up(&mut self, state: &mut GameState, now: Duration, info: &mut TickInfo) {
        let spawn_interval = Duration::from_millis(self.config.power_up_spawn_interval_ms);
        if now.saturating_sub(state.last_power_up_spawn) >= spawn_interval {
            info.power_up_spawned = spawn::spawn_power_up(
                state,
                PowerUpKind::DoubleScore,
                self.config.spawn_attempts,
                &mut self.rng,
            );
            state.last_power_up_spawn = now;

            if let Some(power_up) = info.power_up_spawned {
                tracing::debug!(x = power_up.position.x, y = power_up.position.y, "power-up spawned");
            }
        }

        let Some(power_up) = state.power_up else {
            return;
        };
        if power_up.position != state.player.head() {
            return;
        }

        state.power_up = None;
        state.active_effect = Some(ActiveEffect {
            kind: power_up.kind,
            expires_at: now + Duration::from_millis(self.config.power_up_duration_ms),
        });
        info.power_up_collected = Some(power_up.kind);
        tracing::info!(kind = power_up.kind.label(), "power-up collected");
    }
}

/// Remove the fruit at `at`, if there is one
fn take_fruit(fruits: &mut Vec<Position>, at: Position) -> bool {
    match fruits.iter().position(|&fruit| fruit == at) {
        Some(index) => {
            fruits.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Difficulty;

    const TICK: Duration = Duration::from_millis(60);

    fn engine(difficulty: Difficulty) -> GameEngine {
        GameEngine::new(GameConfig {
            seed: Some(7),
            ..GameConfig::for_difficulty(difficulty)
        })
    }

    /// 10x10 board with the player heading right along row 5
    fn duel(player_len: usize, opponent: Snake) -> GameState {
        GameState::new(
            Grid::new(10, 10),
            Difficulty::Hard,
            Snake::new(Position::new(5, 5), Direction::Right, player_len),
            opponent,
            Vec::new(),
        )
    }

    fn far_opponent() -> Snake {
        Snake::new(Position::new(1, 8), Direction::Right, 2)
    }

    #[test]
    fn test_reset() {
        let mut engine = engine(Difficulty::Easy);
        let state = engine.reset();

        assert_eq!(state.phase, GamePhase::Survival);
        assert_eq!(state.score, 0);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.grid, Grid::new(40, 40));
        assert_eq!(
            state.player.body,
            vec![Position::new(20, 20), Position::new(19, 20), Position::new(18, 20)]
        );
        assert_eq!(state.player.direction, Direction::Right);
        assert_eq!(
            state.opponent.body,
            vec![Position::new(5, 5), Position::new(4, 5)]
        );
        assert_eq!(state.opponent.mode, AiMode::Chase);
        assert_eq!(state.fruits.len(), 3);
        assert!(state.fruits.iter().all(|&fruit| !state.is_occupied(fruit)));
        assert!(state.power_up.is_none());
        assert!(state.active_effect.is_none());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_fruit_count_per_difficulty() {
        for (difficulty, count) in [
            (Difficulty::Easy, 3),
            (Difficulty::Medium, 5),
            (Difficulty::Hard, 7),
        ] {
            let state = engine(difficulty).reset();
            assert_eq!(state.fruits.len(), count);
        }
    }

    #[test]
    fn test_lobby_waits_for_start() {
        let mut engine = engine(Difficulty::Medium);
        let mut state = engine.lobby();
        let before = state.clone();

        let result = engine.tick(&mut state, TICK);
        assert!(!result.terminated);
        assert_eq!(state, before);

        engine.start(&mut state);
        assert_eq!(state.phase, GamePhase::Survival);
    }

    #[test]
    fn test_fruit_consumption() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.fruits = vec![Position::new(6, 5)];

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.info.score_gained, 1);
        assert_eq!(state.player.head(), Position::new(6, 5));
        assert_eq!(state.player.len(), 3);
        assert_eq!(state.player.grow, 1);
        assert_eq!(state.score, 1);
        assert_eq!(state.fruits.len(), 1);
        assert_ne!(state.fruits[0], Position::new(6, 5));

        engine.tick(&mut state, TICK * 2);
        assert_eq!(state.player.len(), 4);
    }

    #[test]
    fn test_double_score_effect() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.fruits = vec![Position::new(6, 5)];
        state.active_effect = Some(ActiveEffect {
            kind: PowerUpKind::DoubleScore,
            expires_at: Duration::from_secs(15),
        });

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.info.score_gained, 2);
        assert_eq!(state.score, 2);
        assert_eq!(state.player.grow, 2);
    }

    #[test]
    fn test_opponent_fruit_grows_without_score() {
        let mut engine = engine(Difficulty::Hard);
        // The AI skips this tick, so the red snake keeps heading right onto the fruit
        let mut state = duel(3, far_opponent());
        state.ai_turn = true;
        state.fruits = vec![Position::new(2, 8)];

        let result = engine.tick(&mut state, TICK);

        assert!(result.info.opponent_ate);
        assert!(!result.info.ai_turn);
        assert_eq!(state.opponent.grow, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.fruits.len(), 1);
    }

    #[test]
    fn test_ai_runs_every_other_tick() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());

        let turns: Vec<bool> = (1..=6)
            .map(|i| engine.tick(&mut state, TICK * i).info.ai_turn)
            .collect();

        assert_eq!(turns, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_boxed_in_opponent_freezes() {
        let mut engine = engine(Difficulty::Medium);
        let opponent = Snake::from_segments(
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(2, 2),
                Position::new(1, 2),
                Position::new(0, 2),
                Position::new(0, 1),
                Position::new(0, 0),
                Position::new(1, 0),
            ],
            Direction::Left,
        );
        let mut state = duel(3, opponent.clone());

        let result = engine.tick(&mut state, TICK);

        assert!(result.info.ai_turn);
        assert_eq!(result.info.opponent_move, Some(MoveOutcome::Frozen));
        assert_eq!(state.opponent, opponent);
        assert_eq!(state.phase, GamePhase::Survival);
    }

    #[test]
    fn test_hunt_transition() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(6, Snake::new(Position::new(3, 8), Direction::Right, 3));

        let result = engine.tick(&mut state, TICK);

        assert!(result.info.entered_hunt);
        assert_eq!(state.phase, GamePhase::Hunt);
        assert_eq!(state.opponent.mode, AiMode::Flee);
        assert_eq!(state.message.as_deref(), Some(HUNT_MESSAGE));

        let result = engine.tick(&mut state, TICK * 2);
        assert!(!result.info.entered_hunt);
        assert_eq!(state.phase, GamePhase::Hunt);
    }

    #[test]
    fn test_no_hunt_below_double_length() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(5, Snake::new(Position::new(3, 8), Direction::Right, 3));

        engine.tick(&mut state, TICK);

        assert_eq!(state.phase, GamePhase::Survival);
        assert_eq!(state.opponent.mode, AiMode::Chase);
    }

    /// Red snake two cells right of the player, both closing in on (6, 5)
    fn head_on(player_len: usize, opponent_len: usize) -> GameState {
        let mut state = duel(
            player_len,
            Snake::new(Position::new(7, 5), Direction::Left, opponent_len),
        );
        state.ai_turn = true;
        state
    }

    #[test]
    fn test_heads_meet_in_hunt_wins() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = head_on(6, 3);
        state.phase = GamePhase::Hunt;

        let result = engine.tick(&mut state, TICK);

        assert!(result.terminated);
        assert_eq!(result.end_reason, Some(EndReason::OpponentEaten));
        assert_eq!(state.phase, GamePhase::Win);
        assert_eq!(
            state.message.as_deref(),
            Some("You attacked and ate the red snake!")
        );
    }

    #[test]
    fn test_heads_meet_in_survival_loses() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = head_on(6, 3);

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.end_reason, Some(EndReason::PlayerCaught));
        assert_eq!(state.phase, GamePhase::Lose);
        assert_eq!(state.message.as_deref(), Some("Red snake caught you!"));
    }

    #[test]
    fn test_heads_meet_in_hunt_while_short_loses() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = head_on(5, 3);
        state.phase = GamePhase::Hunt;

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.end_reason, Some(EndReason::PlayerCaught));
        assert_eq!(state.phase, GamePhase::Lose);
    }

    /// Body whose head also appears as its tail; facing right is blocked so
    /// the snake freezes with the overlap intact
    fn knotted(head: Position) -> Snake {
        Snake::from_segments(
            vec![
                head,
                head.moved_by(1, 0),
                head.moved_by(1, 1),
                head.moved_by(0, 1),
                head,
            ],
            Direction::Right,
        )
    }

    #[test]
    fn test_player_self_collision_loses() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.player = knotted(Position::new(5, 5));

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.end_reason, Some(EndReason::PlayerSelfCollision));
        assert_eq!(state.phase, GamePhase::Lose);
        assert_eq!(state.message.as_deref(), Some("You ran into yourself!"));
    }

    #[test]
    fn test_opponent_self_collision_wins() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, knotted(Position::new(1, 7)));
        state.ai_turn = true;

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.end_reason, Some(EndReason::OpponentSelfCollision));
        assert_eq!(state.phase, GamePhase::Win);
        assert_eq!(state.message.as_deref(), Some("Red snake ran into itself!"));
    }

    #[test]
    fn test_player_self_collision_checked_first() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, knotted(Position::new(1, 7)));
        state.player = knotted(Position::new(5, 2));
        state.ai_turn = true;

        let result = engine.tick(&mut state, TICK);

        assert_eq!(result.end_reason, Some(EndReason::PlayerSelfCollision));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.phase = GamePhase::Lose;
        let before = state.clone();

        let result = engine.tick(&mut state, TICK);

        assert!(result.terminated);
        assert_eq!(result.end_reason, None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_steer_rejects_reverse() {
        let engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());

        assert!(!engine.steer(&mut state, Direction::Left));
        assert_eq!(state.player.direction, Direction::Right);

        assert!(engine.steer(&mut state, Direction::Up));
        assert_eq!(state.player.direction, Direction::Up);
    }

    #[test]
    fn test_steer_ignored_when_not_running() {
        let engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.phase = GamePhase::Win;

        assert!(!engine.steer(&mut state, Direction::Up));
        assert_eq!(state.player.direction, Direction::Right);
    }

    #[test]
    fn test_power_up_spawns_after_interval() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());

        let result = engine.tick(&mut state, Duration::from_millis(59_999));
        assert!(result.info.power_up_spawned.is_none());
        assert!(state.power_up.is_none());

        let result = engine.tick(&mut state, Duration::from_millis(60_000));
        let power_up = result.info.power_up_spawned.unwrap();
        assert_eq!(state.power_up, Some(power_up));
        assert_eq!(power_up.kind, PowerUpKind::DoubleScore);
        assert!(!state.is_occupied(power_up.position));
        assert_eq!(state.last_power_up_spawn, Duration::from_millis(60_000));
    }

    #[test]
    fn test_second_power_up_waits_for_pickup() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        let parked = PowerUp {
            position: Position::new(0, 0),
            kind: PowerUpKind::DoubleScore,
        };
        state.power_up = Some(parked);

        let result = engine.tick(&mut state, Duration::from_secs(61));

        assert!(result.info.power_up_spawned.is_none());
        assert_eq!(state.power_up, Some(parked));
        assert_eq!(state.last_power_up_spawn, Duration::from_secs(61));
    }

    #[test]
    fn test_power_up_pickup_and_expiry() {
        let mut engine = engine(Difficulty::Hard);
        let mut state = duel(3, far_opponent());
        state.power_up = Some(PowerUp {
            position: Position::new(6, 5),
            kind: PowerUpKind::DoubleScore,
        });

        let picked_at = Duration::from_secs(5);
        let result = engine.tick(&mut state, picked_at);

        assert_eq!(result.info.power_up_collected, Some(PowerUpKind::DoubleScore));
        assert!(state.power_up.is_none());
        assert_eq!(
            state.active_effect,
            Some(ActiveEffect {
                kind: PowerUpKind::DoubleScore,
                expires_at: Duration::from_secs(20),
            })
        );
        assert!(state.effect_active(PowerUpKind::DoubleScore));

        engine.steer(&mut state, Direction::Down);
        let result = engine.tick(&mut state, Duration::from_secs(20));
        assert!(result.info.effect_expired);
        assert!(state.active_effect.is_none());
    }
}
