use std::time::{Duration, Instant};

use crate::game::{EndReason, GamePhase, GameState};

/// Running record of the duels played since launch, plus the clock of the
/// current one
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Unset between episodes so the clock holds still on the end screen
    episode_start: Option<Instant>,
    shown_time: Duration,
    pub high_score: u32,
    /// Longest the player's snake has been in any episode
    pub longest_snake: usize,
    pub wins: u32,
    pub losses: u32,
    pub last_end: Option<EndReason>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_episode(&mut self) {
        self.episode_start = Some(Instant::now());
        self.shown_time = Duration::ZERO;
    }

    /// Time since the current episode began; zero when none is running
    pub fn episode_time(&self) -> Duration {
        self.episode_start
            .map_or(Duration::ZERO, |start| start.elapsed())
    }

    /// Sample the episode clock for display
    pub fn refresh_clock(&mut self) {
        if self.episode_start.is_some() {
            self.shown_time = self.episode_time();
        }
    }

    pub fn record_end(&mut self, state: &GameState, reason: EndReason) {
        self.refresh_clock();
        self.episode_start = None;

        match reason.phase() {
            GamePhase::Win => self.wins += 1,
            _ => self.losses += 1,
        }
        self.high_score = self.high_score.max(state.score);
        self.longest_snake = self.longest_snake.max(state.player.len());
        self.last_end = Some(reason);
    }

    /// Drop the current episode without counting it
    pub fn abandon_episode(&mut self) {
        self.episode_start = None;
        self.shown_time = Duration::ZERO;
    }

    pub fn episode_running(&self) -> bool {
        self.episode_start.is_some()
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn clock_label(&self) -> String {
        format_clock(self.shown_time)
    }
}

/// `mm:ss`, minutes uncapped
pub fn format_clock(time: Duration) -> String {
    let secs = time.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
