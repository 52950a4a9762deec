//! Reinforcement-learning style environment around the board engine.
//!
//! An action is a flat tile index `row * size + col`; the agent only opens.
//! Each step is classified against the board as it was before the move and
//! rewarded from a [`RewardTable`].

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::board::{self, GameStatus};
use crate::config::{GameConfig, RewardTable};
use crate::error::{ConfigError, GameError};
use crate::rng::GameRng;
use crate::types::{neighbors, BoardState, MineField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
    /// The tile was already open.
    NoProgress,
    /// No neighbour of the tile was open.
    Guess,
    Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Vec<i8>,
    pub reward: f64,
    pub done: bool,
    pub outcome: Outcome,
}

/// Running counters across every game played in this environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvStats {
    pub wins: usize,
    pub total: usize,
    /// Steps that were wins, guesses or progress.
    pub progress: usize,
    pub moves: usize,
}

pub struct MinesweeperEnv {
    config: GameConfig,
    rewards: RewardTable,
    rng: GameRng,
    field: MineField,
    state: BoardState,
    stats: EnvStats,
}

impl MinesweeperEnv {
    /// Build an environment and start its first game.
    pub fn new(config: GameConfig, rewards: RewardTable, seed: Option<u64>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut env = Self {
            config,
            rewards,
            rng: GameRng::from_optional_seed(seed),
            field: MineField::new(config.size),
            state: BoardState::new(config.size),
            stats: EnvStats::default(),
        };
        env.reset()?;
        Ok(env)
    }

    /// Start a new game: a random first tile is opened on a fresh field
    /// generated around it.
    pub fn reset(&mut self) -> Result<Vec<i8>, GameError> {
        let size = self.config.size;
        let first = self.rng.gen_range(size * size);
        let (row, col) = (first / size, first % size);

        self.field = board::generate_mine_field(size, self.config.mine_count, row, col, &mut self.rng)?;
        self.state = BoardState::new(size);
        board::open(&mut self.state, &self.field, row, col);
        debug!("reset with first tile ({}, {})", row, col);
        Ok(self.observation())
    }

    pub fn step(&mut self, action: usize) -> Result<Step, GameError> {
        let size = self.config.size;
        if action >= size * size {
            return Err(GameError::OutOfBounds { row: action / size, col: action % size, size });
        }
        let (row, col) = (action / size, action % size);

        let before = self.state.clone();
        board::open(&mut self.state, &self.field, row, col);

        let outcome = match board::game_status(&self.field, &self.state, self.config.mine_count) {
            GameStatus::Lost => Outcome::Lose,
            GameStatus::Won => Outcome::Win,
            GameStatus::Playing if before.get(row, col).is_opened() => Outcome::NoProgress,
            GameStatus::Playing if is_guess(&before, row, col) => Outcome::Guess,
            GameStatus::Playing => Outcome::Progress,
        };

        let reward = match outcome {
            Outcome::Win => self.rewards.win,
            Outcome::Lose => self.rewards.lose,
            Outcome::NoProgress => self.rewards.no_progress,
            Outcome::Guess => self.rewards.guess,
            Outcome::Progress => self.rewards.progress,
        };
        let done = matches!(outcome, Outcome::Win | Outcome::Lose);

        match outcome {
            Outcome::Win => {
                self.stats.wins += 1;
                self.stats.total += 1;
                self.stats.progress += 1;
            }
            Outcome::Lose => self.stats.total += 1,
            Outcome::Guess | Outcome::Progress => self.stats.progress += 1,
            Outcome::NoProgress => {}
        }
        self.stats.moves += 1;
        trace!("step ({}, {}) -> {:?}, reward {}", row, col, outcome, reward);

        Ok(Step { observation: self.observation(), reward, done, outcome })
    }

    pub fn observation(&self) -> Vec<i8> {
        self.state.to_codes()
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn stats(&self) -> EnvStats {
        self.stats
    }

    /// Board with mines shown, for debugging.
    pub fn render(&self) -> String {
        board::render(&self.state, &self.field)
    }
}

/// True if no neighbour of `(row, col)` was open.
fn is_guess(state: &BoardState, row: usize, col: usize) -> bool {
    !neighbors(state.size, row, col).any(|(r, c)| state.get(r, c).is_opened())
}
