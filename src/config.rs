//! Game, solver and environment configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GameError};

/// Board dimensions and mine count for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: usize,
    pub mine_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { size: 9, mine_count: 10 }
    }
}

impl GameConfig {
    pub fn new(size: usize, mine_count: usize) -> Result<Self, ConfigError> {
        let config = Self { size, mine_count };
        config.validate()?;
        Ok(config)
    }

    /// The first click must always have a safe tile to land on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(GameError::ZeroSizeBoard.into());
        }
        let cells = self.size * self.size;
        if self.mine_count >= cells {
            return Err(GameError::TooManyMines { requested: self.mine_count, cells }.into());
        }
        Ok(())
    }

    pub fn tile_count(&self) -> usize {
        self.size * self.size
    }
}

/// Which solver looks for certain moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CertainTier {
    /// Each numbered tile in isolation.
    SinglePoint,
    /// Row-reduced linear system over the whole board.
    #[default]
    Csp,
}

/// How to pick a tile when no certain move exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuessStrategy {
    Random,
    #[default]
    LocalProbability,
    /// Exhaustive enumeration over small frontier clusters.
    Exact,
}

impl TryFrom<u8> for CertainTier {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CertainTier::SinglePoint),
            1 => Ok(CertainTier::Csp),
            _ => Err(ConfigError::UnknownCode { kind: "certain move model", code }),
        }
    }
}

impl TryFrom<u8> for GuessStrategy {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(GuessStrategy::Random),
            1 => Ok(GuessStrategy::LocalProbability),
            2 => Ok(GuessStrategy::Exact),
            _ => Err(ConfigError::UnknownCode { kind: "guess strategy", code }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tier: CertainTier,
    pub guess: GuessStrategy,
}

impl SolverConfig {
    pub fn new(tier: CertainTier, guess: GuessStrategy) -> Self {
        Self { tier, guess }
    }
}

/// Scalar rewards handed out by the environment for each outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    pub win: f64,
    pub lose: f64,
    pub progress: f64,
    pub guess: f64,
    pub no_progress: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            win: 1.0,
            lose: -0.5,
            progress: 0.9,
            guess: -0.1,
            no_progress: -1000.0,
        }
    }
}
