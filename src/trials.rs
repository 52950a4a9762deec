//! Batch runner: many solver-played games and their aggregate outcome.

use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::board::{self, GameStatus};
use crate::config::{GameConfig, SolverConfig};
use crate::error::Result;
use crate::rng::GameRng;
use crate::solver::Solver;
use crate::types::{BoardState, MineField, Operation};

/// Result of one game played by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
    pub moves: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TrialStats {
    pub trials: usize,
    pub wins: usize,
    /// Moves taken per game, in play order.
    pub move_counts: Vec<usize>,
    pub elapsed: Duration,
}

impl TrialStats {
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.wins as f64 / self.trials as f64
    }

    pub fn average_moves(&self) -> f64 {
        if self.move_counts.is_empty() {
            return 0.0;
        }
        self.move_counts.iter().sum::<usize>() as f64 / self.move_counts.len() as f64
    }
}

/// Play one game from an empty board until it is won or lost.
///
/// The mine field is generated around the first opened tile. A game still
/// running after `4 * size²` moves is counted as lost.
pub fn play_game(config: &GameConfig, solver_config: SolverConfig, rng: &mut GameRng) -> Result<GameOutcome> {
    config.validate()?;

    let mut state = BoardState::new(config.size);
    let mut field: Option<MineField> = None;
    let mut solver = Solver::new(solver_config, rng.fork());
    let max_moves = 4 * config.tile_count();

    for moves in 1..=max_moves {
        let mv = solver.next_move(&state, moves == 1, config.mine_count)?;
        trace!("move {}: {:?}", moves, mv);

        match mv.op {
            Operation::Open => {
                if field.is_none() {
                    field = Some(board::generate_mine_field(
                        config.size,
                        config.mine_count,
                        mv.row,
                        mv.col,
                        rng,
                    )?);
                }
                if let Some(f) = &field {
                    board::open(&mut state, f, mv.row, mv.col);
                }
            }
            Operation::Flag => board::flag(&mut state, mv.row, mv.col),
        }

        let status = match &field {
            Some(f) => board::game_status(f, &state, config.mine_count),
            None => GameStatus::Playing,
        };
        if status != GameStatus::Playing {
            let won = status == GameStatus::Won;
            debug!("game {} after {} moves", if won { "won" } else { "lost" }, moves);
            return Ok(GameOutcome { won, moves });
        }
    }

    debug!("game abandoned after {} moves", max_moves);
    Ok(GameOutcome { won: false, moves: max_moves })
}

/// Play `iterations` games back to back with one shared generator.
pub fn run_trials(
    config: &GameConfig,
    solver_config: SolverConfig,
    iterations: usize,
    seed: Option<u64>,
) -> Result<TrialStats> {
    let mut rng = GameRng::from_optional_seed(seed);
    let mut stats = TrialStats::default();
    let start = Instant::now();

    for _ in 0..iterations {
        let outcome = play_game(config, solver_config, &mut rng)?;
        stats.trials += 1;
        if outcome.won {
            stats.wins += 1;
        }
        stats.move_counts.push(outcome.moves);
    }
    stats.elapsed = start.elapsed();

    info!(
        "{}x{} with {} mines, {:?}/{:?}: won {}/{} ({:.2}%), {:.1} moves avg, {:?}",
        config.size,
        config.size,
        config.mine_count,
        solver_config.tier,
        solver_config.guess,
        stats.wins,
        stats.trials,
        stats.success_rate() * 100.0,
        stats.average_moves(),
        stats.elapsed
    );
    Ok(stats)
}
