//! Solver orchestrator: one move per call.
//!
//! Tiers run in a fixed order: pending certain moves first, then the
//! configured certain-move solver, then a guess. The only state carried
//! between calls is the knowledge base, which lives for one game.

use log::{debug, trace};

use crate::config::{CertainTier, SolverConfig};
use crate::error::SolverError;
use crate::knowledge::KnowledgeBase;
use crate::probability;
use crate::rng::GameRng;
use crate::types::{BoardState, Move, Operation, Tile};
use crate::{gaussian, single_point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    FreshGame,
    DrainQueue,
    RunSolverTier(CertainTier),
    Guess,
}

pub struct Solver {
    config: SolverConfig,
    kb: KnowledgeBase,
    rng: GameRng,
}

impl Solver {
    pub fn new(config: SolverConfig, rng: GameRng) -> Self {
        Self {
            config,
            kb: KnowledgeBase::new(),
            rng,
        }
    }

    pub fn with_seed(config: SolverConfig, seed: u64) -> Self {
        Self::new(config, GameRng::from_seed(seed))
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Decide the next move for `state`.
    ///
    /// `first_move` starts a new game and wipes the knowledge base.
    /// Fails only when no unopened tile is left to choose.
    pub fn next_move(
        &mut self,
        state: &BoardState,
        first_move: bool,
        mine_count: usize,
    ) -> Result<Move, SolverError> {
        let mut phase = if first_move { Phase::FreshGame } else { Phase::DrainQueue };
        let mut tier_ran = false;

        loop {
            phase = match phase {
                Phase::FreshGame => {
                    self.kb.reset();
                    Phase::DrainQueue
                }
                Phase::DrainQueue => {
                    if let Some(mv) = self.pop_applicable(state) {
                        trace!("certain move {:?}", mv);
                        return Ok(mv);
                    }
                    if tier_ran {
                        Phase::Guess
                    } else {
                        Phase::RunSolverTier(self.config.tier)
                    }
                }
                Phase::RunSolverTier(tier) => {
                    tier_ran = true;
                    let queued = match tier {
                        CertainTier::SinglePoint => single_point::solve(state, &mut self.kb),
                        CertainTier::Csp => gaussian::solve(state, &mut self.kb),
                    };
                    if queued > 0 {
                        Phase::DrainQueue
                    } else {
                        Phase::Guess
                    }
                }
                Phase::Guess => {
                    debug!("no certain move, guessing with {:?}", self.config.guess);
                    return probability::guess(state, mine_count, self.config.guess, &self.kb, &mut self.rng)
                        .ok_or(SolverError::NoUnopenedTiles);
                }
            };
        }
    }

    /// Oldest queued move that still changes the board. A cascade may already
    /// have opened a tile that was queued as safe.
    fn pop_applicable(&mut self, state: &BoardState) -> Option<Move> {
        while let Some(mv) = self.kb.pop_queued() {
            match (mv.op, state.get(mv.row, mv.col)) {
                (Operation::Open, Tile::Unopened) | (Operation::Flag, Tile::Unopened) => return Some(mv),
                _ => trace!("dropping stale move {:?}", mv),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{self, GameStatus};
    use crate::config::GuessStrategy;
    use crate::single_point::tests::board as parse;
    use crate::types::MineField;

    #[test]
    fn test_first_move_opens() {
        let state = BoardState::new(9);
        let mut solver = Solver::with_seed(SolverConfig::default(), 1);
        let mv = solver.next_move(&state, true, 10).unwrap();
        assert_eq!(mv.op, Operation::Open);
        assert!(mv.row < 9 && mv.col < 9);
    }

    #[test]
    fn test_drains_queue_in_order() {
        let state = parse(&[
            "- 2 -",
            "1 2 1",
            "0 0 0",
        ]);
        for tier in [CertainTier::SinglePoint, CertainTier::Csp] {
            let mut solver = Solver::with_seed(SolverConfig::new(tier, GuessStrategy::LocalProbability), 2);
            let first = solver.next_move(&state, false, 2).unwrap();
            assert_eq!(first.op, Operation::Flag);
            assert_eq!(solver.knowledge().pending_len(), 1);
            let second = solver.next_move(&state, false, 2).unwrap();
            assert_eq!(second.op, Operation::Flag);
            assert_ne!((first.row, first.col), (second.row, second.col));
        }
    }

    #[test]
    fn test_first_move_resets_knowledge() {
        let state = parse(&[
            "- 2 -",
            "1 2 1",
            "0 0 0",
        ]);
        let mut solver = Solver::with_seed(SolverConfig::default(), 3);
        solver.next_move(&state, false, 2).unwrap();
        assert!(!solver.knowledge().confirmed_mines().is_empty());

        let fresh = BoardState::new(3);
        solver.next_move(&fresh, true, 2).unwrap();
        assert!(solver.knowledge().confirmed_mines().is_empty());
        assert_eq!(solver.knowledge().pending_len(), 0);
    }

    #[test]
    fn test_stale_moves_are_skipped() {
        let state = parse(&[
            "- - 0",
            "1 1 0",
            "0 0 0",
        ]);
        let mut solver = Solver::with_seed(SolverConfig::default(), 4);
        solver.kb.propose_safe(2, 2);
        solver.kb.propose_safe(0, 1);
        let mv = solver.next_move(&state, false, 1).unwrap();
        assert_eq!(mv, Move::open(0, 1));
    }

    #[test]
    fn test_no_tiles_left() {
        let state = parse(&["0 0", "0 0"]);
        let mut solver = Solver::with_seed(SolverConfig::default(), 5);
        assert_eq!(solver.next_move(&state, false, 0), Err(SolverError::NoUnopenedTiles));
    }

    fn play(size: usize, mines: &[(usize, usize)], first: (usize, usize), config: SolverConfig) -> GameStatus {
        let mut field = MineField::new(size);
        for &(r, c) in mines {
            field.set(r, c, true);
        }
        let mut state = BoardState::new(size);
        board::open(&mut state, &field, first.0, first.1);
        let mut solver = Solver::with_seed(config, 6);
        let mut first_move = true;
        for _ in 0..(4 * size * size) {
            let status = board::game_status(&field, &state, mines.len());
            if status != GameStatus::Playing {
                return status;
            }
            let mv = solver.next_move(&state, first_move, mines.len()).unwrap();
            first_move = false;
            match mv.op {
                Operation::Open => {
                    board::open(&mut state, &field, mv.row, mv.col);
                }
                Operation::Flag => board::flag(&mut state, mv.row, mv.col),
            }
        }
        board::game_status(&field, &state, mines.len())
    }

    #[test]
    fn test_solves_logic_only_board() {
        // Opening (4,4) leaves a position every tier finishes without guessing.
        let mines = [(0, 0), (0, 2)];
        for tier in [CertainTier::SinglePoint, CertainTier::Csp] {
            let config = SolverConfig::new(tier, GuessStrategy::LocalProbability);
            assert_eq!(play(5, &mines, (4, 4), config), GameStatus::Won);
        }
    }

    #[test]
    fn test_csp_solves_one_two_one() {
        // After the cascade the top row reads 1-2-1 under three hidden tiles;
        // single-point alone is stuck but the CSP tier is not.
        let mines = [(0, 0), (0, 2)];
        let config = SolverConfig::new(CertainTier::Csp, GuessStrategy::LocalProbability);
        assert_eq!(play(3, &mines, (2, 2), config), GameStatus::Won);
    }
}
