//! Minesweeper simulation and layered solver.
//!
//! The board engine owns the hidden mine field; solvers only ever see the
//! visible [`BoardState`]. Certain moves come from the single-point or CSP
//! tier through a per-game [`KnowledgeBase`], guesses from the probability
//! estimator. Grids are flat, row-major: `cells[row * size + col]`.

pub mod board;
pub mod config;
pub mod env;
pub mod error;
pub mod gaussian;
pub mod knowledge;
pub mod probability;
pub mod rng;
pub mod single_point;
pub mod solver;
pub mod trials;
pub mod types;

pub use board::GameStatus;
pub use config::{CertainTier, GameConfig, GuessStrategy, RewardTable, SolverConfig};
pub use env::MinesweeperEnv;
pub use error::{ConfigError, Error, GameError, Result, SolverError};
pub use knowledge::KnowledgeBase;
pub use solver::Solver;
pub use types::{BoardState, MineField, Move, Operation, Tile};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use std::fmt::Display;

    use wasm_bindgen::prelude::*;

    use crate::config::{CertainTier, GameConfig, GuessStrategy, SolverConfig};
    use crate::error::GameError;
    use crate::rng::GameRng;
    use crate::solver::Solver;
    use crate::types::{BoardState, MineField, Move, Operation};
    use crate::{board, probability};

    fn js_err(e: impl Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// One game driven from JavaScript: the solver proposes, the caller applies.
    #[wasm_bindgen]
    pub struct WasmGame {
        config: GameConfig,
        field: Option<MineField>,
        state: BoardState,
        solver: Solver,
        rng: GameRng,
        first_move: bool,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// `tier`: 0 single-point, 1 CSP. `guess`: 0 random, 1 local, 2 exact.
        #[wasm_bindgen(constructor)]
        pub fn new(size: usize, mines: usize, tier: u8, guess: u8, seed: Option<u64>) -> Result<WasmGame, JsValue> {
            let config = GameConfig::new(size, mines).map_err(js_err)?;
            let solver_config = SolverConfig::new(
                CertainTier::try_from(tier).map_err(js_err)?,
                GuessStrategy::try_from(guess).map_err(js_err)?,
            );
            let mut rng = GameRng::from_optional_seed(seed);
            let solver = Solver::new(solver_config, rng.fork());
            Ok(WasmGame {
                config,
                field: None,
                state: BoardState::new(size),
                solver,
                rng,
                first_move: true,
            })
        }

        /// The solver's next move as `{ op: "Open" | "Flag", row, col }`.
        #[wasm_bindgen(js_name = "nextMove")]
        pub fn next_move(&mut self) -> Result<JsValue, JsValue> {
            let mv = self
                .solver
                .next_move(&self.state, self.first_move, self.config.mine_count)
                .map_err(js_err)?;
            self.first_move = false;
            Ok(serde_wasm_bindgen::to_value(&mv)?)
        }

        /// Apply a move object and return the game status.
        /// The first open generates the mine field around it.
        pub fn apply(&mut self, mv: JsValue) -> Result<JsValue, JsValue> {
            let mv: Move = serde_wasm_bindgen::from_value(mv)?;
            if !self.state.in_bounds(mv.row, mv.col) {
                return Err(js_err(GameError::OutOfBounds { row: mv.row, col: mv.col, size: self.state.size }));
            }

            match mv.op {
                Operation::Open => {
                    if self.field.is_none() {
                        let field = board::generate_mine_field(
                            self.config.size,
                            self.config.mine_count,
                            mv.row,
                            mv.col,
                            &mut self.rng,
                        )
                        .map_err(js_err)?;
                        self.field = Some(field);
                    }
                    if let Some(field) = &self.field {
                        board::open(&mut self.state, field, mv.row, mv.col);
                    }
                }
                Operation::Flag => board::flag(&mut self.state, mv.row, mv.col),
            }

            Ok(serde_wasm_bindgen::to_value(&self.status())?)
        }

        #[wasm_bindgen(js_name = "isWon")]
        pub fn is_won(&self) -> bool {
            self.status() == board::GameStatus::Won
        }

        #[wasm_bindgen(js_name = "isLost")]
        pub fn is_lost(&self) -> bool {
            self.status() == board::GameStatus::Lost
        }

        /// Visible board codes: -1 unopened, -2 flagged, 0-8 opened.
        pub fn cells(&self) -> js_sys::Int8Array {
            let codes = self.state.to_codes();
            let arr = js_sys::Int8Array::new_with_length(codes.len() as u32);
            arr.copy_from(&codes);
            arr
        }

        pub fn render(&self) -> String {
            match &self.field {
                Some(field) => board::render(&self.state, field),
                None => self.state.to_string(),
            }
        }
    }

    impl WasmGame {
        fn status(&self) -> board::GameStatus {
            match &self.field {
                Some(field) => board::game_status(field, &self.state, self.config.mine_count),
                None => board::GameStatus::Playing,
            }
        }
    }

    /// Mine probability per tile for a visible board; NaN for tiles that are
    /// not unopened.
    #[wasm_bindgen(js_name = "probabilities")]
    pub fn wasm_probabilities(
        size: usize,
        mine_count: usize,
        cells: &[i8],
        guess: u8,
    ) -> Result<js_sys::Float64Array, JsValue> {
        let state = BoardState::from_codes(size, cells)
            .ok_or_else(|| JsValue::from_str("cells do not describe a board of that size"))?;
        let strategy = GuessStrategy::try_from(guess).map_err(js_err)?;
        let map = probability::estimate(&state, mine_count, strategy);

        let values: Vec<f64> = (0..size * size)
            .map(|i| map.get(i / size, i % size).unwrap_or(f64::NAN))
            .collect();
        let arr = js_sys::Float64Array::new_with_length(values.len() as u32);
        arr.copy_from(&values);
        Ok(arr)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM solver ready".to_string()
    }
}
