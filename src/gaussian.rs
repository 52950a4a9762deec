//! CSP solver: the whole board as a linear system, row reduced.
//!
//! Each opened tile with a positive label contributes one equation
//! `Σ x_j = label − flagged neighbours` over its unopened neighbours
//! (x_j ∈ {0, 1}, 1 = mine). Conceptually the matrix is (N²)×(N²+1), one row
//! and one column per tile; rows of unopened or zero tiles are all zero and
//! columns of tiles that appear in no equation are all zero, so neither is
//! materialised.
//!
//! Scaling limit: reduction is O(m²·v) for m equations over v unknowns, which
//! is cubic in the tile count in the worst case. Boards around 30×30 reduce
//! in well under a second; much larger boards should use the single-point tier.

use log::debug;

use crate::knowledge::KnowledgeBase;
use crate::types::{BoardState, NeighborCache, Tile};

/// Tolerance for every zero / equality test on reduced values.
const EPS: f64 = 1e-6;

/// The constraint system for one board state. Built fresh on every call.
pub struct LinearSystem {
    /// Board side length the system was built from.
    pub size: usize,
    /// Tile index (`row * size + col`) of each unknown column.
    pub columns: Vec<usize>,
    /// Tile index of the opened tile each equation row came from.
    pub row_tiles: Vec<usize>,
    /// Augmented rows: `columns.len()` coefficients followed by the bound.
    pub rows: Vec<Vec<f64>>,
}

impl LinearSystem {
    pub fn from_board(state: &BoardState) -> Self {
        let size = state.size;
        let nc = NeighborCache::new(size);

        // 1. Build variable index map: tile -> column index
        let mut var_index_map: Vec<Option<usize>> = vec![None; state.tile_count()];
        let mut columns = Vec::new();
        let mut equations: Vec<(usize, Vec<usize>, f64)> = Vec::new();

        for row in 0..size {
            for col in 0..size {
                let label = match state.get(row, col) {
                    Tile::Opened(k) if k > 0 => k as i32,
                    _ => continue,
                };

                let mut vars = Vec::new();
                let mut flagged_count = 0i32;
                for &(nr, ncol) in nc.get(row, col) {
                    match state.get(nr, ncol) {
                        Tile::Flagged => flagged_count += 1,
                        Tile::Unopened => {
                            let tile = state.index(nr, ncol);
                            let var = *var_index_map[tile].get_or_insert_with(|| {
                                columns.push(tile);
                                columns.len() - 1
                            });
                            vars.push(var);
                        }
                        Tile::Opened(_) => {}
                    }
                }

                // Equations without unknowns are inert.
                if !vars.is_empty() {
                    equations.push((state.index(row, col), vars, (label - flagged_count) as f64));
                }
            }
        }

        // 2. Construct the augmented matrix
        let n = columns.len();
        let mut row_tiles = Vec::with_capacity(equations.len());
        let mut rows = Vec::with_capacity(equations.len());
        for (tile, vars, bound) in equations {
            let mut r = vec![0.0f64; n + 1];
            for v in vars {
                r[v] = 1.0;
            }
            r[n] = bound;
            row_tiles.push(tile);
            rows.push(r);
        }

        Self { size, columns, row_tiles, rows }
    }

    pub fn num_vars(&self) -> usize {
        self.columns.len()
    }

    /// Expand into the full (N²)×(N²+1) matrix, one row and column per tile.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let tiles = self.size * self.size;
        let n = self.num_vars();
        let mut dense = vec![vec![0.0f64; tiles + 1]; tiles];
        for (r, &tile) in self.row_tiles.iter().enumerate() {
            for (j, &col_tile) in self.columns.iter().enumerate() {
                dense[tile][col_tile] = self.rows[r][j];
            }
            dense[tile][tiles] = self.rows[r][n];
        }
        dense
    }

    /// Reduced row echelon form of the equations.
    pub fn reduced(&self) -> Vec<Vec<f64>> {
        let mut matrix = self.rows.clone();
        compute_rref(&mut matrix, self.num_vars());
        matrix
    }
}

/// Tiles proven safe or mined by one pass of the CSP solver.
#[derive(Debug, Default)]
pub struct Deductions {
    pub safe: Vec<(usize, usize)>,
    pub mines: Vec<(usize, usize)>,
}

/// Compute reduced row echelon form in place, with partial pivoting.
/// `n` is the number of coefficient columns; column `n` is the bound.
fn compute_rref(matrix: &mut [Vec<f64>], n: usize) {
    let m = matrix.len();
    let mut pivot_row = 0usize;

    for lead in 0..n {
        if pivot_row >= m {
            break;
        }

        // Largest magnitude in this column at or below the pivot row
        let best = (pivot_row..m)
            .max_by(|&a, &b| matrix[a][lead].abs().total_cmp(&matrix[b][lead].abs()));
        let i = match best {
            Some(i) if matrix[i][lead].abs() > EPS => i,
            _ => continue,
        };
        matrix.swap(i, pivot_row);

        // Normalize pivot row
        let inv = 1.0 / matrix[pivot_row][lead];
        for v in matrix[pivot_row].iter_mut() {
            *v *= inv;
        }
        matrix[pivot_row][lead] = 1.0;

        // Eliminate all other rows
        let pivot = matrix[pivot_row].clone();
        for (k, row) in matrix.iter_mut().enumerate() {
            if k == pivot_row {
                continue;
            }
            let factor = row[lead];
            if factor.abs() > EPS {
                for (v, p) in row.iter_mut().zip(&pivot) {
                    *v -= factor * p;
                }
                row[lead] = 0.0;
            }
        }

        pivot_row += 1;
    }

    // Flush round-off so later comparisons see clean zeros.
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            if v.abs() < EPS {
                *v = 0.0;
            }
        }
    }
}

/// Read forced assignments off rows of an augmented system.
///
/// For a row `Σ a_j x_j = b` with x_j ∈ {0, 1}, the left side ranges over
/// [Σ negative a_j, Σ positive a_j]. Hitting the top forces every positive
/// variable to 1 and every negative one to 0; hitting the bottom the reverse.
fn analyze_rows(rows: &[Vec<f64>], system: &LinearSystem, out: &mut Deductions) {
    let n = system.num_vars();
    let size = system.size;
    let coords = |j: usize| (system.columns[j] / size, system.columns[j] % size);

    for row in rows {
        let target = row[n];
        let mut min_val = 0.0f64;
        let mut max_val = 0.0f64;
        let mut vars_in_row: Vec<usize> = Vec::new();

        for (j, &coeff) in row[..n].iter().enumerate() {
            if coeff.abs() > EPS {
                if coeff > 0.0 {
                    max_val += coeff;
                } else {
                    min_val += coeff;
                }
                vars_in_row.push(j);
            }
        }

        if vars_in_row.is_empty() {
            continue;
        }

        if (target - max_val).abs() < EPS {
            // Positive coeffs are MINES, negative are SAFE
            for &j in &vars_in_row {
                if row[j] > 0.0 {
                    out.mines.push(coords(j));
                } else {
                    out.safe.push(coords(j));
                }
            }
        } else if (target - min_val).abs() < EPS {
            // Positive coeffs are SAFE, negative are MINES
            for &j in &vars_in_row {
                if row[j] > 0.0 {
                    out.safe.push(coords(j));
                } else {
                    out.mines.push(coords(j));
                }
            }
        }
    }
}

/// Forced tiles for a board state, without touching any knowledge base.
///
/// Both the raw equations and the reduced ones are read, so anything a single
/// tile proves on its own is found here too.
pub fn deduce(state: &BoardState) -> Deductions {
    let system = LinearSystem::from_board(state);
    let mut deductions = Deductions::default();
    if system.rows.is_empty() {
        return deductions;
    }

    analyze_rows(&system.rows, &system, &mut deductions);
    let reduced = system.reduced();
    analyze_rows(&reduced, &system, &mut deductions);

    deductions.safe.sort_unstable();
    deductions.safe.dedup();
    deductions.mines.sort_unstable();
    deductions.mines.dedup();
    deductions
}

/// Run the CSP solver and queue every forced move. Returns the number queued.
pub fn solve(state: &BoardState, kb: &mut KnowledgeBase) -> usize {
    let deductions = deduce(state);
    let mut queued = 0;

    for &(r, c) in &deductions.mines {
        if kb.propose_mine(r, c) {
            queued += 1;
        }
    }
    for &(r, c) in &deductions.safe {
        if kb.propose_safe(r, c) {
            queued += 1;
        }
    }

    debug!(
        "csp solver: {} safe, {} mines deduced, {} moves queued",
        deductions.safe.len(),
        deductions.mines.len(),
        queued
    );
    queued
}
