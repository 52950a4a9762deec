//! Guessing when nothing is certain.
//!
//! Every strategy ends in an `Open` move; the estimator never flags.
//!
//! - `LocalProbability`: each numbered tile spreads its remaining mines evenly
//!   over its unopened neighbours and a tile keeps the highest share it is
//!   given. Tiles next to no number (the unknown set) share whatever is
//!   expected to be left over.
//! - `Exact`: frontier tiles are split into independent clusters and every 0/1
//!   assignment of a cluster is checked against its constraints. Clusters
//!   larger than [`MAX_CLUSTER_SIZE`] keep the local estimate.
//! - `Random`: any unopened tile.

use std::collections::HashSet;

use log::{debug, trace};

use crate::config::GuessStrategy;
use crate::knowledge::KnowledgeBase;
use crate::rng::GameRng;
use crate::types::{BoardState, Move, NeighborCache, Tile};

/// Maximum cluster size for exhaustive enumeration.
pub const MAX_CLUSTER_SIZE: usize = 20;

/// Tolerance when comparing probabilities for ties.
const TIE_EPS: f64 = 1e-9;

/// Estimated mine probability per tile. `None` for opened and flagged tiles.
#[derive(Debug, Clone)]
pub struct ProbabilityMap {
    pub size: usize,
    pub probs: Vec<Option<f64>>,
}

impl ProbabilityMap {
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.probs[row * self.size + col]
    }

    /// All tiles sharing the lowest probability, skipping `excluded` ones.
    pub fn lowest<F>(&self, excluded: F) -> Vec<(usize, usize)>
    where
        F: Fn(usize, usize) -> bool,
    {
        let candidates: Vec<(usize, f64)> = self
            .probs
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
            .filter(|&(i, _)| !excluded(i / self.size, i % self.size))
            .collect();

        let min = candidates.iter().map(|&(_, p)| p).fold(f64::INFINITY, f64::min);
        candidates
            .into_iter()
            .filter(|&(_, p)| p - min <= TIE_EPS)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }
}

/// One numbered tile seen from the unopened tiles around it.
struct Constraint {
    remaining: i32,
    unopened: Vec<(usize, usize)>,
}

fn constraints(state: &BoardState, nc: &NeighborCache) -> Vec<Constraint> {
    let mut out = Vec::new();
    for row in 0..state.size {
        for col in 0..state.size {
            let label = match state.get(row, col) {
                Tile::Opened(k) if k > 0 => k as i32,
                _ => continue,
            };
            let mut flagged = 0i32;
            let mut unopened = Vec::new();
            for &(nr, ncol) in nc.get(row, col) {
                match state.get(nr, ncol) {
                    Tile::Unopened => unopened.push((nr, ncol)),
                    Tile::Flagged => flagged += 1,
                    Tile::Opened(_) => {}
                }
            }
            if !unopened.is_empty() {
                out.push(Constraint { remaining: label - flagged, unopened });
            }
        }
    }
    out
}

/// Fill the unknown set with the mines not accounted for by the frontier.
fn spread_over_unknown(
    state: &BoardState,
    mine_count: usize,
    frontier: &[Option<f64>],
) -> ProbabilityMap {
    let mut probs: Vec<Option<f64>> = vec![None; state.tile_count()];
    let mut unknown = Vec::new();
    let mut frontier_expected = 0.0f64;

    for (i, tile) in state.cells.iter().enumerate() {
        if !tile.is_unopened() {
            continue;
        }
        match frontier[i] {
            Some(p) => {
                probs[i] = Some(p);
                frontier_expected += p;
            }
            None => unknown.push(i),
        }
    }

    // With an empty unknown set there is nothing to correct.
    if !unknown.is_empty() {
        let left = mine_count as f64 - frontier_expected - state.flagged_count() as f64;
        let p = (left / unknown.len() as f64).clamp(0.0, 1.0);
        trace!("unknown set: {} tiles at {:.4}", unknown.len(), p);
        for i in unknown {
            probs[i] = Some(p);
        }
    }

    ProbabilityMap { size: state.size, probs }
}

/// Per-tile local frontier estimate: `None` for tiles next to no number.
fn local_frontier(state: &BoardState, cons: &[Constraint]) -> Vec<Option<f64>> {
    let mut frontier: Vec<Option<f64>> = vec![None; state.tile_count()];
    for c in cons {
        let lp = c.remaining.max(0) as f64 / c.unopened.len() as f64;
        for &(r, col) in &c.unopened {
            let slot = &mut frontier[state.index(r, col)];
            // Keep the highest share any neighbour hands out.
            *slot = Some(slot.map_or(lp, |p| p.max(lp)));
        }
    }
    frontier
}

/// Local-probability heuristic over the whole board.
pub fn local_probabilities(state: &BoardState, mine_count: usize) -> ProbabilityMap {
    let nc = NeighborCache::new(state.size);
    let cons = constraints(state, &nc);
    let frontier = local_frontier(state, &cons);
    spread_over_unknown(state, mine_count, &frontier)
}

/// Group frontier tiles into clusters linked by shared constraints.
fn clusters(state: &BoardState, cons: &[Constraint]) -> Vec<(Vec<(usize, usize)>, Vec<usize>)> {
    // tile -> constraints touching it
    let mut touching: Vec<Vec<usize>> = vec![Vec::new(); state.tile_count()];
    for (ci, c) in cons.iter().enumerate() {
        for &(r, col) in &c.unopened {
            touching[state.index(r, col)].push(ci);
        }
    }

    let mut seen_constraint = vec![false; cons.len()];
    let mut seen_tile: HashSet<(usize, usize)> = HashSet::new();
    let mut out = Vec::new();

    for start in 0..cons.len() {
        if seen_constraint[start] {
            continue;
        }
        let mut tiles = Vec::new();
        let mut members = Vec::new();
        let mut queue = vec![start];
        seen_constraint[start] = true;

        while let Some(ci) = queue.pop() {
            members.push(ci);
            for &tile in &cons[ci].unopened {
                if !seen_tile.insert(tile) {
                    continue;
                }
                tiles.push(tile);
                for &other in &touching[state.index(tile.0, tile.1)] {
                    if !seen_constraint[other] {
                        seen_constraint[other] = true;
                        queue.push(other);
                    }
                }
            }
        }
        out.push((tiles, members));
    }
    out
}

/// Mine count per cluster tile over every consistent assignment, plus the
/// number of consistent assignments. `None` when the cluster is too large.
fn enumerate_cluster(
    tiles: &[(usize, usize)],
    members: &[usize],
    cons: &[Constraint],
) -> Option<(Vec<u64>, u64)> {
    if tiles.len() > MAX_CLUSTER_SIZE {
        return None;
    }

    let local: Vec<(i32, Vec<usize>)> = members
        .iter()
        .map(|&ci| {
            let idx = cons[ci]
                .unopened
                .iter()
                .filter_map(|t| tiles.iter().position(|x| x == t))
                .collect();
            (cons[ci].remaining, idx)
        })
        .collect();

    let mut mine_hits = vec![0u64; tiles.len()];
    let mut valid = 0u64;

    for mask in 0u32..(1u32 << tiles.len()) {
        let ok = local.iter().all(|(remaining, idx)| {
            idx.iter().filter(|&&i| (mask >> i) & 1 == 1).count() as i32 == *remaining
        });
        if ok {
            valid += 1;
            for (i, hits) in mine_hits.iter_mut().enumerate() {
                if (mask >> i) & 1 == 1 {
                    *hits += 1;
                }
            }
        }
    }

    Some((mine_hits, valid))
}

/// Exact per-cluster marginals where enumeration is tractable, local
/// estimates elsewhere.
pub fn exact_probabilities(state: &BoardState, mine_count: usize) -> ProbabilityMap {
    let nc = NeighborCache::new(state.size);
    let cons = constraints(state, &nc);
    let mut frontier = local_frontier(state, &cons);

    for (tiles, members) in clusters(state, &cons) {
        match enumerate_cluster(&tiles, &members, &cons) {
            Some((hits, valid)) if valid > 0 => {
                for (&(r, c), &h) in tiles.iter().zip(&hits) {
                    frontier[state.index(r, c)] = Some(h as f64 / valid as f64);
                }
            }
            Some(_) => debug!("cluster of {} tiles has no consistent assignment", tiles.len()),
            None => debug!("cluster of {} tiles too large to enumerate", tiles.len()),
        }
    }

    spread_over_unknown(state, mine_count, &frontier)
}

/// Frontier tiles that are safe (first) or mines (second) in every consistent
/// assignment of their cluster.
pub fn exact_certainties(state: &BoardState) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let nc = NeighborCache::new(state.size);
    let cons = constraints(state, &nc);
    let mut safe = Vec::new();
    let mut mines = Vec::new();

    for (tiles, members) in clusters(state, &cons) {
        if let Some((hits, valid)) = enumerate_cluster(&tiles, &members, &cons) {
            if valid == 0 {
                continue;
            }
            for (&tile, &h) in tiles.iter().zip(&hits) {
                if h == 0 {
                    safe.push(tile);
                } else if h == valid {
                    mines.push(tile);
                }
            }
        }
    }

    safe.sort_unstable();
    mines.sort_unstable();
    (safe, mines)
}

/// Probability map for the given strategy. `Random` treats every unopened
/// tile as equally likely.
pub fn estimate(state: &BoardState, mine_count: usize, strategy: GuessStrategy) -> ProbabilityMap {
    match strategy {
        GuessStrategy::LocalProbability => local_probabilities(state, mine_count),
        GuessStrategy::Exact => exact_probabilities(state, mine_count),
        GuessStrategy::Random => {
            let unopened = state.cells.iter().filter(|t| t.is_unopened()).count().max(1);
            let remaining = mine_count.saturating_sub(state.flagged_count());
            let p = (remaining as f64 / unopened as f64).min(1.0);
            let probs = state
                .cells
                .iter()
                .map(|t| if t.is_unopened() { Some(p) } else { None })
                .collect();
            ProbabilityMap { size: state.size, probs }
        }
    }
}

/// Pick the tile to open. Tiles already proven to be mines are never picked.
/// `None` if no unopened tile is left.
pub fn guess(
    state: &BoardState,
    mine_count: usize,
    strategy: GuessStrategy,
    kb: &KnowledgeBase,
    rng: &mut GameRng,
) -> Option<Move> {
    let map = estimate(state, mine_count, strategy);
    let candidates = map.lowest(|r, c| kb.is_confirmed_mine(r, c));
    let (row, col) = rng.choose(&candidates)?;
    debug!(
        "guess ({}, {}) via {:?}, p = {:.4}, {} tied",
        row,
        col,
        strategy,
        map.get(row, col).unwrap_or(f64::NAN),
        candidates.len()
    );
    Some(Move::open(row, col))
}
