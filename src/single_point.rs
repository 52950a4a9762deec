//! Single-point solver: every numbered tile judged on its own.

use log::debug;

use crate::knowledge::KnowledgeBase;
use crate::types::{BoardState, NeighborCache, Tile};

/// Propose certain moves from each opened tile's own count.
///
/// If the flags around a tile already account for its label, the rest of its
/// unopened neighbours are safe. If unopened plus flagged neighbours equal the
/// label, every unopened neighbour is a mine. Returns the number of moves queued.
pub fn solve(state: &BoardState, kb: &mut KnowledgeBase) -> usize {
    let cache = NeighborCache::new(state.size);
    let mut queued = 0;

    for row in 0..state.size {
        for col in 0..state.size {
            let label = match state.get(row, col) {
                Tile::Opened(k) if k > 0 => k as usize,
                _ => continue,
            };

            let mut flagged_count = 0usize;
            let mut unopened: Vec<(usize, usize)> = Vec::new();
            for &(nr, nc) in cache.get(row, col) {
                match state.get(nr, nc) {
                    Tile::Unopened => unopened.push((nr, nc)),
                    Tile::Flagged => flagged_count += 1,
                    Tile::Opened(_) => {}
                }
            }

            if flagged_count == label {
                for &(r, c) in &unopened {
                    if kb.propose_safe(r, c) {
                        queued += 1;
                    }
                }
            } else if unopened.len() + flagged_count == label {
                for &(r, c) in &unopened {
                    if kb.propose_mine(r, c) {
                        queued += 1;
                    }
                }
            }
        }
    }

    debug!("single-point solver queued {} moves", queued);
    queued
}
