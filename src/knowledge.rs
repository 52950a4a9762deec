//! Per-game memory of proven facts and the moves they produced.
//!
//! Tiles stay in the confirmed sets for the whole game, even after the game
//! loop has opened or flagged them: the sets gate the queue, they do not track
//! completion.

use std::collections::{HashSet, VecDeque};

use log::{trace, warn};

use crate::types::Move;

#[derive(Debug, Default, Clone)]
pub struct KnowledgeBase {
    confirmed_mines: HashSet<(usize, usize)>,
    confirmed_safe: HashSet<(usize, usize)>,
    pending: VecDeque<Move>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything. Called on the first move of every game.
    pub fn reset(&mut self) {
        self.confirmed_mines.clear();
        self.confirmed_safe.clear();
        self.pending.clear();
    }

    /// Queue a flag for a proven mine. Returns `true` if a move was queued.
    pub fn propose_mine(&mut self, row: usize, col: usize) -> bool {
        if self.confirmed_mines.contains(&(row, col)) {
            return false;
        }
        if self.confirmed_safe.contains(&(row, col)) {
            warn!("refusing mine proposal for ({}, {}): already proven safe", row, col);
            return false;
        }
        trace!("deduced mine at ({}, {})", row, col);
        self.confirmed_mines.insert((row, col));
        self.pending.push_back(Move::flag(row, col));
        true
    }

    /// Queue an open for a proven safe tile. Returns `true` if a move was queued.
    pub fn propose_safe(&mut self, row: usize, col: usize) -> bool {
        if self.confirmed_safe.contains(&(row, col)) {
            return false;
        }
        if self.confirmed_mines.contains(&(row, col)) {
            warn!("refusing safe proposal for ({}, {}): already proven a mine", row, col);
            return false;
        }
        trace!("deduced safe tile at ({}, {})", row, col);
        self.confirmed_safe.insert((row, col));
        self.pending.push_back(Move::open(row, col));
        true
    }

    /// Oldest pending move.
    pub fn pop_queued(&mut self) -> Option<Move> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_confirmed_mine(&self, row: usize, col: usize) -> bool {
        self.confirmed_mines.contains(&(row, col))
    }

    pub fn is_confirmed_safe(&self, row: usize, col: usize) -> bool {
        self.confirmed_safe.contains(&(row, col))
    }

    pub fn confirmed_mines(&self) -> &HashSet<(usize, usize)> {
        &self.confirmed_mines
    }

    pub fn confirmed_safe(&self) -> &HashSet<(usize, usize)> {
        &self.confirmed_safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;

    #[test]
    fn test_proposals_are_idempotent() {
        let mut kb = KnowledgeBase::new();
        assert!(kb.propose_mine(1, 2));
        assert!(!kb.propose_mine(1, 2));
        assert!(kb.propose_safe(0, 0));
        assert!(!kb.propose_safe(0, 0));
        assert_eq!(kb.pending_len(), 2);
    }

    #[test]
    fn test_fifo_order() {
        let mut kb = KnowledgeBase::new();
        kb.propose_safe(0, 1);
        kb.propose_mine(2, 2);
        kb.propose_safe(1, 0);
        assert_eq!(kb.pop_queued(), Some(Move::open(0, 1)));
        assert_eq!(kb.pop_queued(), Some(Move { op: Operation::Flag, row: 2, col: 2 }));
        assert_eq!(kb.pop_queued(), Some(Move::open(1, 0)));
        assert_eq!(kb.pop_queued(), None);
    }

    #[test]
    fn test_confirmed_sets_are_disjoint() {
        let mut kb = KnowledgeBase::new();
        kb.propose_mine(3, 3);
        assert!(!kb.propose_safe(3, 3));
        kb.propose_safe(4, 4);
        assert!(!kb.propose_mine(4, 4));
        assert!(kb.is_confirmed_mine(3, 3) && !kb.is_confirmed_safe(3, 3));
        assert!(kb.is_confirmed_safe(4, 4) && !kb.is_confirmed_mine(4, 4));
        assert_eq!(kb.pending_len(), 2);
    }

    #[test]
    fn test_popping_keeps_confirmation() {
        let mut kb = KnowledgeBase::new();
        kb.propose_safe(0, 0);
        kb.pop_queued();
        assert!(!kb.propose_safe(0, 0));
        assert_eq!(kb.pending_len(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut kb = KnowledgeBase::new();
        kb.propose_safe(0, 0);
        kb.propose_mine(0, 1);
        kb.reset();
        assert_eq!(kb.pending_len(), 0);
        assert!(kb.confirmed_mines().is_empty());
        assert!(kb.confirmed_safe().is_empty());
        assert!(kb.propose_safe(0, 0));
    }
}
