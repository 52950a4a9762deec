//! Core data types for the Minesweeper engine.
//!
//! Boards are square. All grid types use flat `Vec` storage in row-major
//! layout: `cells[row * size + col]`.

use serde::{Deserialize, Serialize};

/// Relative offsets of the 8 surrounding tiles.
static OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Iterate the in-bounds neighbours of `(row, col)` on a `size`×`size` board.
pub fn neighbors(size: usize, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let r = row as i32 + dr;
        let c = col as i32 + dc;
        if r >= 0 && c >= 0 && (r as usize) < size && (c as usize) < size {
            Some((r as usize, c as usize))
        } else {
            None
        }
    })
}

/// A tile as seen by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Unopened,
    Flagged,
    /// Opened, with the number of mines among the 8 neighbours.
    Opened(u8),
}

impl Tile {
    pub const UNOPENED_CODE: i8 = -1;
    pub const FLAGGED_CODE: i8 = -2;

    #[inline(always)]
    pub fn is_unopened(self) -> bool {
        matches!(self, Tile::Unopened)
    }

    #[inline(always)]
    pub fn is_flagged(self) -> bool {
        matches!(self, Tile::Flagged)
    }

    #[inline(always)]
    pub fn is_opened(self) -> bool {
        matches!(self, Tile::Opened(_))
    }

    /// The label of an opened tile.
    #[inline(always)]
    pub fn label(self) -> Option<u8> {
        match self {
            Tile::Opened(k) => Some(k),
            _ => None,
        }
    }

    /// Compact numeric encoding: -1 unopened, -2 flagged, 0-8 opened.
    pub fn to_code(self) -> i8 {
        match self {
            Tile::Unopened => Self::UNOPENED_CODE,
            Tile::Flagged => Self::FLAGGED_CODE,
            Tile::Opened(k) => k as i8,
        }
    }

    pub fn from_code(code: i8) -> Option<Tile> {
        match code {
            Self::UNOPENED_CODE => Some(Tile::Unopened),
            Self::FLAGGED_CODE => Some(Tile::Flagged),
            0..=8 => Some(Tile::Opened(code as u8)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Open,
    Flag,
}

/// One instruction for the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub op: Operation,
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn open(row: usize, col: usize) -> Self {
        Self { op: Operation::Open, row, col }
    }

    pub fn flag(row: usize, col: usize) -> Self {
        Self { op: Operation::Flag, row, col }
    }
}

/// Hidden mine layout. Never handed to a solver.
#[derive(Debug, Clone)]
pub struct MineField {
    pub size: usize,
    pub cells: Vec<bool>,
}

impl MineField {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    #[inline(always)]
    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, val: bool) {
        self.cells[row * self.size + col] = val;
    }

    /// Count total mines on the board.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&m| m).count()
    }

    /// Number of mines among the neighbours of `(row, col)`.
    pub fn adjacent_mines(&self, row: usize, col: usize) -> u8 {
        neighbors(self.size, row, col)
            .filter(|&(r, c)| self.is_mine(r, c))
            .count() as u8
    }
}

/// Player-visible board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub size: usize,
    pub cells: Vec<Tile>,
}

impl BoardState {
    /// Create a new board with every tile unopened.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Tile::Unopened; size * size],
        }
    }

    /// Build a board from compact codes (see [`Tile::to_code`]).
    pub fn from_codes(size: usize, codes: &[i8]) -> Option<Self> {
        if codes.len() != size * size {
            return None;
        }
        let cells = codes
            .iter()
            .map(|&c| Tile::from_code(c))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { size, cells })
    }

    pub fn to_codes(&self) -> Vec<i8> {
        self.cells.iter().map(|t| t.to_code()).collect()
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.cells[row * self.size + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, tile: Tile) {
        self.cells[row * self.size + col] = tile;
    }

    #[inline(always)]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    #[inline(always)]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.size, index % self.size)
    }

    pub fn tile_count(&self) -> usize {
        self.size * self.size
    }

    pub fn opened_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_opened()).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_flagged()).count()
    }

    /// Coordinates of every unopened (and unflagged) tile, row-major.
    pub fn unopened(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_unopened())
            .map(|(i, _)| self.coords(i))
            .collect()
    }
}

/// Pre-computed neighbour cache for all tiles of a square board.
///
/// Stores the 8-directional neighbours (clipped to bounds) for every tile.
/// Indexed by `row * size + col`.
pub struct NeighborCache {
    pub size: usize,
    /// Flat storage of all neighbour pairs.
    data: Vec<(usize, usize)>,
    /// offsets[i]..offsets[i+1] is the slice of `data` for tile i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    pub fn new(size: usize) -> Self {
        let total = size * size;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..size {
            for col in 0..size {
                offsets.push(data.len());
                data.extend(neighbors(size, row, col));
            }
        }
        offsets.push(data.len()); // sentinel

        Self { size, data, offsets }
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> &[(usize, usize)] {
        let idx = row * self.size + col;
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_code_roundtrip() {
        for code in -2i8..=8 {
            let tile = Tile::from_code(code).unwrap();
            assert_eq!(tile.to_code(), code);
        }
        assert_eq!(Tile::from_code(9), None);
        assert_eq!(Tile::from_code(-3), None);
    }

    #[test]
    fn test_board_get_set() {
        let mut b = BoardState::new(6);
        b.set(3, 5, Tile::Opened(7));
        assert_eq!(b.get(3, 5), Tile::Opened(7));
        assert_eq!(b.get(0, 0), Tile::Unopened);
        assert_eq!(b.coords(b.index(3, 5)), (3, 5));
    }

    #[test]
    fn test_from_codes_rejects_bad_input() {
        assert!(BoardState::from_codes(2, &[-1, -1, 0]).is_none());
        assert!(BoardState::from_codes(2, &[-1, -1, 0, 12]).is_none());
        let b = BoardState::from_codes(2, &[-1, -2, 0, 3]).unwrap();
        assert_eq!(b.get(0, 1), Tile::Flagged);
        assert_eq!(b.get(1, 1), Tile::Opened(3));
    }

    #[test]
    fn test_neighbor_cache_corners() {
        let nc = NeighborCache::new(5);
        assert_eq!(nc.get(0, 0).len(), 3);
        assert_eq!(nc.get(0, 2).len(), 5);
        assert_eq!(nc.get(2, 2).len(), 8);
        assert_eq!(nc.get(4, 4).len(), 3);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        for &(r, c) in NeighborCache::new(10).get(5, 5) {
            let dr = r as i32 - 5;
            let dc = c as i32 - 5;
            assert!(dr.abs() <= 1 && dc.abs() <= 1);
            assert!(dr != 0 || dc != 0);
        }
    }

    #[test]
    fn test_mines_count() {
        let mut m = MineField::new(5);
        m.set(0, 0, true);
        m.set(2, 3, true);
        m.set(4, 4, true);
        assert_eq!(m.count(), 3);
        assert_eq!(m.adjacent_mines(1, 1), 1);
        assert_eq!(m.adjacent_mines(3, 3), 2);
    }
}
