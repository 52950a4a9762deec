//! Board generation and the board-state engine.
//!
//! The mine field is produced lazily on the first click so that the clicked
//! tile is never a mine. Opening a zero tile floods outward with an explicit
//! work-list, so board size never turns into call-stack depth.

use std::fmt;

use log::trace;

use crate::error::GameError;
use crate::rng::GameRng;
use crate::types::{neighbors, BoardState, MineField, Tile};

/// Place `mine_count` mines uniformly among every tile except `(first_row, first_col)`.
///
/// Fails fast when the request cannot leave the first tile safe.
pub fn generate_mine_field(
    size: usize,
    mine_count: usize,
    first_row: usize,
    first_col: usize,
    rng: &mut GameRng,
) -> Result<MineField, GameError> {
    if size == 0 {
        return Err(GameError::ZeroSizeBoard);
    }
    let cells = size * size;
    if mine_count >= cells {
        return Err(GameError::TooManyMines { requested: mine_count, cells });
    }
    if first_row >= size || first_col >= size {
        return Err(GameError::OutOfBounds { row: first_row, col: first_col, size });
    }

    let first = first_row * size + first_col;
    let mut field = MineField::new(size);

    // Sample from the N²-1 other tiles, then shift past the first click.
    for idx in rng.sample_indices(cells - 1, mine_count) {
        let idx = if idx >= first { idx + 1 } else { idx };
        field.cells[idx] = true;
    }

    Ok(field)
}

/// Open a tile. Flagged tiles are left alone.
///
/// A tile with no adjacent mines (that is not itself a mine) opens every
/// unopened neighbour, transitively. Returns how many tiles changed.
pub fn open(state: &mut BoardState, field: &MineField, row: usize, col: usize) -> usize {
    if state.get(row, col).is_flagged() {
        return 0;
    }

    let size = state.size;
    let mut opened = 0;
    let mut stack: Vec<(usize, usize)> = vec![(row, col)];
    let mut first = true;

    while let Some((r, c)) = stack.pop() {
        // The clicked tile is always (re)evaluated, cascaded ones only while unopened.
        if !first && !state.get(r, c).is_unopened() {
            continue;
        }
        first = false;

        let count = field.adjacent_mines(r, c);
        if state.get(r, c) != Tile::Opened(count) {
            opened += 1;
        }
        state.set(r, c, Tile::Opened(count));

        if count == 0 && !field.is_mine(r, c) {
            for (nr, nc) in neighbors(size, r, c) {
                if state.get(nr, nc).is_unopened() {
                    stack.push((nr, nc));
                }
            }
        }
    }

    trace!("open ({}, {}) revealed {} tiles", row, col, opened);
    opened
}

/// Toggle a flag. Opened tiles cannot be flagged.
pub fn flag(state: &mut BoardState, row: usize, col: usize) {
    match state.get(row, col) {
        Tile::Unopened => state.set(row, col, Tile::Flagged),
        Tile::Flagged => state.set(row, col, Tile::Unopened),
        Tile::Opened(_) => {}
    }
}

/// The game is lost once any mine has been opened.
pub fn is_lost(field: &MineField, state: &BoardState) -> bool {
    field
        .cells
        .iter()
        .zip(&state.cells)
        .any(|(&mine, tile)| mine && tile.is_opened())
}

/// The game is won once every non-mine tile is open. Flags do not matter.
pub fn is_won(state: &BoardState, mine_count: usize) -> bool {
    state.opened_count() == state.tile_count() - mine_count
}

/// Terminal state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Combine the two predicates. A lost board is never reported as won, even
/// when the losing click brought the opened count up to the winning total.
pub fn game_status(field: &MineField, state: &BoardState, mine_count: usize) -> GameStatus {
    if is_lost(field, state) {
        GameStatus::Lost
    } else if is_won(state, mine_count) {
        GameStatus::Won
    } else {
        GameStatus::Playing
    }
}

/// Text rendering with the mine layout known: `-` unopened, `f` flagged,
/// `m` an opened mine, otherwise the tile's count.
pub fn render(state: &BoardState, field: &MineField) -> String {
    let mut out = String::with_capacity(state.tile_count() * 2 + state.size);
    for row in 0..state.size {
        for col in 0..state.size {
            if col > 0 {
                out.push(' ');
            }
            match state.get(row, col) {
                Tile::Unopened => out.push('-'),
                Tile::Flagged => out.push('f'),
                Tile::Opened(_) if field.is_mine(row, col) => out.push('m'),
                Tile::Opened(k) => out.push(char::from(b'0' + k)),
            }
        }
        out.push('\n');
    }
    out
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match self.get(row, col) {
                    Tile::Unopened => f.write_str("-")?,
                    Tile::Flagged => f.write_str("f")?,
                    Tile::Opened(k) => write!(f, "{}", k)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(size: usize, mines: &[(usize, usize)]) -> MineField {
        let mut field = MineField::new(size);
        for &(r, c) in mines {
            field.set(r, c, true);
        }
        field
    }

    #[test]
    fn test_generate_mine_count_and_safe_first_move() {
        let mut rng = GameRng::from_seed(42);
        for size in 1..8 {
            for mines in 0..(size * size) {
                let (r0, c0) = (rng.gen_range(size), rng.gen_range(size));
                let field = generate_mine_field(size, mines, r0, c0, &mut rng).unwrap();
                assert_eq!(field.count(), mines);
                assert!(!field.is_mine(r0, c0), "mine at first move ({}, {})", r0, c0);
            }
        }
    }

    #[test]
    fn test_generate_rejects_bad_requests() {
        let mut rng = GameRng::from_seed(1);
        assert_eq!(
            generate_mine_field(3, 9, 0, 0, &mut rng).unwrap_err(),
            GameError::TooManyMines { requested: 9, cells: 9 }
        );
        assert_eq!(generate_mine_field(0, 0, 0, 0, &mut rng).unwrap_err(), GameError::ZeroSizeBoard);
        assert_eq!(
            generate_mine_field(3, 1, 3, 0, &mut rng).unwrap_err(),
            GameError::OutOfBounds { row: 3, col: 0, size: 3 }
        );
    }

    #[test]
    fn test_open_cascade_wins_3x3() {
        let field = field_with(3, &[(2, 2)]);
        let mut state = BoardState::new(3);

        let opened = open(&mut state, &field, 0, 0);

        assert_eq!(opened, 8);
        assert_eq!(state.get(0, 0), Tile::Opened(0));
        assert_eq!(state.get(1, 1), Tile::Opened(1));
        assert_eq!(state.get(1, 2), Tile::Opened(1));
        assert_eq!(state.get(2, 1), Tile::Opened(1));
        assert_eq!(state.get(0, 2), Tile::Opened(0));
        assert_eq!(state.get(2, 2), Tile::Unopened);
        assert!(is_won(&state, 1));
        assert!(!is_lost(&field, &state));
    }

    #[test]
    fn test_open_numbered_tile_does_not_cascade() {
        let field = field_with(3, &[(0, 0)]);
        let mut state = BoardState::new(3);
        assert_eq!(open(&mut state, &field, 1, 1), 1);
        assert_eq!(state.get(1, 1), Tile::Opened(1));
        assert_eq!(state.opened_count(), 1);
    }

    #[test]
    fn test_open_flagged_is_noop() {
        let field = field_with(3, &[]);
        let mut state = BoardState::new(3);
        flag(&mut state, 1, 1);
        assert_eq!(open(&mut state, &field, 1, 1), 0);
        assert_eq!(state.get(1, 1), Tile::Flagged);
    }

    #[test]
    fn test_cascade_skips_flags() {
        let field = field_with(4, &[]);
        let mut state = BoardState::new(4);
        flag(&mut state, 3, 3);
        open(&mut state, &field, 0, 0);
        assert_eq!(state.get(3, 3), Tile::Flagged);
        assert_eq!(state.opened_count(), 15);
    }

    #[test]
    fn test_open_mine_loses() {
        let field = field_with(3, &[(1, 1)]);
        let mut state = BoardState::new(3);
        open(&mut state, &field, 1, 1);
        assert!(is_lost(&field, &state));
        assert!(!is_won(&state, 1));
    }

    #[test]
    fn test_flood_fill_large_board() {
        // A single mine in the corner of a 60x60 board: one click opens everything else.
        let field = field_with(60, &[(59, 59)]);
        let mut state = BoardState::new(60);
        open(&mut state, &field, 0, 0);
        assert_eq!(state.opened_count(), 60 * 60 - 1);
        assert!(is_won(&state, 1));
    }

    #[test]
    fn test_flood_fill_stops_at_numbers() {
        // Wall of mines down column 2 splits the board.
        let mines: Vec<(usize, usize)> = (0..5).map(|r| (r, 2)).collect();
        let field = field_with(5, &mines);
        let mut state = BoardState::new(5);
        open(&mut state, &field, 0, 0);
        for r in 0..5 {
            assert_eq!(state.get(r, 0), Tile::Opened(0));
            assert!(state.get(r, 1).label().unwrap() > 0);
            assert!(state.get(r, 3).is_unopened());
            assert!(state.get(r, 4).is_unopened());
        }
    }

    #[test]
    fn test_flag_toggle() {
        let field = field_with(2, &[]);
        let mut state = BoardState::new(2);
        flag(&mut state, 0, 1);
        assert_eq!(state.get(0, 1), Tile::Flagged);
        flag(&mut state, 0, 1);
        assert_eq!(state.get(0, 1), Tile::Unopened);

        open(&mut state, &field, 0, 0);
        flag(&mut state, 0, 0);
        assert_eq!(state.get(0, 0), Tile::Opened(0));
    }

    #[test]
    fn test_win_loss_exclusive_random_play() {
        let mut rng = GameRng::from_seed(99);
        for _ in 0..200 {
            let field = generate_mine_field(5, 6, 2, 2, &mut rng).unwrap();
            let mut state = BoardState::new(5);
            open(&mut state, &field, 2, 2);
            while game_status(&field, &state, 6) == GameStatus::Playing {
                let unopened = state.unopened();
                let (r, c) = unopened[rng.gen_range(unopened.len())];
                open(&mut state, &field, r, c);
                match game_status(&field, &state, 6) {
                    GameStatus::Won => assert!(!is_lost(&field, &state)),
                    GameStatus::Lost => assert!(is_lost(&field, &state)),
                    GameStatus::Playing => {
                        assert!(!is_won(&state, 6));
                        assert!(!is_lost(&field, &state));
                    }
                }
            }
        }
    }

    #[test]
    fn test_losing_click_is_not_a_win() {
        // The mine click lifts the opened count to the winning total.
        let field = field_with(2, &[(1, 1)]);
        let mut state = BoardState::new(2);
        open(&mut state, &field, 0, 0);
        open(&mut state, &field, 0, 1);
        open(&mut state, &field, 1, 1);
        assert!(is_lost(&field, &state));
        assert_eq!(game_status(&field, &state, 1), GameStatus::Lost);
        open(&mut state, &field, 1, 0);
        assert_eq!(game_status(&field, &state, 1), GameStatus::Lost);
    }

    #[test]
    fn test_render() {
        let field = field_with(2, &[(1, 1)]);
        let mut state = BoardState::new(2);
        open(&mut state, &field, 0, 0);
        flag(&mut state, 0, 1);
        assert_eq!(render(&state, &field), "1 f\n- -\n");
        open(&mut state, &field, 1, 1);
        assert_eq!(render(&state, &field), "1 f\n- m\n");
        assert_eq!(state.to_string(), "1 f\n- 0\n");
    }
}
