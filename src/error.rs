//! Error types for the engine.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Tried to create a board with zero tiles")]
    ZeroSizeBoard,
    #[error("Tried to place {requested} mines on a board with only {cells} tiles ( at least one tile must stay safe )")]
    TooManyMines { requested: usize, cells: usize },
    #[error("Coordinate ({row}, {col}) is outside of a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    #[error("No unopened tile left to choose from")]
    NoUnopenedTiles,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid game configuration: {0}")]
    Game(#[from] GameError),
    #[error("Unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Error during running of game: {0}")]
    Game(#[from] GameError),
    #[error("Error during running of solver: {0}")]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;
