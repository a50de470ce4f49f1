use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Requested grid size is below the allowed minimum.
    #[error("grid size {size} is below the minimum of {min}")]
    InvalidSize { size: usize, min: usize },
    #[error("malformed grid text: {0}")]
    Format(#[from] FormatError),
    /// The operation mutates the grid and needs the simulation to be stopped.
    #[error("operation requires a stopped simulation")]
    InvalidState,
    #[error("grid i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a saved grid could not be parsed. Lines and columns are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("no rows found")]
    Empty,
    #[error("line {line}, column {column}: `{token}` is not an integer")]
    InvalidToken { line: usize, column: usize, token: String },
    #[error("line {line}, column {column}: age {value} is outside 0..{max}")]
    AgeOutOfRange { line: usize, column: usize, value: i64, max: u8 },
    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow { line: usize, expected: usize, found: usize },
    #[error("{rows} rows of {columns} cells do not form a square grid")]
    NotSquare { rows: usize, columns: usize },
}
