use thiserror::Error;

pub type CrosswordResult<T> = Result<T, CrosswordError>;

#[derive(Error, Debug)]
pub enum CrosswordError {
    #[error("The grid has no rows")]
    EmptyGrid,
    #[error("Row {row} has {found} cells but the grid is {expected} cells wide")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown cell marker {cell:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, cell: char },
    #[error("Failed to read file {1}, more details: {0}")]
    FileRead(std::io::Error, String),
    #[error("Failed to write file {1}, more details: {0}")]
    FileWrite(std::io::Error, String),
}
