use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board dimensions must be positive")]
    InvalidSize,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board cells and counts disagree")]
    InvalidBoardState,
    #[error("Generated board does not match the requested configuration")]
    ConfigMismatch,
    #[error("Board has no safe cell to start from")]
    NoSafeCell,
    #[error("No fully connected board found after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, GameError>;
