use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value {value:?} for {key}")]
    Config { key: String, value: String },

    #[error("invalid roster: {0}")]
    InvalidRoster(String),
}

pub type Result<T> = std::result::Result<T, SeatingError>;
