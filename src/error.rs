use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("Malformed record at row {row}: unparseable date '{value}'")]
    MalformedRecord { row: usize, value: String },

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Insufficient data: {0}")]
    InsufficientData(&'static str),

    #[error("Empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown frequency: {0} (expected daily, weekly, or monthly)")]
    UnknownFrequency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, LensError>;
