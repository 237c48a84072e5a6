//! Error types for letter-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Malformed time token: {0}")]
    MalformedTimeToken(String),

    #[error("Variant not found: {0}")]
    NotFound(String),

    #[error("Duplicate variant id: {0}")]
    DuplicateId(String),

    #[error("Variant '{id}' ends at {end} which is not after its start {start}")]
    EmptyInterval {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid schedule data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
