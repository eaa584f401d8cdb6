// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrewError>;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crew definition error: {0}")]
    CrewDefinition(String),

    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    #[error("LLM returned an empty completion for task {0}")]
    EmptyCompletion(String),

    #[error("Search request failed: {0}")]
    SearchRequest(String),

    #[error("Task {task} failed validation after {attempts} attempts: {reason}")]
    ValidationExhausted {
        task: String,
        attempts: usize,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CrewError {
    fn from(err: serde_json::Error) -> Self {
        CrewError::Serialization(err.to_string())
    }
}
