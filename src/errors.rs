use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickpushError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] git2::Error),

    #[error("Repository at '{}' has no working directory", .0.display())]
    BareRepository(PathBuf),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("{failed} of {total} branch tasks failed")]
    TasksFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, PickpushError>;
