use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
