use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

/// Failures that stop the binary before or while producing output. Pipeline
/// operations themselves never fail; they degrade to empty or default values.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialise output: {0}")]
    Output(#[from] serde_json::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
