//! Pipeline error types

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::pipeline::dates::ValidationError;
use crate::pipeline::plan::PlanError;

/// Errors that can occur while running warehouse update scripts
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("SQL file not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Script execution failed in batch {batch}: {message}")]
    ScriptExecution { batch: usize, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
