//! SQL script execution
//!
//! Scripts run through the [`Connector`] seam: one connection per script,
//! batches executed in order, connection released on every path.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::batch::split_batches;
use super::value::SqlValue;
use crate::pipeline::error::PipelineError;

/// Errors reported by a database connection
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Query(String),
}

impl From<DbError> for PipelineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Connection(message) => PipelineError::Connection(message),
            DbError::Query(message) => PipelineError::ScriptExecution { batch: 0, message },
        }
    }
}

/// An open database connection in auto-commit mode
#[async_trait]
pub trait SqlConnection: Send {
    /// Execute one batch and drain its results
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError>;

    /// Execute a statement with positional parameters `@P1..@Pn`
    async fn execute_params(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError>;

    /// Run a query returning a single integer in the first column
    async fn query_count(&mut self, sql: &str) -> Result<i64, DbError>;

    async fn close(self: Box<Self>) -> Result<(), DbError>;
}

/// Opens fresh connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SqlConnection>, DbError>;
}

/// Execute a script batch by batch, returning the number of batches run.
///
/// Stops at the first failing batch. The connection is closed either way.
#[instrument(skip_all, fields(script_len = script.len()))]
pub async fn execute_script(connector: &dyn Connector, script: &str) -> Result<usize, PipelineError> {
    let batches = split_batches(script);
    let mut conn = connector.connect().await?;

    let mut failure = None;
    for (idx, batch) in batches.iter().enumerate() {
        debug!(batch = idx + 1, total = batches.len(), "Executing batch");
        if let Err(e) = conn.execute_batch(batch).await {
            failure = Some(PipelineError::ScriptExecution {
                batch: idx + 1,
                message: e.to_string(),
            });
            break;
        }
    }

    if let Err(e) = conn.close().await {
        warn!("Failed to close connection: {}", e);
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(batches.len()),
    }
}
