//! Staging load errors

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::sql::{DbError, SqlType};

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Excel file '{0}' not found")]
    WorkbookNotFound(PathBuf),

    #[error("Failed to read workbook {file}: {message}")]
    Workbook { file: String, message: String },

    #[error("Sheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}', row {row}, column '{column}': cannot convert {value} to {expected}")]
    Coercion {
        sheet: String,
        row: usize,
        column: String,
        value: String,
        expected: SqlType,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
