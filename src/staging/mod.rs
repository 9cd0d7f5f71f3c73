//! Spreadsheet to staging table loading
//!
//! This module contains:
//! - `schema` - Staging tables, columns and sheet-name aliases
//! - `workbook` - Workbook access and cell types
//! - `coerce` - Cell to column-type conversion
//! - `loader` - The truncate-and-insert loader
//! - `error` - Staging error types

pub mod coerce;
pub mod error;
pub mod loader;
pub mod schema;
pub mod workbook;

pub use error::StagingError;
pub use loader::{LoadReport, SheetLoad, StagingLoader};
pub use schema::{Column, StagingTable};
pub use workbook::{CalamineWorkbook, Cell, Sheet, WorkbookSource};

/// Default location of the source workbook
pub const DEFAULT_WORKBOOK_PATH: &str = "raw_data_source.xlsx";
