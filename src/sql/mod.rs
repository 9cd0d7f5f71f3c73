//! SQL script handling
//!
//! This module contains:
//! - `script` - Load script files and substitute `{placeholder}` tokens
//! - `batch` - Split scripts on the `GO` separator
//! - `executor` - Connection traits and batch-by-batch execution
//! - `connection` - SQL Server connector
//! - `value` - Typed parameter values

pub mod batch;
pub mod connection;
pub mod executor;
pub mod script;
pub mod value;

pub use batch::split_batches;
pub use connection::{TiberiusConnection, TiberiusConnector};
pub use executor::{execute_script, Connector, DbError, SqlConnection};
pub use script::{load_script, read_script, unresolved_placeholders, Placeholders};
pub use value::{SqlType, SqlValue};
