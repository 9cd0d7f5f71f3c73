//! Configuration for the pipeline
//!
//! This module contains:
//! - `connection` - SQL Server connection descriptor loaded from an INI file
//! - `warehouse` - Database, schema and table names of the warehouse

pub mod connection;
pub mod warehouse;

pub use connection::{ConfigError, ConnectionConfig, Credentials, DEFAULT_CONFIG_PATH};
pub use warehouse::{Dimension, WarehouseNames};
