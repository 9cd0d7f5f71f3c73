//! # Dimensional Pipeline
//!
//! Loads the Northwind-style order data set into a SQL Server dimensional
//! warehouse.
//!
//! ## Stages
//!
//! - **Staging load** - every mapped workbook sheet fully replaces its
//!   `stg_*_raw` table
//! - **Dimensional flow** - eight dimension updates, then the `FactOrders`
//!   and `FactOrders_Error` loads for a date range
//!
//! Each warehouse update is a parameterized SQL script split into batches on
//! `GO` lines and executed over a fresh connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dimensional_pipeline::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConnectionConfig::load("sql_server_config.cfg")?;
//!     let ctx = TaskContext::new(
//!         Arc::new(TiberiusConnector::new(config)),
//!         DEFAULT_QUERIES_DIR,
//!     );
//!
//!     let range = DateRange::parse("1996-07-04", "1998-05-06")?;
//!     let mut flow = DimensionalDataFlow::new(ctx)?;
//!     let result = flow.exec(&range).await;
//!
//!     println!("Flow completed: success={}", result.success);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod sql;
pub mod staging;

// Re-export main types
pub use config::{ConfigError, ConnectionConfig, Credentials, Dimension, WarehouseNames};
pub use logging::{init_console_logging, init_logging, LoggingError, DEFAULT_LOG_FILE};
pub use pipeline::{
    DateRange, DimensionalDataFlow, FlowPlan, FlowResult, FlowState, PipelineError, PlanError,
    StepId, StepOutcome, TaskContext, TaskResult, ValidationError,
};
pub use sql::{Connector, DbError, SqlConnection, SqlType, SqlValue, TiberiusConnector};
pub use staging::{CalamineWorkbook, LoadReport, StagingError, StagingLoader, StagingTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConnectionConfig, Dimension, WarehouseNames, DEFAULT_CONFIG_PATH};
    pub use crate::pipeline::{
        DateRange, DimensionalDataFlow, FlowResult, PipelineError, StepId, TaskContext,
        TaskResult, DEFAULT_QUERIES_DIR,
    };
    pub use crate::sql::{Connector, TiberiusConnector};
    pub use crate::staging::{
        CalamineWorkbook, LoadReport, StagingLoader, WorkbookSource, DEFAULT_WORKBOOK_PATH,
    };
}
