//! Warehouse update tasks
//!
//! Each task loads its SQL script, substitutes database, schema, table and
//! (for fact tables) date placeholders, and executes it. Tasks never return
//! an error: failures are reported through [`TaskResult`].
//!
//! The `prerequisite` argument only expresses ordering between tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::config::{Dimension, WarehouseNames};
use crate::pipeline::dates::DateRange;
use crate::pipeline::plan::StepId;
use crate::pipeline::result::TaskResult;
use crate::sql::{execute_script, load_script, Connector, Placeholders};

pub const DEFAULT_QUERIES_DIR: &str = "pipeline_dimensional_data/queries";
pub const FACT_SCRIPT: &str = "update_fact.sql";
pub const FACT_ERROR_SCRIPT: &str = "update_fact_error.sql";

/// Everything a task needs to run its script
#[derive(Clone)]
pub struct TaskContext {
    pub connector: Arc<dyn Connector>,
    pub queries_dir: PathBuf,
    pub names: WarehouseNames,
}

impl TaskContext {
    pub fn new(connector: Arc<dyn Connector>, queries_dir: impl Into<PathBuf>) -> Self {
        Self {
            connector,
            queries_dir: queries_dir.into(),
            names: WarehouseNames::default(),
        }
    }

    pub fn with_names(mut self, names: WarehouseNames) -> Self {
        self.names = names;
        self
    }

    fn base_placeholders(&self) -> Placeholders {
        Placeholders::new()
            .with("database_name", &self.names.database)
            .with("schema_name", &self.names.schema)
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("queries_dir", &self.queries_dir)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Run the task behind a plan step
pub async fn run_step(
    ctx: &TaskContext,
    step: StepId,
    range: &DateRange,
    prerequisite: Option<&TaskResult>,
) -> TaskResult {
    match step {
        StepId::Dimension(dimension) => update_dimension_table(ctx, dimension, prerequisite).await,
        StepId::FactOrders => update_fact_orders(ctx, range, prerequisite).await,
        StepId::FactOrdersError => update_fact_orders_error(ctx, range, prerequisite).await,
    }
}

/// Refresh a dimension table from its staging table
pub async fn update_dimension_table(
    ctx: &TaskContext,
    dimension: Dimension,
    _prerequisite: Option<&TaskResult>,
) -> TaskResult {
    let placeholders = ctx
        .base_placeholders()
        .with("dim_table_name", dimension.table_name())
        .with("staging_table_name", dimension.staging_table());
    let path = ctx.queries_dir.join(dimension.script_file());

    run_script(ctx, dimension.table_name(), &path, &placeholders).await
}

pub async fn update_dim_categories(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Categories, prerequisite).await
}

pub async fn update_dim_customers(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Customers, prerequisite).await
}

pub async fn update_dim_employees(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Employees, prerequisite).await
}

pub async fn update_dim_products(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Products, prerequisite).await
}

pub async fn update_dim_region(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Region, prerequisite).await
}

pub async fn update_dim_shippers(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Shippers, prerequisite).await
}

pub async fn update_dim_suppliers(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Suppliers, prerequisite).await
}

pub async fn update_dim_territories(ctx: &TaskContext, prerequisite: Option<&TaskResult>) -> TaskResult {
    update_dimension_table(ctx, Dimension::Territories, prerequisite).await
}

/// Load orders within the date range into the fact table
pub async fn update_fact_orders(
    ctx: &TaskContext,
    range: &DateRange,
    _prerequisite: Option<&TaskResult>,
) -> TaskResult {
    let placeholders = ctx
        .base_placeholders()
        .with("fact_table_name", &ctx.names.fact_orders)
        .with("start_date", range.start_date())
        .with("end_date", range.end_date());
    let path = ctx.queries_dir.join(FACT_SCRIPT);

    run_script(ctx, &ctx.names.fact_orders, &path, &placeholders).await
}

/// Record orders within the date range that could not be loaded into the fact table
pub async fn update_fact_orders_error(
    ctx: &TaskContext,
    range: &DateRange,
    _prerequisite: Option<&TaskResult>,
) -> TaskResult {
    let placeholders = ctx
        .base_placeholders()
        .with("fact_error_table_name", &ctx.names.fact_orders_error)
        .with("start_date", range.start_date())
        .with("end_date", range.end_date());
    let path = ctx.queries_dir.join(FACT_ERROR_SCRIPT);

    run_script(ctx, &ctx.names.fact_orders_error, &path, &placeholders).await
}

async fn run_script(ctx: &TaskContext, target: &str, path: &Path, placeholders: &Placeholders) -> TaskResult {
    let started = Instant::now();

    let outcome = match load_script(path, placeholders) {
        Ok(script) => execute_script(ctx.connector.as_ref(), &script).await,
        Err(e) => Err(e),
    };
    let elapsed = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(batches) => {
            info!(target_table = %target, batches, duration_ms = elapsed, "Updated {}", target);
            TaskResult::succeeded(batches, elapsed)
        }
        Err(e) => {
            error!(target_table = %target, "Error updating {}: {}", target, e);
            TaskResult::failed(e.to_string(), elapsed)
        }
    }
}
