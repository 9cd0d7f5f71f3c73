//! Warehouse update pipeline

pub mod dates;
pub mod error;
pub mod flow;
pub mod plan;
pub mod result;
pub mod task;

pub use dates::{DateRange, ValidationError, DATE_FORMAT};
pub use error::PipelineError;
pub use flow::DimensionalDataFlow;
pub use plan::{FlowPlan, PlanError, PlannedStep, StepId};
pub use result::{FlowResult, FlowState, StepOutcome, TaskResult};
pub use task::{
    run_step, update_dim_categories, update_dim_customers, update_dim_employees,
    update_dim_products, update_dim_region, update_dim_shippers, update_dim_suppliers,
    update_dim_territories, update_dimension_table, update_fact_orders, update_fact_orders_error,
    TaskContext, DEFAULT_QUERIES_DIR,
};
