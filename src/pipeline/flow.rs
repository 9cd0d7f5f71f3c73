//! Dimensional data flow
//!
//! Runs the warehouse refresh: the eight dimension updates, then the fact
//! table, then the fact error table. Steps run sequentially in plan order
//! and the flow stops at the first failed step.

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::pipeline::dates::DateRange;
use crate::pipeline::error::PipelineError;
use crate::pipeline::plan::FlowPlan;
use crate::pipeline::result::{FlowResult, FlowState, StepOutcome, TaskResult};
use crate::pipeline::task::{run_step, TaskContext};

pub struct DimensionalDataFlow {
    ctx: TaskContext,
    plan: FlowPlan,
    execution_id: String,
    state: FlowState,
}

impl DimensionalDataFlow {
    /// Create a flow with a fresh execution id
    pub fn new(ctx: TaskContext) -> Result<Self, PipelineError> {
        Self::with_plan(ctx, FlowPlan::standard()?)
    }

    pub fn with_plan(ctx: TaskContext, plan: FlowPlan) -> Result<Self, PipelineError> {
        let execution_id = Uuid::new_v4().to_string();
        info!(
            execution_id = %execution_id,
            steps = plan.len(),
            "Initialized DimensionalDataFlow"
        );

        Ok(Self {
            ctx,
            plan,
            execution_id,
            state: FlowState::Initialized,
        })
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn plan(&self) -> &FlowPlan {
        &self.plan
    }

    /// Run every step for the given date range
    pub async fn exec(&mut self, range: &DateRange) -> FlowResult {
        let span = info_span!("flow", execution_id = %self.execution_id);
        self.run(range).instrument(span).await
    }

    async fn run(&mut self, range: &DateRange) -> FlowResult {
        info!("Starting dimensional data flow for {}", range);

        let steps: Vec<_> = self.plan.steps().iter().map(|s| s.id).collect();
        let mut results: Vec<StepOutcome> = Vec::with_capacity(steps.len());

        for step in steps {
            self.state = FlowState::Running(step);
            info!(step = %step, "Updating {}", step);

            let prerequisite: Option<&TaskResult> = results.last().map(|o| &o.result);
            let result = run_step(&self.ctx, step, range, prerequisite).await;
            let failure = failure_cause(&result);
            results.push(StepOutcome { step, result });

            if let Some(cause) = failure {
                self.state = FlowState::Failed;
                let message = format!("Failed to update {}: {}", step, cause);
                error!(step = %step, "{}", message);
                return FlowResult {
                    success: false,
                    execution_id: self.execution_id.clone(),
                    state: self.state,
                    error: Some(message),
                    results,
                };
            }
        }

        self.state = FlowState::Succeeded;
        info!("Dimensional data flow completed successfully");

        FlowResult {
            success: true,
            execution_id: self.execution_id.clone(),
            state: self.state,
            error: None,
            results,
        }
    }
}

/// Cause of a failed task, `None` when it succeeded
fn failure_cause(result: &TaskResult) -> Option<String> {
    if result.success {
        return None;
    }
    Some(
        result
            .error
            .clone()
            .unwrap_or_else(|| "task reported failure without an error message".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_cause_follows_success_flag() {
        assert_eq!(failure_cause(&TaskResult::succeeded(2, 5)), None);
        assert_eq!(
            failure_cause(&TaskResult::failed("Invalid object name", 5)),
            Some("Invalid object name".to_string())
        );

        let silent = TaskResult {
            success: false,
            error: None,
            batches: 0,
            duration_ms: 0,
        };
        assert!(failure_cause(&silent).is_some());

        let stray_message = TaskResult {
            success: true,
            error: Some("warning".to_string()),
            batches: 1,
            duration_ms: 0,
        };
        assert_eq!(failure_cause(&stray_message), None);
    }
}
