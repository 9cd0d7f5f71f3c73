//! Task and flow result types

use serde::Serialize;

use crate::pipeline::plan::StepId;

/// Result of a single warehouse update task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub batches: usize,
    pub duration_ms: u64,
}

impl TaskResult {
    pub fn succeeded(batches: usize, duration_ms: u64) -> Self {
        Self {
            success: true,
            error: None,
            batches,
            duration_ms,
        }
    }

    pub fn failed(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            batches: 0,
            duration_ms,
        }
    }
}

/// Lifecycle of a flow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum FlowState {
    Initialized,
    Running(StepId),
    Succeeded,
    Failed,
}

/// Outcome of one executed step, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: StepId,
    pub result: TaskResult,
}

/// Result of a flow execution
#[derive(Debug, Clone, Serialize)]
pub struct FlowResult {
    pub success: bool,
    pub execution_id: String,
    pub state: FlowState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<StepOutcome>,
}

impl FlowResult {
    pub fn get(&self, step: StepId) -> Option<&TaskResult> {
        self.results
            .iter()
            .find(|o| o.step == step)
            .map(|o| &o.result)
    }

    pub fn executed_steps(&self) -> Vec<StepId> {
        self.results.iter().map(|o| o.step).collect()
    }
}
