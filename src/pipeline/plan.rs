//! Flow plan
//!
//! The warehouse refresh as a list of named steps with declared
//! dependencies. Steps run one at a time in declared order; the plan also
//! computes execution levels (steps whose dependencies are all in earlier
//! levels) so independent dimension loads can be identified.

use std::collections::{HashMap, HashSet};

use serde::{Serialize, Serializer};

use crate::config::Dimension;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Step '{step}' depends on non-existent step '{dependency}'")]
    MissingDependency { step: StepId, dependency: StepId },

    #[error("Step '{step}' is declared before its dependency '{dependency}'")]
    OutOfOrder { step: StepId, dependency: StepId },

    #[error("Cyclic dependency detected in flow plan")]
    CyclicDependency,

    #[error("Duplicate step: {0}")]
    DuplicateStep(StepId),
}

/// Identifies one warehouse update step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepId {
    Dimension(Dimension),
    FactOrders,
    FactOrdersError,
}

impl StepId {
    pub fn name(&self) -> &'static str {
        match self {
            StepId::Dimension(d) => d.table_name(),
            StepId::FactOrders => "FactOrders",
            StepId::FactOrdersError => "FactOrders_Error",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StepId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub id: StepId,
    pub depends_on: Vec<StepId>,
}

impl PlannedStep {
    pub fn new(id: StepId, depends_on: Vec<StepId>) -> Self {
        Self { id, depends_on }
    }
}

#[derive(Debug)]
pub struct FlowPlan {
    steps: Vec<PlannedStep>,
    execution_levels: Vec<Vec<StepId>>,
}

impl FlowPlan {
    pub fn build(steps: Vec<PlannedStep>) -> Result<Self, PlanError> {
        let mut positions: HashMap<StepId, usize> = HashMap::new();
        for (idx, step) in steps.iter().enumerate() {
            if positions.insert(step.id, idx).is_some() {
                return Err(PlanError::DuplicateStep(step.id));
            }
        }

        for (idx, step) in steps.iter().enumerate() {
            for dep in &step.depends_on {
                match positions.get(dep) {
                    None => {
                        return Err(PlanError::MissingDependency {
                            step: step.id,
                            dependency: *dep,
                        })
                    }
                    Some(&pos) if pos >= idx => {
                        // A self-reference or a back edge means there is a cycle
                        if Self::reaches(&steps, *dep, step.id) {
                            return Err(PlanError::CyclicDependency);
                        }
                        return Err(PlanError::OutOfOrder {
                            step: step.id,
                            dependency: *dep,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        let execution_levels = Self::compute_execution_levels(&steps);

        Ok(Self {
            steps,
            execution_levels,
        })
    }

    /// The fixed warehouse refresh: every dimension, then the fact table,
    /// then the fact error table
    pub fn standard() -> Result<Self, PlanError> {
        let dimensions: Vec<StepId> = Dimension::ALL.iter().map(|d| StepId::Dimension(*d)).collect();

        let mut steps: Vec<PlannedStep> = dimensions
            .iter()
            .map(|id| PlannedStep::new(*id, vec![]))
            .collect();
        steps.push(PlannedStep::new(StepId::FactOrders, dimensions));
        steps.push(PlannedStep::new(
            StepId::FactOrdersError,
            vec![StepId::FactOrders],
        ));

        Self::build(steps)
    }

    fn reaches(steps: &[PlannedStep], from: StepId, target: StepId) -> bool {
        let deps: HashMap<StepId, &Vec<StepId>> =
            steps.iter().map(|s| (s.id, &s.depends_on)).collect();
        let mut stack = vec![from];
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(next) = deps.get(&current) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }

    /// Every dependency precedes its step, so a single pass assigns each
    /// step one level past its deepest dependency
    fn compute_execution_levels(steps: &[PlannedStep]) -> Vec<Vec<StepId>> {
        let mut level_of: HashMap<StepId, usize> = HashMap::with_capacity(steps.len());
        let mut levels: Vec<Vec<StepId>> = Vec::new();

        for step in steps {
            let level = step
                .depends_on
                .iter()
                .filter_map(|dep| level_of.get(dep))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            level_of.insert(step.id, level);

            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(step.id);
        }

        levels
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn execution_levels(&self) -> &Vec<Vec<StepId>> {
        &self.execution_levels
    }

    pub fn get_step(&self, id: StepId) -> Option<&PlannedStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
