use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, GoalStatus};

/// Where the agent is within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Idle,
    CapturingBefore,
    SelectingAction,
    ParsingAction,
    Executing,
    Settling,
    CapturingAfter,
    Summarizing,
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// No `Reason:`/`Action:` pair in the model output.
    MalformedOutput,
    /// The action text did not decode into a valid action.
    UnparsableAction { error: String },
    IndexOutOfRange { index: usize, element_count: usize },
    GoalReached { goal_status: GoalStatus },
    ExecutionFailed { action_type: ActionKind, error: String },
    ObservationFailed { action_type: ActionKind, error: String },
    Executed { action_type: ActionKind },
}

impl StepOutcome {
    /// True when the action was carried out and observed.
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Executed { .. } | StepOutcome::GoalReached { .. })
    }
}

/// Result of one [`crate::agent_engine::engine::T3aAgent::step`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub done: bool,
    pub step: usize,
    pub outcome: StepOutcome,
    /// The history line stored for this step.
    pub summary: String,
}
