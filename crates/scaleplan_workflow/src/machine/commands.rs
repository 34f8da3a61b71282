//! Commands accepted by the workflow state machine.

use super::state::ProjectBrief;
use crate::record::ExtractedRecord;
use scaleplan_error::WorkflowError;

/// Every way workflow state can change.
///
/// Commands are applied through [`WorkflowMachine::apply`](super::WorkflowMachine::apply),
/// which rejects any command the current stage does not permit.
#[derive(Debug, Clone, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowCommand {
    // User actions
    /// Submit a brief; `Idle` only
    Begin {
        /// Validated brief
        brief: ProjectBrief,
    },
    /// Ask for a revised plan; `AwaitingApproval` only
    RequestChanges {
        /// Reviewer feedback, non-blank
        feedback: String,
    },
    /// Accept the plan; `AwaitingApproval` only
    Approve,
    /// Re-enter the stage that failed; `Failed` only
    Retry,
    /// Clear everything; any stage
    Reset,

    // Stage results
    /// Screenshots are ready; `Uploading` only
    BeginExtraction,
    /// The extraction handler returned a record
    ExtractionSucceeded {
        /// Parsed record
        record: ExtractedRecord,
    },
    /// The plan handler returned text
    PlanSucceeded {
        /// Plan text
        text: String,
    },
    /// The evaluation handler returned text
    FactCheckSucceeded {
        /// Fact-check text
        text: String,
    },
    /// The storyboard handler returned text
    StoryboardSucceeded {
        /// Storyboard text
        text: String,
    },
    /// The handler for the current stage failed
    StageFailed {
        /// What went wrong
        error: WorkflowError,
    },
}

impl WorkflowCommand {
    /// Snake-case command name used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
