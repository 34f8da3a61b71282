//! Events emitted after a command is applied.

use super::state::Stage;
use serde::Serialize;

/// What a command changed. For logging and notification; the state itself
/// is read from the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// Stage moved
    StageChanged {
        /// Previous stage
        from: Stage,
        /// New stage
        to: Stage,
    },
    /// The structured record was stored
    ExtractionStored {
        /// Number of platforms with data
        platforms: usize,
    },
    /// A plan was stored
    PlanStored {
        /// Whether it replaced an earlier plan
        revision: bool,
    },
    /// A turn was appended to the conversation history
    HistoryAppended {
        /// History length after the append
        len: usize,
    },
    /// The fact-check was stored
    FactCheckStored,
    /// The storyboard was stored
    StoryboardStored,
    /// A stage failed
    FailureRecorded {
        /// Stage that failed
        stage: Stage,
        /// User-visible message
        message: String,
    },
    /// All state was cleared
    Reset,
}
