//! Workflow and stage handler errors.

/// Error conditions raised by stage handlers and the workflow state machine.
///
/// The first four variants are the stage taxonomy surfaced to users; the rest
/// are transition guard failures that never reach the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WorkflowErrorKind {
    /// Bad or missing input, rejected before any network call
    #[display("Validation failed: {}", _0)]
    Validation(String),

    /// Transport or service failure, message passed through verbatim
    #[display("{}", _0)]
    RemoteService(String),

    /// The service answered without any text
    #[display("The model returned an empty response")]
    EmptyCompletion,

    /// The extraction response parsed but is semantically incomplete
    #[display("Failed to parse extracted data: {}", reason)]
    MalformedExtraction {
        /// What was wrong with the response
        reason: String,
        /// The raw response text, kept for inspection
        raw: String,
    },

    /// An action was triggered from a stage that does not permit it
    #[display("Cannot {} while the workflow is {}", action, stage)]
    InvalidTransition {
        /// Stage the workflow was in
        stage: String,
        /// Action that was attempted
        action: String,
    },

    /// A second extraction was attempted before reset
    #[display("Structured data was already extracted for this session")]
    ExtractionAlreadySet,

    /// A later stage was requested before extraction succeeded
    #[display("No extracted data is available")]
    MissingExtraction,

    /// Retry was requested but nothing has failed
    #[display("There is no failed action to retry")]
    NothingToRetry,
}

impl WorkflowErrorKind {
    /// Whether this error was caused by the caller's input or timing rather
    /// than by the remote service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidTransition { .. }
                | Self::ExtractionAlreadySet
                | Self::MissingExtraction
                | Self::NothingToRetry
        )
    }

    /// Raw response text attached to a malformed extraction.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::MalformedExtraction { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Workflow error with location tracking.
///
/// # Examples
///
/// ```
/// use scaleplan_error::{WorkflowError, WorkflowErrorKind};
///
/// let err = WorkflowError::new(WorkflowErrorKind::EmptyCompletion);
/// assert!(format!("{}", err).contains("empty response"));
/// assert!(!err.kind.is_client_error());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Workflow Error: {} at line {} in {}", kind, line, file)]
pub struct WorkflowError {
    /// The specific error condition
    pub kind: WorkflowErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl WorkflowError {
    /// Create a new WorkflowError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a validation error.
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Validation(message.into()))
    }

    /// Shorthand for a transition guard failure.
    #[track_caller]
    pub fn invalid_transition(stage: impl ToString, action: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::InvalidTransition {
            stage: stage.to_string(),
            action: action.into(),
        })
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
