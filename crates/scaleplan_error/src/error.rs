//! Top-level error wrapper types.

use crate::{ConfigError, HttpError, ModelsError, WorkflowError};

/// Every error the workspace can produce.
///
/// # Examples
///
/// ```
/// use scaleplan_error::{ScaleplanError, HttpError};
///
/// let err: ScaleplanError = HttpError::new("Connection failed").into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ScaleplanErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Completion client error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Stage handler or state machine error
    #[from(WorkflowError)]
    Workflow(WorkflowError),
}

/// scaleplan error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Scaleplan Error: {}", _0)]
pub struct ScaleplanError(Box<ScaleplanErrorKind>);

impl ScaleplanError {
    /// Create a new error from a kind.
    pub fn new(kind: ScaleplanErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScaleplanErrorKind {
        &self.0
    }

    /// The workflow error kind, if this error came from a stage or transition.
    pub fn workflow_kind(&self) -> Option<&crate::WorkflowErrorKind> {
        match self.kind() {
            ScaleplanErrorKind::Workflow(err) => Some(&err.kind),
            _ => None,
        }
    }
}

impl<T> From<T> for ScaleplanError
where
    T: Into<ScaleplanErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for scaleplan operations.
pub type ScaleplanResult<T> = std::result::Result<T, ScaleplanError>;
