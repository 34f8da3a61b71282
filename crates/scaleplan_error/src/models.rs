//! Completion client errors.

/// Transport-level error conditions raised by a completion client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelsErrorKind {
    /// The request never produced an HTTP response
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// The service answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the service, or the status text
        message: String,
    },

    /// The response body could not be decoded
    #[display("Failed to parse response: {}", _0)]
    ResponseParsing(String),

    /// The API key environment variable is not set
    #[display("API key not set: {}", _0)]
    MissingApiKey(String),

    /// A request or response value could not be assembled
    #[display("Builder error: {}", _0)]
    Builder(String),
}

/// Completion client error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Result type for completion client operations.
pub type ModelsResult<T> = Result<T, ModelsError>;
