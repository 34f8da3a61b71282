//! Error types for scaleplan.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use scaleplan_error::{ScaleplanResult, WorkflowError, WorkflowErrorKind};
//!
//! fn check_feedback(feedback: &str) -> ScaleplanResult<()> {
//!     if feedback.trim().is_empty() {
//!         Err(WorkflowError::new(WorkflowErrorKind::Validation(
//!             "feedback must not be empty".to_string(),
//!         )))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_feedback("   ").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod models;
mod workflow;

pub use config::ConfigError;
pub use error::{ScaleplanError, ScaleplanErrorKind, ScaleplanResult};
pub use http::HttpError;
pub use models::{ModelsError, ModelsErrorKind, ModelsResult};
pub use workflow::{WorkflowError, WorkflowErrorKind, WorkflowResult};
