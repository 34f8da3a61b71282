//! Output types for completion responses.

use serde::{Deserialize, Serialize};

/// Supported output types from the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Structured JSON output.
    Json(serde_json::Value),
}
