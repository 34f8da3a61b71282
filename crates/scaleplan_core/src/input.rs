//! Input types for completion requests.

use crate::MediaSource;
use serde::{Deserialize, Serialize};

/// Content parts a message can carry.
///
/// # Examples
///
/// ```
/// use scaleplan_core::{Input, MediaSource};
///
/// let text = Input::Text("Summarize the screenshot.".to_string());
/// let image = Input::Image {
///     mime: Some("image/png".to_string()),
///     source: MediaSource::Base64("iVBORw0KGgo=".to_string()),
/// };
/// assert!(text.as_text().is_some());
/// assert!(image.as_text().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),

    /// Image input (PNG, JPEG, WebP, GIF).
    Image {
        /// MIME type, e.g., "image/png" or "image/jpeg"
        mime: Option<String>,
        /// Media source (URL or base64)
        source: MediaSource,
    },
}

impl Input {
    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::Image { .. } => None,
        }
    }

    /// Whether this part is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Input::Image { .. })
    }
}
