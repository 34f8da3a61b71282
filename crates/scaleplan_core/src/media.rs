//! Image sources and client-supplied image encodings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use scaleplan_error::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MediaSource {
    /// Remote image reachable by URL.
    Url(String),
    /// Base64-encoded image payload without a data-URL prefix.
    Base64(String),
}

/// A screenshot as supplied by a client, validated and split into MIME type and payload.
///
/// Accepts three encodings:
/// - `data:image/<kind>;base64,<payload>` data URLs
/// - bare base64 payloads of PNG, JPEG, GIF or WebP images
/// - `http://` or `https://` URLs
///
/// # Examples
///
/// ```
/// use scaleplan_core::{EncodedImage, MediaSource};
///
/// let image = EncodedImage::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
/// assert_eq!(image.mime().as_deref(), Some("image/png"));
/// assert_eq!(image.source(), &MediaSource::Base64("iVBORw0KGgo=".to_string()));
/// assert_eq!(image.to_url(), "data:image/png;base64,iVBORw0KGgo=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct EncodedImage {
    mime: Option<String>,
    source: MediaSource,
}

impl EncodedImage {
    /// Parses one client-supplied image string.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the string is empty, is a data URL that
    /// is not a base64 image, or is base64 of an unrecognized image format.
    pub fn parse(value: &str) -> WorkflowResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(WorkflowError::validation("image is empty"));
        }

        if value.starts_with("http://") || value.starts_with("https://") {
            return Ok(Self {
                mime: None,
                source: MediaSource::Url(value.to_string()),
            });
        }

        if let Some(rest) = value.strip_prefix("data:") {
            let (mime, payload) = rest
                .split_once(";base64,")
                .ok_or_else(|| WorkflowError::validation("data URL must be base64-encoded"))?;
            if !mime.starts_with("image/") {
                return Err(WorkflowError::validation(format!(
                    "unsupported media type: {}",
                    mime
                )));
            }
            if payload.is_empty() || !is_base64(payload) {
                return Err(WorkflowError::validation("data URL payload is not valid base64"));
            }
            return Ok(Self {
                mime: Some(mime.to_string()),
                source: MediaSource::Base64(payload.to_string()),
            });
        }

        if !is_base64(value) {
            return Err(WorkflowError::validation(
                "image must be a data URL, a base64 payload, or an http(s) URL",
            ));
        }
        let mime = sniff_mime(value)
            .ok_or_else(|| WorkflowError::validation("unrecognized image format"))?;
        Ok(Self {
            mime: Some(mime.to_string()),
            source: MediaSource::Base64(value.to_string()),
        })
    }

    /// Encodes raw image bytes read from disk.
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: Some(mime.into()),
            source: MediaSource::Base64(STANDARD.encode(bytes)),
        }
    }

    /// URL form accepted by chat-completion image parts.
    pub fn to_url(&self) -> String {
        match &self.source {
            MediaSource::Url(url) => url.clone(),
            MediaSource::Base64(payload) => format!(
                "data:{};base64,{}",
                self.mime.as_deref().unwrap_or("image/png"),
                payload
            ),
        }
    }

    /// Converts into a message content part.
    pub fn into_input(self) -> crate::Input {
        crate::Input::Image {
            mime: self.mime,
            source: self.source,
        }
    }
}

fn is_base64(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r'))
}

/// Guesses the MIME type from the leading base64 characters of well-known magic numbers.
fn sniff_mime(payload: &str) -> Option<&'static str> {
    if payload.starts_with("iVBORw0KGgo") {
        Some("image/png")
    } else if payload.starts_with("/9j/") {
        Some("image/jpeg")
    } else if payload.starts_with("R0lGOD") {
        Some("image/gif")
    } else if payload.starts_with("UklGR") {
        Some("image/webp")
    } else {
        None
    }
}
