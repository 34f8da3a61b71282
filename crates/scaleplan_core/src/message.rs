//! Message types for conversations.

use crate::{EncodedImage, Input, Role};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A single message in a multi-turn conversation.
///
/// # Examples
///
/// ```
/// use scaleplan_core::{Message, Role};
///
/// let message = Message::user("Please revise the plan.");
/// assert_eq!(message.role(), &Role::User);
/// assert_eq!(message.text(), "Please revise the plan.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// The content of the message
    content: Vec<Input>,
}

impl Message {
    /// Creates a message from its parts.
    pub fn new(role: Role, content: Vec<Input>) -> Self {
        Self { role, content }
    }

    /// Creates a text-only system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Input::Text(text.into())])
    }

    /// Creates a text-only user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Input::Text(text.into())])
    }

    /// Creates a text-only assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![Input::Text(text.into())])
    }

    /// Creates a user message with one part per image, in order, followed by the text part.
    pub fn user_with_images(text: impl Into<String>, images: &[EncodedImage]) -> Self {
        let mut content: Vec<Input> = images
            .iter()
            .cloned()
            .map(EncodedImage::into_input)
            .collect();
        content.push(Input::Text(text.into()));
        Self::new(Role::User, content)
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(Input::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part is an image.
    pub fn has_images(&self) -> bool {
        self.content.iter().any(Input::is_image)
    }
}
