//! Request and response bodies. All JSON keys are camelCase.

use scaleplan_core::EncodedImage;
use scaleplan_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};
use scaleplan_workflow::{ConversationHistory, ExtractedRecord, PromptValues, Turn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder values a client may send alongside any stage request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesBody {
    /// Featured brand
    pub brand: Option<String>,
    /// Product category
    pub category: Option<String>,
    /// Comparison brand
    pub competitor: Option<String>,
}

impl ValuesBody {
    pub(crate) fn values(&self) -> PromptValues {
        PromptValues::new(
            self.brand.clone(),
            self.category.clone(),
            self.competitor.clone(),
        )
    }
}

/// `POST /api/workflow/extract`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractBody {
    /// Encoded images
    pub images: Option<Vec<String>>,
    /// Older name for `images`
    pub screenshots: Option<Vec<String>>,
}

impl ExtractBody {
    pub(crate) fn images(&self) -> WorkflowResult<Vec<EncodedImage>> {
        parse_images(self.images.as_ref().or(self.screenshots.as_ref()))
    }
}

/// `POST /api/workflow/plan`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
    /// The structured record
    pub extracted_data: Option<Value>,
    /// Placeholder fallbacks
    #[serde(flatten)]
    pub values: ValuesBody,
}

/// One history turn as sent by a client; unknown roles are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryTurnBody {
    /// `user` or `assistant`
    pub role: Option<String>,
    /// Turn text
    pub content: Option<String>,
}

/// `POST /api/workflow/refine`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineBody {
    /// The structured record
    pub extracted_data: Option<Value>,
    /// Prior turns
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurnBody>,
    /// Reviewer feedback
    pub feedback: Option<String>,
    /// Placeholder fallbacks
    #[serde(flatten)]
    pub values: ValuesBody,
}

impl RefineBody {
    pub(crate) fn history(&self) -> ConversationHistory {
        self.conversation_history
            .iter()
            .filter_map(|turn| {
                let content = turn.content.as_deref().filter(|c| !c.trim().is_empty())?;
                match turn.role.as_deref() {
                    Some("user") => Some(Turn::user(content)),
                    Some("assistant") => Some(Turn::assistant(content)),
                    _ => None,
                }
            })
            .collect()
    }
}

/// `POST /api/workflow/evaluate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    /// Plan to fact-check
    pub plan_text: Option<String>,
    /// Placeholder fallbacks
    #[serde(flatten)]
    pub values: ValuesBody,
}

/// `POST /api/workflow/storyboard`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardBody {
    /// Approved plan
    pub plan_text: Option<String>,
    /// Its fact-check
    pub evaluation_text: Option<String>,
    /// Placeholder fallbacks
    #[serde(flatten)]
    pub values: ValuesBody,
}

/// `POST /api/sessions/{id}/start`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    /// Encoded images
    pub images: Option<Vec<String>>,
    /// Featured brand
    pub brand: Option<String>,
    /// Product category
    pub category: Option<String>,
    /// Comparison brand
    pub competitor: Option<String>,
}

impl StartBody {
    pub(crate) fn images(&self) -> WorkflowResult<Vec<EncodedImage>> {
        parse_images(self.images.as_ref())
    }
}

/// `POST /api/sessions/{id}/changes`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangesBody {
    /// Reviewer feedback
    pub feedback: Option<String>,
}

/// `{"output": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct OutputResponse {
    /// Generated text
    pub output: String,
}

/// Refine response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    /// Revised plan
    pub output: String,
    /// Soft gaps in the record
    pub warnings: Vec<String>,
    /// Data context sent to the model
    pub formatted_input: String,
}

/// Extraction metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractMetadata {
    /// Number of images read
    pub screenshots_processed: usize,
    /// RFC 3339 timestamp
    pub extraction_timestamp: String,
    /// Model that answered
    pub model_used: String,
}

/// Extract response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    /// The structured record
    pub extracted_data: ExtractedRecord,
    /// Extraction metadata
    pub metadata: ExtractMetadata,
}

/// `{"sessionId": ...}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    /// New session id
    pub session_id: String,
}

/// Requires a present, non-blank string field.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> WorkflowResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| WorkflowError::validation(format!("{} is required", field)))
}

/// Requires and parses `extractedData`.
pub(crate) fn required_record(value: &Option<Value>) -> WorkflowResult<ExtractedRecord> {
    match value {
        Some(value) if !value.is_null() => ExtractedRecord::from_json(value.clone()),
        _ => Err(WorkflowError::validation("extractedData is required")),
    }
}

fn parse_images(images: Option<&Vec<String>>) -> WorkflowResult<Vec<EncodedImage>> {
    let images = match images {
        Some(images) if !images.is_empty() => images,
        _ => return Err(WorkflowError::validation("at least one image is required")),
    };
    images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            EncodedImage::parse(image).map_err(|e| {
                let reason = match e.kind {
                    WorkflowErrorKind::Validation(reason) => reason,
                    other => other.to_string(),
                };
                WorkflowError::validation(format!("images[{}]: {}", i, reason))
            })
        })
        .collect()
}
