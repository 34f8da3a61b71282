//! The workflow aggregate and its stage enum.

use crate::history::{ConversationHistory, Transcript};
use crate::prompts::PromptValues;
use crate::record::ExtractedRecord;
use derive_getters::Getters;
use scaleplan_core::EncodedImage;
use scaleplan_error::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};

/// Workflow stage. Exactly one at a time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Screenshots are being prepared
    Uploading,
    /// Screenshots are being read into a structured record
    ExtractingData,
    /// A plan is being drafted or revised
    GeneratingPlan,
    /// Waiting for the reviewer to approve or request changes
    AwaitingApproval,
    /// The approved plan is being fact-checked
    FactChecking,
    /// The slide storyboard is being generated
    GeneratingPresentation,
    /// Every deliverable is ready
    Complete,
    /// The last action failed; retry or reset
    Failed,
}

impl Stage {
    /// Position on the success path. `Failed` has none.
    pub fn ordinal(self) -> Option<u8> {
        match self {
            Self::Idle => Some(0),
            Self::Uploading => Some(1),
            Self::ExtractingData => Some(2),
            Self::GeneratingPlan => Some(3),
            Self::AwaitingApproval => Some(4),
            Self::FactChecking => Some(5),
            Self::GeneratingPresentation => Some(6),
            Self::Complete => Some(7),
            Self::Failed => None,
        }
    }

    /// Whether a remote call is made while in this stage.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            Self::Uploading
                | Self::ExtractingData
                | Self::GeneratingPlan
                | Self::FactChecking
                | Self::GeneratingPresentation
        )
    }
}

/// What the user submitted to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ProjectBrief {
    /// Featured brand
    brand: String,
    /// Product category
    category: String,
    /// Comparison brand, if named up front
    competitor: Option<String>,
    /// Storefront screenshots; never serialized
    #[serde(skip)]
    images: Vec<EncodedImage>,
}

impl ProjectBrief {
    /// Validates and builds a brief.
    ///
    /// # Errors
    ///
    /// Returns a validation error when there are no images or the brand or
    /// category is blank.
    pub fn new(
        brand: impl Into<String>,
        category: impl Into<String>,
        competitor: Option<String>,
        images: Vec<EncodedImage>,
    ) -> WorkflowResult<Self> {
        let brand = brand.into().trim().to_string();
        let category = category.into().trim().to_string();
        if images.is_empty() {
            return Err(WorkflowError::validation("at least one image is required"));
        }
        if brand.is_empty() {
            return Err(WorkflowError::validation("brand is required"));
        }
        if category.is_empty() {
            return Err(WorkflowError::validation("category is required"));
        }
        Ok(Self {
            brand,
            category,
            competitor: competitor
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            images,
        })
    }

    /// Placeholder values taken from the brief.
    pub fn prompt_values(&self) -> PromptValues {
        PromptValues::new(
            Some(self.brand.clone()),
            Some(self.category.clone()),
            self.competitor.clone(),
        )
    }
}

/// Why the workflow stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Failure {
    /// Stage whose action failed; retry resumes here
    stage: Stage,
    /// User-visible message
    message: String,
    /// Raw response text for malformed extractions
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

impl Failure {
    pub(crate) fn new(stage: Stage, error: &WorkflowError) -> Self {
        Self {
            stage,
            message: error.kind.to_string(),
            raw: error.kind.raw().map(str::to_string),
        }
    }
}

/// Everything a session has accumulated.
///
/// Mutated only by [`WorkflowMachine`](super::WorkflowMachine).
#[derive(Debug, Clone, Default, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Current stage
    pub(super) stage: Stage,
    /// Submitted brief
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) brief: Option<ProjectBrief>,
    /// Structured record; set at most once between resets
    #[serde(rename = "extractedData", skip_serializing_if = "Option::is_none")]
    pub(super) extracted: Option<ExtractedRecord>,
    /// Latest plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) plan_text: Option<String>,
    /// Fact-check of the approved plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) fact_check_text: Option<String>,
    /// Slide storyboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) storyboard_text: Option<String>,
    /// Turns replayed on refinement
    #[serde(rename = "conversationHistory")]
    pub(super) history: ConversationHistory,
    /// UI log
    pub(super) transcript: Transcript,
    /// Set while in [`Stage::Failed`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) failure: Option<Failure>,
}

impl WorkflowState {
    /// Placeholder values: the record first, then the brief.
    pub fn prompt_values(&self) -> PromptValues {
        let from_record = self
            .extracted
            .as_ref()
            .map(ExtractedRecord::prompt_values)
            .unwrap_or_default();
        match &self.brief {
            Some(brief) => from_record.or(&brief.prompt_values()),
            None => from_record,
        }
    }
}
