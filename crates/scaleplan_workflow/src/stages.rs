//! Stage handlers: one remote completion call per workflow stage.
//!
//! Handlers are stateless. They validate their input, assemble the message
//! list, make exactly one call and convert the result. They never retry.

use crate::history::{ConversationHistory, Speaker};
use crate::prompts::{PLAN_SYSTEM_INSTRUCTION, PromptTemplates, PromptValues, fill_prompt};
use crate::record::{ExtractedRecord, parse_extraction};
use crate::render::render_data_context;
use scaleplan_core::{EncodedImage, GenerateRequest, Message, StageOptions, StageSettings};
use scaleplan_error::{
    ScaleplanError, ScaleplanErrorKind, WorkflowError, WorkflowErrorKind, WorkflowResult,
};
use scaleplan_interface::CompletionDriver;
use tracing::{debug, error, instrument};

/// Prefix of the trailing message sent when refining a plan.
pub const REFINE_PREFIX: &str = "Please revise the plan based on this feedback:\n\n";

/// Separator between the evaluation instruction and the plan.
const PLAN_TO_EVALUATE: &str = "=== PLAN TO EVALUATE ===";
/// Separator between the storyboard instruction and the plan.
const APPROVED_PLAN: &str = "=== APPROVED PLAN ===";
/// Separator between the plan and its evaluation.
const EVALUATION: &str = "=== EVALUATION ===";

/// Whether a plan call drafts from scratch or revises after feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanMode {
    /// First draft
    Initial,
    /// Revision driven by reviewer feedback
    Refine(String),
}

/// The four stage handlers sharing one completion driver.
pub struct StageHandlers<D: CompletionDriver> {
    driver: D,
    templates: PromptTemplates,
    stages: StageSettings,
}

impl<D: CompletionDriver> StageHandlers<D> {
    /// Handlers with the built-in templates and default stage parameters.
    pub fn new(driver: D) -> Self {
        Self::with_settings(driver, PromptTemplates::default(), StageSettings::default())
    }

    /// Handlers with explicit templates and stage parameters.
    pub fn with_settings(driver: D, templates: PromptTemplates, stages: StageSettings) -> Self {
        Self {
            driver,
            templates,
            stages,
        }
    }

    /// The underlying completion driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The instruction templates in use.
    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// Reads storefront screenshots into a structured record.
    ///
    /// Sends every image followed by the extraction instruction in a single
    /// user message and asks for a JSON object.
    ///
    /// # Errors
    ///
    /// - `Validation` when `images` is empty
    /// - `RemoteService` or `EmptyCompletion` when the call fails
    /// - `MalformedExtraction` when the response lacks `brand` or `platform_data`
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub async fn extract(&self, images: &[EncodedImage]) -> WorkflowResult<ExtractedRecord> {
        if images.is_empty() {
            return Err(WorkflowError::validation("at least one image is required"));
        }

        let messages = vec![Message::user_with_images(
            self.templates.extraction().as_str(),
            images,
        )];
        let raw = self
            .complete("extraction", messages, self.stages.extraction, true)
            .await?;
        parse_extraction(&raw)
    }

    /// Drafts or revises the action plan.
    ///
    /// Messages: the plan system instruction, the rendered data context
    /// followed by the filled plan template, every history turn with text,
    /// then for refinements the feedback request. A trailing user turn equal
    /// to the feedback is not replayed twice.
    ///
    /// # Errors
    ///
    /// - `Validation` when refinement feedback is blank
    /// - `RemoteService` or `EmptyCompletion` when the call fails
    #[instrument(skip_all, fields(history = history.len(), refine = matches!(mode, PlanMode::Refine(_))))]
    pub async fn plan(
        &self,
        record: &ExtractedRecord,
        history: &ConversationHistory,
        values: &PromptValues,
        mode: &PlanMode,
    ) -> WorkflowResult<String> {
        let feedback = match mode {
            PlanMode::Initial => None,
            PlanMode::Refine(feedback) if feedback.trim().is_empty() => {
                return Err(WorkflowError::validation("feedback must not be empty"));
            }
            PlanMode::Refine(feedback) => Some(feedback.trim()),
        };

        let data_context = render_data_context(record);
        let instruction = fill_prompt(self.templates.plan(), values);
        debug!(
            data_context_len = data_context.len(),
            instruction_len = instruction.len(),
            "Assembled plan context"
        );

        let mut messages = vec![
            Message::system(PLAN_SYSTEM_INSTRUCTION),
            Message::user(format!("{}\n\n{}", data_context, instruction)),
        ];

        let mut turns = history.turns();
        if let (Some(feedback), Some(last)) = (feedback, turns.last()) {
            if last.speaker == Speaker::User && last.text.trim() == feedback {
                turns = &turns[..turns.len() - 1];
            }
        }
        messages.extend(
            turns
                .iter()
                .filter(|turn| !turn.text.trim().is_empty())
                .map(|turn| match turn.speaker {
                    Speaker::User => Message::user(turn.text.as_str()),
                    Speaker::Assistant => Message::assistant(turn.text.as_str()),
                }),
        );

        if let Some(feedback) = feedback {
            messages.push(Message::user(format!("{}{}", REFINE_PREFIX, feedback)));
        }

        self.complete("plan", messages, self.stages.plan, false).await
    }

    /// Fact-checks a plan. No history is sent.
    ///
    /// # Errors
    ///
    /// - `Validation` when `plan` is blank
    /// - `RemoteService` or `EmptyCompletion` when the call fails
    #[instrument(skip_all, fields(plan_len = plan.len()))]
    pub async fn evaluate(&self, plan: &str, values: &PromptValues) -> WorkflowResult<String> {
        if plan.trim().is_empty() {
            return Err(WorkflowError::validation("planText is required"));
        }
        let instruction = fill_prompt(self.templates.evaluation(), values);
        let content = format!("{}\n\n{}\n{}", instruction, PLAN_TO_EVALUATE, plan);
        self.complete(
            "evaluation",
            vec![Message::user(content)],
            self.stages.evaluation,
            false,
        )
        .await
    }

    /// Builds the slide storyboard from an approved plan and its evaluation.
    ///
    /// # Errors
    ///
    /// - `Validation` when either text is blank
    /// - `RemoteService` or `EmptyCompletion` when the call fails
    #[instrument(skip_all, fields(plan_len = plan.len(), evaluation_len = evaluation.len()))]
    pub async fn storyboard(
        &self,
        plan: &str,
        evaluation: &str,
        values: &PromptValues,
    ) -> WorkflowResult<String> {
        if plan.trim().is_empty() {
            return Err(WorkflowError::validation("planText is required"));
        }
        if evaluation.trim().is_empty() {
            return Err(WorkflowError::validation("evaluationText is required"));
        }
        let instruction = fill_prompt(self.templates.storyboard(), values);
        let content = format!(
            "{}\n\n{}\n{}\n\n{}\n{}",
            instruction, APPROVED_PLAN, plan, EVALUATION, evaluation
        );
        self.complete(
            "storyboard",
            vec![Message::user(content)],
            self.stages.storyboard,
            false,
        )
        .await
    }

    async fn complete(
        &self,
        stage: &'static str,
        messages: Vec<Message>,
        options: StageOptions,
        json_response: bool,
    ) -> WorkflowResult<String> {
        let request = GenerateRequest::builder()
            .messages(messages)
            .max_tokens(options.max_tokens)
            .temperature(options.temperature)
            .json_response(json_response)
            .build()
            .map_err(|e| {
                WorkflowError::new(WorkflowErrorKind::RemoteService(format!(
                    "Failed to build request: {}",
                    e
                )))
            })?;

        let response = self.driver.generate(&request).await.map_err(|e| {
            error!(stage, provider = self.driver.provider_name(), error = %e, "Completion failed");
            remote_error(e)
        })?;

        let text = response.text();
        if text.trim().is_empty() {
            error!(stage, "Completion returned no text");
            return Err(WorkflowError::new(WorkflowErrorKind::EmptyCompletion));
        }
        debug!(stage, response_len = text.len(), "Completion received");
        Ok(text)
    }
}

/// Converts a driver failure into the stage taxonomy, keeping the service's message.
fn remote_error(err: ScaleplanError) -> WorkflowError {
    match err.kind() {
        ScaleplanErrorKind::Workflow(inner) => inner.clone(),
        ScaleplanErrorKind::Models(inner) => {
            WorkflowError::new(WorkflowErrorKind::RemoteService(inner.kind.to_string()))
        }
        other => WorkflowError::new(WorkflowErrorKind::RemoteService(other.to_string())),
    }
}
