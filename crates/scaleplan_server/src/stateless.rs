//! Stateless stage endpoints: each request carries everything its stage needs.

use crate::dto::{
    EvaluateBody, ExtractBody, ExtractMetadata, ExtractResponse, OutputResponse, PlanBody,
    RefineBody, RefineResponse, StoryboardBody, required, required_record,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use scaleplan_interface::CompletionDriver;
use scaleplan_workflow::{ConversationHistory, PlanMode, render_data_context};
use tracing::{info, instrument};

/// `POST /api/workflow/extract`
#[instrument(skip_all)]
pub(crate) async fn extract(
    State(state): State<AppState>,
    body: Result<Json<ExtractBody>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(body) = body?;
    let images = body.images()?;

    let record = state.handlers().extract(&images).await?;
    info!(
        screenshots = images.len(),
        platforms = record.platform_data().len(),
        "Extraction complete"
    );
    Ok(Json(ExtractResponse {
        extracted_data: record,
        metadata: ExtractMetadata {
            screenshots_processed: images.len(),
            extraction_timestamp: Utc::now().to_rfc3339(),
            model_used: state.handlers().driver().model_name().to_string(),
        },
    }))
}

/// `POST /api/workflow/plan`
#[instrument(skip_all)]
pub(crate) async fn plan(
    State(state): State<AppState>,
    body: Result<Json<PlanBody>, JsonRejection>,
) -> Result<Json<OutputResponse>, ApiError> {
    let Json(body) = body?;
    let record = required_record(&body.extracted_data)?;
    record.check_plan_ready()?;

    let values = record.prompt_values().or(&body.values.values());
    let output = state
        .handlers()
        .plan(
            &record,
            &ConversationHistory::new(),
            &values,
            &PlanMode::Initial,
        )
        .await?;
    Ok(Json(OutputResponse { output }))
}

/// `POST /api/workflow/refine`
#[instrument(skip_all)]
pub(crate) async fn refine(
    State(state): State<AppState>,
    body: Result<Json<RefineBody>, JsonRejection>,
) -> Result<Json<RefineResponse>, ApiError> {
    let Json(body) = body?;
    let record = required_record(&body.extracted_data)?;
    record.check_plan_ready()?;
    let feedback = required(&body.feedback, "feedback")?;

    let values = record.prompt_values().or(&body.values.values());
    let output = state
        .handlers()
        .plan(
            &record,
            &body.history(),
            &values,
            &PlanMode::Refine(feedback.to_string()),
        )
        .await?;
    Ok(Json(RefineResponse {
        output,
        warnings: record.warnings(),
        formatted_input: render_data_context(&record),
    }))
}

/// `POST /api/workflow/evaluate`
#[instrument(skip_all)]
pub(crate) async fn evaluate(
    State(state): State<AppState>,
    body: Result<Json<EvaluateBody>, JsonRejection>,
) -> Result<Json<OutputResponse>, ApiError> {
    let Json(body) = body?;
    let plan = required(&body.plan_text, "planText")?;
    let output = state
        .handlers()
        .evaluate(plan, &body.values.values())
        .await?;
    Ok(Json(OutputResponse { output }))
}

/// `POST /api/workflow/storyboard`
#[instrument(skip_all)]
pub(crate) async fn storyboard(
    State(state): State<AppState>,
    body: Result<Json<StoryboardBody>, JsonRejection>,
) -> Result<Json<OutputResponse>, ApiError> {
    let Json(body) = body?;
    let plan = required(&body.plan_text, "planText")?;
    let evaluation = required(&body.evaluation_text, "evaluationText")?;
    let output = state
        .handlers()
        .storyboard(plan, evaluation, &body.values.values())
        .await?;
    Ok(Json(OutputResponse { output }))
}
