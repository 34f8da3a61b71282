//! Backend-held workflow sessions.
//!
//! Each session is locked for the whole of an action, and the action runs on
//! its own task. A second action while one is running is answered with 409
//! rather than queued.

use crate::dto::{ChangesBody, CreatedSession, StartBody, required};
use crate::error::ApiError;
use crate::state::{AppState, SessionEntry, SharedDriver};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use scaleplan_error::{WorkflowError, WorkflowResult};
use scaleplan_workflow::{ProjectBrief, Stage, WorkflowSession};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, instrument};
use uuid::Uuid;

type Guard = OwnedMutexGuard<WorkflowSession<SharedDriver>>;

/// `POST /api/sessions`
#[instrument(skip_all)]
pub(crate) async fn create(State(state): State<AppState>) -> (StatusCode, Json<CreatedSession>) {
    let id = state.create_session().await;
    info!(session_id = %id, "Session created");
    (
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id: id.to_string(),
        }),
    )
}

/// `GET /api/sessions/{id}`
///
/// While an action is running only the stage is reported.
#[instrument(skip(state))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    let snapshot = match entry.session.try_lock() {
        Ok(session) => snapshot(&id, &session),
        Err(_) => json!({
            "sessionId": id.to_string(),
            "busy": true,
            "stage": *entry.stage_rx.borrow(),
        }),
    };
    Ok(Json(snapshot))
}

/// `DELETE /api/sessions/{id}`
#[instrument(skip(state))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (id, _) = lookup(&state, &id).await?;
    state.remove_session(&id).await;
    info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/{id}/start`
#[instrument(skip(state, body))]
pub(crate) async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StartBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    let Json(body) = body?;
    let brief = ProjectBrief::new(
        required(&body.brand, "brand")?,
        required(&body.category, "category")?,
        body.competitor.clone(),
        body.images()?,
    )?;
    run(id, &entry, SessionAction::Start(brief)).await
}

/// `POST /api/sessions/{id}/changes`
#[instrument(skip(state, body))]
pub(crate) async fn changes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChangesBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    let Json(body) = body?;
    let feedback = required(&body.feedback, "feedback")?.to_string();
    run(id, &entry, SessionAction::Changes(feedback)).await
}

/// `POST /api/sessions/{id}/approve`
#[instrument(skip(state))]
pub(crate) async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    run(id, &entry, SessionAction::Approve).await
}

/// `POST /api/sessions/{id}/retry`
#[instrument(skip(state))]
pub(crate) async fn retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    run(id, &entry, SessionAction::Retry).await
}

/// `POST /api/sessions/{id}/reset`
#[instrument(skip(state))]
pub(crate) async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (id, entry) = lookup(&state, &id).await?;
    run(id, &entry, SessionAction::Reset).await
}

/// A user action on a session.
#[derive(Debug)]
enum SessionAction {
    Start(ProjectBrief),
    Changes(String),
    Approve,
    Retry,
    Reset,
}

impl SessionAction {
    async fn perform(self, session: &mut WorkflowSession<SharedDriver>) -> WorkflowResult<Stage> {
        match self {
            Self::Start(brief) => session.start(brief).await,
            Self::Changes(feedback) => session.request_changes(&feedback).await,
            Self::Approve => session.approve().await,
            Self::Retry => session.retry().await,
            Self::Reset => session.reset(),
        }
    }
}

/// Runs an action on its own task so a dropped request cannot stop it
/// halfway through the chain. The session stays locked until it finishes.
async fn run(
    id: Uuid,
    entry: &SessionEntry,
    action: SessionAction,
) -> Result<Json<Value>, ApiError> {
    let mut session = lock(entry)?;
    let task = tokio::spawn(async move {
        let stage = action.perform(&mut session).await?;
        info!(session_id = %id, stage = %stage, "Session action finished");
        Ok::<_, WorkflowError>(snapshot(&id, &session))
    });
    let snapshot = task.await.map_err(|e| {
        error!(session_id = %id, error = %e, "Session action task failed");
        ApiError::internal("Session action did not complete")
    })??;
    entry.touch();
    Ok(Json(snapshot))
}

async fn lookup(state: &AppState, raw_id: &str) -> Result<(Uuid, Arc<SessionEntry>), ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::session_not_found(raw_id))?;
    let entry = state
        .session(&id)
        .await
        .ok_or_else(|| ApiError::session_not_found(raw_id))?;
    entry.touch();
    Ok((id, entry))
}

fn lock(entry: &SessionEntry) -> Result<Guard, ApiError> {
    Arc::clone(&entry.session)
        .try_lock_owned()
        .map_err(|_| ApiError::busy())
}

fn snapshot(id: &Uuid, session: &WorkflowSession<SharedDriver>) -> Value {
    let mut value = serde_json::to_value(session.state()).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut value {
        map.insert("sessionId".to_string(), json!(id.to_string()));
        map.insert("busy".to_string(), json!(false));
    }
    value
}
