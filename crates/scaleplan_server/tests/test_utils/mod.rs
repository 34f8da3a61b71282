//! Test utilities for server tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use scaleplan_core::{GenerateRequest, GenerateResponse};
use scaleplan_error::{ModelsError, ModelsErrorKind, ScaleplanError, ScaleplanResult};
use scaleplan_interface::CompletionDriver;
use scaleplan_server::{AppState, router};
use scaleplan_workflow::{PromptTemplates, StageHandlers};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tower::ServiceExt;

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(ModelsErrorKind),
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn service_error(status: u16, message: &str) -> Self {
        Self::Error(ModelsErrorKind::Api {
            status,
            message: message.to_string(),
        })
    }
}

/// Replays scripted replies and records requests. Optionally holds each call
/// until released.
#[derive(Clone)]
pub struct ScriptedDriver {
    responses: Arc<Vec<MockResponse>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    gate: Option<Gate>,
}

/// Lets a test observe and release an in-flight call.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl ScriptedDriver {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn gated(responses: Vec<MockResponse>, gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(responses)
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> ScaleplanResult<GenerateResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(req.clone());
            requests.len() - 1
        };
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        match self.responses.get(index) {
            Some(MockResponse::Success(text)) => Ok(GenerateResponse::from_text(text.clone())),
            Some(MockResponse::Error(kind)) => {
                Err(ScaleplanError::from(ModelsError::new(kind.clone())))
            }
            None => Err(ScaleplanError::from(ModelsError::new(ModelsErrorKind::Http(
                "Mock sequence exhausted".to_string(),
            )))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Router over a scripted driver with short templates.
pub fn app(driver: &ScriptedDriver) -> Router {
    app_with_state(driver).0
}

/// Like [`app`], also returning the state the router shares.
pub fn app_with_state(driver: &ScriptedDriver) -> (Router, AppState) {
    let handlers = StageHandlers::with_settings(
        Arc::new(driver.clone()) as Arc<dyn CompletionDriver>,
        PromptTemplates::new("EXTRACT", "PLAN {Featured Brand}", "EVALUATE", "STORYBOARD"),
        Default::default(),
    );
    let state = AppState::new(handlers);
    (router(state.clone(), 1024 * 1024), state)
}

/// Polls the session until no action holds it, returning the last snapshot.
pub async fn wait_until_idle(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (_, body) = send(app, "GET", &format!("/api/sessions/{}", id), None).await;
        if body["busy"] == false {
            return body;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("session {} stayed busy", id);
}

/// Sends one request and returns the status and JSON body (`Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub const ACME_EXTRACTION: &str = r#"{
  "brand": {"name": "Acme", "category": "Toys"},
  "competitors": [{"name": "Rival"}],
  "platform_data": {"shopee": {"brand_metrics": {"followers": 19200}}}
}"#;

pub const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAA=";
