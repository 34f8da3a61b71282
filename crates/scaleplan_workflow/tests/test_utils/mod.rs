//! Test utilities for workflow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use scaleplan_core::{EncodedImage, GenerateRequest, GenerateResponse};
use scaleplan_error::{ModelsError, ModelsErrorKind, ScaleplanError, ScaleplanResult};
use scaleplan_interface::CompletionDriver;
use std::sync::{Arc, Mutex};

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with this text
    Success(String),
    /// Fail with this transport error
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

/// Completion driver that replays a fixed sequence of replies and records
/// every request it receives.
#[derive(Clone)]
pub struct ScriptedDriver {
    responses: Arc<Vec<MockResponse>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedDriver {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times generate() was called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> GenerateRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was made")
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
        match self.responses.get(index) {
            Some(MockResponse::Success(text)) => Ok(GenerateResponse::from_text(text.clone())),
            Some(MockResponse::Error(kind)) => Err(ScaleplanError::from(ModelsError::new(kind.clone()))),
            None => Err(ScaleplanError::from(ModelsError::new(ModelsErrorKind::Http(
                format!(
                    "Mock sequence exhausted (call {} beyond {} responses)",
                    index + 1,
                    self.responses.len()
                ),
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

/// A minimal extraction response with one Shopee entry.
pub const ACME_EXTRACTION: &str = r#"{
  "extraction_metadata": {"screenshots_processed": 2, "platforms_identified": ["shopee"]},
  "brand": {"name": "Acme", "category": "Toys"},
  "competitors": [{"name": "Rival", "relationship": "Primary competitor"}],
  "platform_data": {
    "shopee": {
      "brand_metrics": {
        "shop_name": "Acme Official",
        "followers": "19,200",
        "reviews_count": 5400,
        "avg_rating": 4.8,
        "shop_badge": "Mall",
        "pricing": {"average_final_price": 1299.5},
        "promotions": {"vouchers_active": 3, "voucher_examples": ["₱50 off"], "non_voucher_promos": []},
        "content": {"shopee_videos_count": 12, "live_sessions_count": 4}
      },
      "competitor_metrics": {"competitor_name": "Rival", "followers": 250000, "reviews_count": 12000, "avg_rating": 4.9}
    }
  },
  "competitive_insights": ["Rival has 13x the followers"],
  "data_quality": {"completeness": "Medium", "missing_data_notes": "No Lazada screenshots", "confidence_level": "High"}
}"#;

/// Two tiny PNG payloads.
pub fn two_images() -> Vec<EncodedImage> {
    vec![
        EncodedImage::parse("data:image/png;base64,iVBORw0KGgoAAAA=").unwrap(),
        EncodedImage::parse("iVBORw0KGgoBBBB").unwrap(),
    ]
}
