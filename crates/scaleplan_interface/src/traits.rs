//! Trait definitions for completion backends and their capabilities.

use async_trait::async_trait;
use scaleplan_core::{GenerateRequest, GenerateResponse};
use scaleplan_error::ScaleplanResult;
use std::sync::Arc;

/// Core trait that every completion backend implements.
///
/// One call is one chat completion: the request carries the full message
/// list, and the response carries whatever text the service produced.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Generate model output for a multimodal request.
    async fn generate(&self, req: &GenerateRequest) -> ScaleplanResult<GenerateResponse>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier used when the request does not override it.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D: CompletionDriver + ?Sized> CompletionDriver for Arc<D> {
    async fn generate(&self, req: &GenerateRequest) -> ScaleplanResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<D: CompletionDriver + ?Sized> CompletionDriver for Box<D> {
    async fn generate(&self, req: &GenerateRequest) -> ScaleplanResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
