//! HTTP API for scaleplan.
//!
//! Two surfaces share one set of stage handlers:
//!
//! - **Stateless stage endpoints** under `/api/workflow`: the client holds the
//!   workflow state and sends whatever each stage needs.
//! - **Sessions** under `/api/sessions`: the server holds a
//!   [`WorkflowSession`](scaleplan_workflow::WorkflowSession) per id and the
//!   client only sends actions.
//!
//! # Example
//!
//! ```rust,ignore
//! use scaleplan_server::{AppState, serve};
//! use scaleplan_workflow::StageHandlers;
//!
//! let state = AppState::new(StageHandlers::new(driver));
//! serve(state, &settings.server).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dto;
mod error;
mod router;
mod sessions;
mod state;
mod stateless;

pub use dto::{
    ChangesBody, CreatedSession, EvaluateBody, ExtractBody, ExtractMetadata, ExtractResponse,
    HistoryTurnBody, OutputResponse, PlanBody, RefineBody, RefineResponse, StartBody,
    StoryboardBody, ValuesBody,
};
pub use error::ApiError;
pub use router::{router, serve};
pub use state::{AppState, SharedDriver};
