//! scaleplan: storefront screenshots in, reviewed growth plan and slide storyboard out.
//!
//! A brand manager uploads screenshots of their shop and a competitor's. A
//! vision model reads them into a structured record, a second call drafts a
//! prioritized action plan, the manager refines it in conversation, and once
//! approved the plan is fact-checked and turned into a slide storyboard.
//!
//! # Architecture
//!
//! - `scaleplan_error` - error types
//! - `scaleplan_core` - messages, requests, images and layered settings
//! - `scaleplan_interface` - the [`CompletionDriver`] trait
//! - `scaleplan_models` - OpenAI-compatible completion client
//! - `scaleplan_workflow` - prompts, stage handlers and the workflow state machine
//! - `scaleplan_server` - HTTP endpoints for stateless stages and backend sessions
//!
//! This crate re-exports everything for convenience and ships the `scaleplan` binary.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scaleplan::{ProjectBrief, Settings, Stage, WorkflowSession, build_handlers, load_screenshot};
//! use std::sync::Arc;
//!
//! let settings = Settings::load()?;
//! let handlers = Arc::new(build_handlers(&settings)?);
//! let (mut session, _stage_rx) = WorkflowSession::new(handlers);
//! let images = vec![load_screenshot("shop.png")?];
//! let brief = ProjectBrief::new("Acme", "Toys", None, images)?;
//! if session.start(brief).await? == Stage::AwaitingApproval {
//!     session.approve().await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod wizard;

pub use app::build_handlers;
pub use wizard::{
    FACT_CHECK_FILE, PLAN_FILE, RECORD_FILE, ReviewDecision, STORYBOARD_FILE, load_screenshot,
    mime_for_path, write_deliverables,
};

pub use scaleplan_core::*;
pub use scaleplan_error::*;
pub use scaleplan_interface::*;
pub use scaleplan_models::*;
pub use scaleplan_server::{ApiError, AppState, SharedDriver, router, serve};
pub use scaleplan_workflow::*;
