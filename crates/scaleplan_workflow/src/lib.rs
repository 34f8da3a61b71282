//! Stage handlers and workflow state machine for scaleplan.
//!
//! A session turns storefront screenshots into a reviewed action plan in
//! four remote calls:
//!
//! 1. **Extract**: screenshots → [`ExtractedRecord`] (JSON mode)
//! 2. **Plan**: record + [`ConversationHistory`] → plan text, repeated for each refinement
//! 3. **Evaluate**: plan → fact-check text
//! 4. **Storyboard**: plan + fact-check → slide storyboard
//!
//! [`StageHandlers`] make the calls. [`WorkflowMachine`] owns the
//! [`WorkflowState`] and guards every transition. [`WorkflowSession`] chains
//! the two so a user only ever submits, refines, approves, retries or resets.
//!
//! # Example
//!
//! ```rust,ignore
//! use scaleplan_workflow::{ProjectBrief, StageHandlers, WorkflowSession, Stage};
//! use std::sync::Arc;
//!
//! let handlers = Arc::new(StageHandlers::new(client));
//! let (mut session, _stage_rx) = WorkflowSession::new(handlers);
//! let brief = ProjectBrief::new("Acme", "Toys", None, images)?;
//! if session.start(brief).await? == Stage::AwaitingApproval {
//!     session.approve().await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod history;
mod machine;
mod prompts;
mod record;
mod render;
mod session;
mod stages;

pub use history::{ConversationHistory, EntryKind, Speaker, Transcript, TranscriptEntry, Turn};
pub use machine::{
    Failure, ProjectBrief, Stage, WorkflowCommand, WorkflowEvent, WorkflowMachine, WorkflowState,
};
pub use prompts::{
    BRAND_PLACEHOLDER, CATEGORY_PLACEHOLDER, COMPETITOR_PLACEHOLDER, PLACEHOLDERS,
    PLAN_SYSTEM_INSTRUCTION, PromptTemplates, PromptValues, fill_prompt,
};
pub use record::{
    BrandIdentity, BrandMetrics, Competitor, CompetitorMetrics, Content, DataQuality,
    ExtractedRecord, PlatformData, Pricing, Promotions, parse_extraction,
};
pub use render::{NOT_VISIBLE, render_data_context};
pub use session::WorkflowSession;
pub use stages::{PlanMode, REFINE_PREFIX, StageHandlers};
