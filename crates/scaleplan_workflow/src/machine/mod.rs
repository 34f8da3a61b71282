//! Workflow state machine.
//!
//! [`WorkflowMachine`] is the only place workflow state changes. It owns the
//! [`WorkflowState`], validates each [`WorkflowCommand`] against the current
//! stage, emits [`WorkflowEvent`]s and broadcasts the stage on a watch
//! channel. It makes no remote calls; [`WorkflowSession`](crate::WorkflowSession)
//! drives the stage handlers and feeds their results back in.

mod commands;
mod events;
mod state;

pub use commands::WorkflowCommand;
pub use events::WorkflowEvent;
pub use state::{Failure, ProjectBrief, Stage, WorkflowState};

use crate::history::Turn;
use scaleplan_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

const MSG_PREPARING: &str = "🚀 Converting screenshots and preparing data...";
const MSG_EXTRACTING: &str = "🔎 Extracting data from screenshots...";
const MSG_GENERATING_PLAN: &str = "🤖 Generating your Built to Scale™ Quick Win Action Plan...";
const MSG_REFINING_PLAN: &str = "🤖 Refining your plan...";
const MSG_PLAN_READY: &str = "✅ Plan generated! Please review and approve or request changes.";
const MSG_PLAN_REFINED: &str = "✅ Plan refined! Please review again.";
const MSG_APPROVED: &str =
    "✅ Plan approved. Proceeding with fact-check and presentation generation.";
const MSG_FACT_CHECKING: &str = "🔍 Running evidence-based fact check...";
const MSG_STORYBOARDING: &str = "📊 Generating presentation guide...";
const MSG_COMPLETE: &str = "🎉 All stages complete! Your Built to Scale™ deliverables are ready.";

/// Owns workflow state and applies commands to it.
pub struct WorkflowMachine {
    state: WorkflowState,
    /// Feedback of a refinement that has not produced a plan yet.
    pending_feedback: Option<String>,
    stage_tx: watch::Sender<Stage>,
}

impl WorkflowMachine {
    /// Creates an idle machine and a receiver that observes its stage.
    pub fn new() -> (Self, watch::Receiver<Stage>) {
        let (stage_tx, stage_rx) = watch::channel(Stage::Idle);
        let machine = Self {
            state: WorkflowState::default(),
            pending_feedback: None,
            stage_tx,
        };
        (machine, stage_rx)
    }

    /// Current state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// Feedback awaiting a revised plan, if a refinement is underway or failed.
    pub fn pending_feedback(&self) -> Option<&str> {
        self.pending_feedback.as_deref()
    }

    /// Another receiver for stage changes.
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.stage_tx.subscribe()
    }

    /// Applies one command.
    ///
    /// On error nothing changes.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` when the current stage does not permit the command
    /// - `ExtractionAlreadySet` for a second extraction before reset
    /// - `MissingExtraction` when a plan is requested with no record
    /// - `NothingToRetry` for a retry outside `Failed`
    /// - `Validation` for blank feedback
    #[instrument(skip_all, fields(command = command.name(), stage = %self.state.stage))]
    pub fn apply(&mut self, command: WorkflowCommand) -> WorkflowResult<Vec<WorkflowEvent>> {
        let from = self.state.stage;
        let events = self.apply_internal(command)?;

        for event in &events {
            match event {
                WorkflowEvent::StageChanged { from, to } => {
                    info!(stage_from = %from, stage_to = %to, "Stage changed")
                }
                WorkflowEvent::FailureRecorded { stage, message } => {
                    error!(stage = %stage, message = %message, "Stage failed")
                }
                other => debug!(event = ?other, "Workflow event"),
            }
        }

        if self.state.stage != from {
            self.stage_tx.send_replace(self.state.stage);
        }
        Ok(events)
    }

    fn apply_internal(&mut self, command: WorkflowCommand) -> WorkflowResult<Vec<WorkflowEvent>> {
        use WorkflowCommand::*;

        let action = command.name();
        let stage = self.state.stage;
        match command {
            Begin { brief } => {
                self.require(Stage::Idle, action)?;
                self.state.brief = Some(brief);
                self.state.transcript.system(MSG_PREPARING);
                Ok(vec![self.transition(Stage::Uploading)])
            }

            BeginExtraction => {
                self.require(Stage::Uploading, action)?;
                if self.state.extracted.is_some() {
                    return Err(WorkflowError::new(WorkflowErrorKind::ExtractionAlreadySet));
                }
                self.state.transcript.system(MSG_EXTRACTING);
                Ok(vec![self.transition(Stage::ExtractingData)])
            }

            ExtractionSucceeded { record } => {
                if self.state.extracted.is_some() {
                    return Err(WorkflowError::new(WorkflowErrorKind::ExtractionAlreadySet));
                }
                self.require(Stage::ExtractingData, action)?;
                let platforms: Vec<&str> =
                    record.platform_data().keys().map(String::as_str).collect();
                let summary = format!(
                    "📋 Extracted data for {} ({}).",
                    record.brand().name.as_deref().unwrap_or("the brand"),
                    if platforms.is_empty() {
                        "no platforms".to_string()
                    } else {
                        platforms.join(", ")
                    }
                );
                let platforms = platforms.len();
                self.state.transcript.assistant(summary);
                self.state.transcript.system(MSG_GENERATING_PLAN);
                self.state.extracted = Some(record);
                Ok(vec![
                    WorkflowEvent::ExtractionStored { platforms },
                    self.transition(Stage::GeneratingPlan),
                ])
            }

            PlanSucceeded { text } => {
                self.require(Stage::GeneratingPlan, action)?;
                if self.state.extracted.is_none() {
                    return Err(WorkflowError::new(WorkflowErrorKind::MissingExtraction));
                }
                let revision = self.state.plan_text.is_some();
                self.state.history.push(Turn::assistant(text.as_str()));
                self.state.transcript.assistant(text.as_str());
                self.state.transcript.system(if self.pending_feedback.take().is_some() {
                    MSG_PLAN_REFINED
                } else {
                    MSG_PLAN_READY
                });
                self.state.plan_text = Some(text);
                Ok(vec![
                    WorkflowEvent::PlanStored { revision },
                    WorkflowEvent::HistoryAppended {
                        len: self.state.history.len(),
                    },
                    self.transition(Stage::AwaitingApproval),
                ])
            }

            RequestChanges { feedback } => {
                self.require(Stage::AwaitingApproval, action)?;
                let feedback = feedback.trim();
                if feedback.is_empty() {
                    return Err(WorkflowError::validation("feedback must not be empty"));
                }
                self.state.history.push(Turn::user(feedback));
                self.state
                    .transcript
                    .user(format!("📝 Refinement requested:\n\n{}", feedback));
                self.state.transcript.system(MSG_REFINING_PLAN);
                self.pending_feedback = Some(feedback.to_string());
                Ok(vec![
                    WorkflowEvent::HistoryAppended {
                        len: self.state.history.len(),
                    },
                    self.transition(Stage::GeneratingPlan),
                ])
            }

            Approve => {
                self.require(Stage::AwaitingApproval, action)?;
                self.state.transcript.user(MSG_APPROVED);
                self.state.transcript.system(MSG_FACT_CHECKING);
                Ok(vec![self.transition(Stage::FactChecking)])
            }

            FactCheckSucceeded { text } => {
                self.require(Stage::FactChecking, action)?;
                self.state
                    .transcript
                    .assistant(format!("**Fact Check Complete:**\n\n{}", text));
                self.state.transcript.system(MSG_STORYBOARDING);
                self.state.fact_check_text = Some(text);
                Ok(vec![
                    WorkflowEvent::FactCheckStored,
                    self.transition(Stage::GeneratingPresentation),
                ])
            }

            StoryboardSucceeded { text } => {
                self.require(Stage::GeneratingPresentation, action)?;
                self.state
                    .transcript
                    .assistant(format!("**Presentation Guide:**\n\n{}", text));
                self.state.transcript.system(MSG_COMPLETE);
                self.state.storyboard_text = Some(text);
                Ok(vec![
                    WorkflowEvent::StoryboardStored,
                    self.transition(Stage::Complete),
                ])
            }

            StageFailed { error } => {
                if !stage.is_working() {
                    return Err(WorkflowError::invalid_transition(stage, action));
                }
                let failure = Failure::new(stage, &error);
                let message = failure.message().clone();
                self.state
                    .transcript
                    .system(format!("❌ Error: {}", message));
                self.state.failure = Some(failure);
                Ok(vec![
                    WorkflowEvent::FailureRecorded { stage, message },
                    self.transition(Stage::Failed),
                ])
            }

            Retry => {
                if stage != Stage::Failed {
                    return Err(WorkflowError::new(WorkflowErrorKind::NothingToRetry));
                }
                let Some(failure) = self.state.failure.take() else {
                    return Err(WorkflowError::new(WorkflowErrorKind::NothingToRetry));
                };
                let resume = *failure.stage();
                self.state.transcript.system(match resume {
                    Stage::Uploading => MSG_PREPARING,
                    Stage::ExtractingData => MSG_EXTRACTING,
                    Stage::GeneratingPlan if self.pending_feedback.is_some() => MSG_REFINING_PLAN,
                    Stage::GeneratingPlan => MSG_GENERATING_PLAN,
                    Stage::FactChecking => MSG_FACT_CHECKING,
                    _ => MSG_STORYBOARDING,
                });
                Ok(vec![self.transition(resume)])
            }

            Reset => {
                self.state = WorkflowState::default();
                self.pending_feedback = None;
                let mut events = vec![WorkflowEvent::Reset];
                if stage != Stage::Idle {
                    events.push(WorkflowEvent::StageChanged {
                        from: stage,
                        to: Stage::Idle,
                    });
                }
                Ok(events)
            }
        }
    }

    fn require(&self, expected: Stage, action: &str) -> WorkflowResult<()> {
        if self.state.stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::invalid_transition(self.state.stage, action))
        }
    }

    fn transition(&mut self, to: Stage) -> WorkflowEvent {
        let from = self.state.stage;
        self.state.stage = to;
        WorkflowEvent::StageChanged { from, to }
    }
}
