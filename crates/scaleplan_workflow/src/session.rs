//! Async driver chaining stage handlers through the state machine.

use crate::machine::{ProjectBrief, Stage, WorkflowCommand, WorkflowMachine, WorkflowState};
use crate::stages::{PlanMode, StageHandlers};
use scaleplan_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};
use scaleplan_interface::CompletionDriver;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument};

/// One user's workflow: a state machine plus the handlers it drives.
///
/// Each action runs its automatic successors before returning: `start`
/// extracts and drafts the first plan, `approve` fact-checks and builds the
/// storyboard. A handler failure is recorded as [`Stage::Failed`] and the
/// chain stops; the action itself still returns `Ok`. `Err` means the action
/// was rejected and nothing changed.
pub struct WorkflowSession<D: CompletionDriver> {
    machine: WorkflowMachine,
    handlers: Arc<StageHandlers<D>>,
}

impl<D: CompletionDriver> WorkflowSession<D> {
    /// Creates an idle session and a receiver that observes its stage.
    pub fn new(handlers: Arc<StageHandlers<D>>) -> (Self, watch::Receiver<Stage>) {
        let (machine, stage_rx) = WorkflowMachine::new();
        (Self { machine, handlers }, stage_rx)
    }

    /// Current state.
    pub fn state(&self) -> &WorkflowState {
        self.machine.state()
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    /// Another receiver for stage changes.
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.machine.subscribe()
    }

    /// Submits the brief, extracts the screenshots and drafts the first plan.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the session is idle.
    #[instrument(skip_all, fields(brand = %brief.brand(), images = brief.images().len()))]
    pub async fn start(&mut self, brief: ProjectBrief) -> WorkflowResult<Stage> {
        self.machine.apply(WorkflowCommand::Begin { brief })?;
        self.run().await
    }

    /// Records feedback and regenerates the plan.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless awaiting approval; `Validation` for blank feedback.
    #[instrument(skip_all, fields(feedback_len = feedback.len()))]
    pub async fn request_changes(&mut self, feedback: &str) -> WorkflowResult<Stage> {
        self.machine.apply(WorkflowCommand::RequestChanges {
            feedback: feedback.to_string(),
        })?;
        self.run().await
    }

    /// Approves the plan, then fact-checks it and builds the storyboard.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless awaiting approval.
    #[instrument(skip_all)]
    pub async fn approve(&mut self) -> WorkflowResult<Stage> {
        self.machine.apply(WorkflowCommand::Approve)?;
        self.run().await
    }

    /// Re-runs the failed stage and whatever follows it automatically.
    ///
    /// # Errors
    ///
    /// `NothingToRetry` unless the session has failed.
    #[instrument(skip_all)]
    pub async fn retry(&mut self) -> WorkflowResult<Stage> {
        self.machine.apply(WorkflowCommand::Retry)?;
        self.run().await
    }

    /// Clears all state back to idle.
    ///
    /// # Errors
    ///
    /// Never in practice; reset is valid from every stage.
    pub fn reset(&mut self) -> WorkflowResult<Stage> {
        self.machine.apply(WorkflowCommand::Reset)?;
        Ok(self.stage())
    }

    /// Runs handlers until the machine reaches a stage that waits on the user.
    async fn run(&mut self) -> WorkflowResult<Stage> {
        loop {
            let stage = self.stage();
            let command = match stage {
                Stage::Uploading => WorkflowCommand::BeginExtraction,
                Stage::ExtractingData => self.extract().await,
                Stage::GeneratingPlan => self.plan().await?,
                Stage::FactChecking => self.fact_check().await?,
                Stage::GeneratingPresentation => self.storyboard().await?,
                Stage::Idle | Stage::AwaitingApproval | Stage::Complete | Stage::Failed => {
                    info!(stage = %stage, "Workflow waiting");
                    return Ok(stage);
                }
            };
            self.machine.apply(command)?;
        }
    }

    async fn extract(&self) -> WorkflowCommand {
        let images = self
            .state()
            .brief()
            .as_ref()
            .map(|brief| brief.images().as_slice())
            .unwrap_or_default();
        outcome(
            self.handlers.extract(images).await,
            |record| WorkflowCommand::ExtractionSucceeded { record },
        )
    }

    async fn plan(&self) -> WorkflowResult<WorkflowCommand> {
        let state = self.state();
        let record = state
            .extracted()
            .as_ref()
            .ok_or_else(|| WorkflowError::new(WorkflowErrorKind::MissingExtraction))?;
        let mode = match self.machine.pending_feedback() {
            Some(feedback) => PlanMode::Refine(feedback.to_string()),
            None => PlanMode::Initial,
        };
        let values = state.prompt_values();
        let result = self
            .handlers
            .plan(record, state.history(), &values, &mode)
            .await;
        Ok(outcome(result, |text| WorkflowCommand::PlanSucceeded { text }))
    }

    async fn fact_check(&self) -> WorkflowResult<WorkflowCommand> {
        let state = self.state();
        let plan = state.plan_text().as_deref().ok_or_else(|| {
            WorkflowError::invalid_transition(Stage::FactChecking, "fact_check")
        })?;
        let result = self.handlers.evaluate(plan, &state.prompt_values()).await;
        Ok(outcome(result, |text| WorkflowCommand::FactCheckSucceeded { text }))
    }

    async fn storyboard(&self) -> WorkflowResult<WorkflowCommand> {
        let state = self.state();
        let (Some(plan), Some(evaluation)) = (
            state.plan_text().as_deref(),
            state.fact_check_text().as_deref(),
        ) else {
            return Err(WorkflowError::invalid_transition(
                Stage::GeneratingPresentation,
                "storyboard",
            ));
        };
        let result = self
            .handlers
            .storyboard(plan, evaluation, &state.prompt_values())
            .await;
        Ok(outcome(result, |text| WorkflowCommand::StoryboardSucceeded { text }))
    }
}

/// Maps a handler result to the command recording it.
fn outcome<T>(
    result: WorkflowResult<T>,
    success: impl FnOnce(T) -> WorkflowCommand,
) -> WorkflowCommand {
    match result {
        Ok(value) => success(value),
        Err(error) => WorkflowCommand::StageFailed { error },
    }
}
