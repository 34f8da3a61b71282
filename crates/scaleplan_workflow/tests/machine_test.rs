mod test_utils;

use scaleplan_error::{WorkflowError, WorkflowErrorKind};
use scaleplan_workflow::{
    EntryKind, ExtractedRecord, ProjectBrief, Speaker, Stage, WorkflowCommand, WorkflowEvent,
    WorkflowMachine, parse_extraction,
};
use test_utils::{ACME_EXTRACTION, two_images};

fn brief() -> ProjectBrief {
    ProjectBrief::new("Acme", "Toys", None, two_images()).unwrap()
}

fn record() -> ExtractedRecord {
    parse_extraction(ACME_EXTRACTION).unwrap()
}

/// Drives a fresh machine to `AwaitingApproval`.
fn awaiting_approval() -> WorkflowMachine {
    let (mut machine, _rx) = WorkflowMachine::new();
    machine.apply(WorkflowCommand::Begin { brief: brief() }).unwrap();
    machine.apply(WorkflowCommand::BeginExtraction).unwrap();
    machine
        .apply(WorkflowCommand::ExtractionSucceeded { record: record() })
        .unwrap();
    machine
        .apply(WorkflowCommand::PlanSucceeded {
            text: "PLAN v1".to_string(),
        })
        .unwrap();
    machine
}

#[test]
fn brief_validation_rejects_missing_fields() {
    assert!(ProjectBrief::new("Acme", "Toys", None, vec![]).is_err());
    assert!(ProjectBrief::new(" ", "Toys", None, two_images()).is_err());
    assert!(ProjectBrief::new("Acme", "", None, two_images()).is_err());

    let brief = ProjectBrief::new(" Acme ", "Toys", Some("  ".into()), two_images()).unwrap();
    assert_eq!(brief.brand(), "Acme");
    assert_eq!(brief.competitor(), &None);
}

#[test]
fn success_path_advances_and_broadcasts() {
    let (mut machine, rx) = WorkflowMachine::new();
    assert_eq!(*rx.borrow(), Stage::Idle);

    let events = machine.apply(WorkflowCommand::Begin { brief: brief() }).unwrap();
    assert_eq!(
        events,
        vec![WorkflowEvent::StageChanged {
            from: Stage::Idle,
            to: Stage::Uploading
        }]
    );
    assert_eq!(*rx.borrow(), Stage::Uploading);

    machine.apply(WorkflowCommand::BeginExtraction).unwrap();
    machine
        .apply(WorkflowCommand::ExtractionSucceeded { record: record() })
        .unwrap();
    assert_eq!(machine.stage(), Stage::GeneratingPlan);
    machine
        .apply(WorkflowCommand::PlanSucceeded {
            text: "PLAN v1".into(),
        })
        .unwrap();
    machine.apply(WorkflowCommand::Approve).unwrap();
    machine
        .apply(WorkflowCommand::FactCheckSucceeded {
            text: "CHECKED".into(),
        })
        .unwrap();
    machine
        .apply(WorkflowCommand::StoryboardSucceeded {
            text: "SLIDES".into(),
        })
        .unwrap();

    assert_eq!(machine.stage(), Stage::Complete);
    assert_eq!(*rx.borrow(), Stage::Complete);
    let state = machine.state();
    assert_eq!(state.plan_text().as_deref(), Some("PLAN v1"));
    assert_eq!(state.fact_check_text().as_deref(), Some("CHECKED"));
    assert_eq!(state.storyboard_text().as_deref(), Some("SLIDES"));
    assert_eq!(state.history().len(), 1);
}

#[test]
fn commands_outside_their_stage_are_rejected_without_change() {
    let (mut machine, _rx) = WorkflowMachine::new();

    for command in [
        WorkflowCommand::Approve,
        WorkflowCommand::RequestChanges {
            feedback: "more".into(),
        },
        WorkflowCommand::BeginExtraction,
        WorkflowCommand::PlanSucceeded { text: "x".into() },
        WorkflowCommand::StageFailed {
            error: WorkflowError::validation("boom"),
        },
    ] {
        let err = machine.apply(command).unwrap_err();
        assert!(
            matches!(err.kind, WorkflowErrorKind::InvalidTransition { .. }),
            "{:?}",
            err
        );
        assert_eq!(machine.stage(), Stage::Idle);
    }

    let mut machine = awaiting_approval();
    let err = machine
        .apply(WorkflowCommand::Begin { brief: brief() })
        .unwrap_err();
    assert_eq!(
        err.kind,
        WorkflowErrorKind::InvalidTransition {
            stage: "awaiting_approval".into(),
            action: "begin".into()
        }
    );
}

#[test]
fn extraction_is_stored_at_most_once() {
    let (mut machine, _rx) = WorkflowMachine::new();
    machine.apply(WorkflowCommand::Begin { brief: brief() }).unwrap();
    machine.apply(WorkflowCommand::BeginExtraction).unwrap();
    machine
        .apply(WorkflowCommand::ExtractionSucceeded { record: record() })
        .unwrap();

    let err = machine
        .apply(WorkflowCommand::ExtractionSucceeded { record: record() })
        .unwrap_err();
    assert_eq!(err.kind, WorkflowErrorKind::ExtractionAlreadySet);
    assert_eq!(machine.stage(), Stage::GeneratingPlan);
    assert!(machine.state().extracted().is_some());
}

#[test]
fn feedback_round_trip_only_appends_history() {
    let mut machine = awaiting_approval();
    let before = machine.state().history().turns().to_vec();

    let err = machine
        .apply(WorkflowCommand::RequestChanges {
            feedback: "   ".into(),
        })
        .unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::Validation(_)));
    assert_eq!(machine.stage(), Stage::AwaitingApproval);

    machine
        .apply(WorkflowCommand::RequestChanges {
            feedback: "shorten it".into(),
        })
        .unwrap();
    assert_eq!(machine.stage(), Stage::GeneratingPlan);
    assert_eq!(machine.pending_feedback(), Some("shorten it"));

    let events = machine
        .apply(WorkflowCommand::PlanSucceeded {
            text: "PLAN v2".into(),
        })
        .unwrap();
    assert!(events.contains(&WorkflowEvent::PlanStored { revision: true }));
    assert_eq!(machine.pending_feedback(), None);

    let turns = machine.state().history().turns();
    assert_eq!(&turns[..before.len()], before.as_slice());
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1].speaker, Speaker::User);
    assert_eq!(turns[1].text, "shorten it");
    assert_eq!(turns[2].text, "PLAN v2");
    assert_eq!(machine.state().plan_text().as_deref(), Some("PLAN v2"));

    let last = machine.state().transcript().entries().last().unwrap();
    assert_eq!(last.kind, EntryKind::System);
    assert_eq!(last.text, "✅ Plan refined! Please review again.");
}

#[test]
fn failure_records_stage_and_retry_resumes_there() {
    let mut machine = awaiting_approval();
    machine.apply(WorkflowCommand::Approve).unwrap();
    machine
        .apply(WorkflowCommand::StageFailed {
            error: WorkflowError::new(WorkflowErrorKind::RemoteService("timeout".into())),
        })
        .unwrap();

    assert_eq!(machine.stage(), Stage::Failed);
    let failure = machine.state().failure().clone().unwrap();
    assert_eq!(*failure.stage(), Stage::FactChecking);
    assert_eq!(failure.message(), "timeout");
    let last = machine.state().transcript().entries().last().unwrap();
    assert_eq!(last.text, "❌ Error: timeout");

    for command in [
        WorkflowCommand::Approve,
        WorkflowCommand::FactCheckSucceeded { text: "x".into() },
    ] {
        assert!(machine.apply(command).is_err());
    }

    machine.apply(WorkflowCommand::Retry).unwrap();
    assert_eq!(machine.stage(), Stage::FactChecking);
    assert!(machine.state().failure().is_none());
}

#[test]
fn retry_requires_a_failure() {
    let mut machine = awaiting_approval();
    let err = machine.apply(WorkflowCommand::Retry).unwrap_err();
    assert_eq!(err.kind, WorkflowErrorKind::NothingToRetry);
}

#[test]
fn reset_clears_everything_from_any_stage() {
    let mut machine = awaiting_approval();
    let rx = machine.subscribe();
    machine
        .apply(WorkflowCommand::RequestChanges {
            feedback: "again".into(),
        })
        .unwrap();
    assert!(!machine.state().history().is_empty());
    assert!(!machine.state().transcript().is_empty());

    let events = machine.apply(WorkflowCommand::Reset).unwrap();
    assert_eq!(events[0], WorkflowEvent::Reset);
    assert_eq!(*rx.borrow(), Stage::Idle);

    let state = machine.state();
    assert_eq!(*state.stage(), Stage::Idle);
    assert!(state.brief().is_none());
    assert!(state.extracted().is_none());
    assert!(state.plan_text().is_none());
    assert!(state.history().is_empty());
    assert!(state.transcript().is_empty());
    assert_eq!(machine.pending_feedback(), None);

    // Idle again, so a new brief is accepted.
    machine.apply(WorkflowCommand::Begin { brief: brief() }).unwrap();
}

#[test]
fn stages_only_move_forward_except_refinement() {
    let (mut machine, _rx) = WorkflowMachine::new();
    let mut seen = vec![machine.stage()];
    let commands = vec![
        WorkflowCommand::Begin { brief: brief() },
        WorkflowCommand::BeginExtraction,
        WorkflowCommand::ExtractionSucceeded { record: record() },
        WorkflowCommand::PlanSucceeded { text: "v1".into() },
        WorkflowCommand::RequestChanges {
            feedback: "a".into(),
        },
        WorkflowCommand::PlanSucceeded { text: "v2".into() },
        WorkflowCommand::Approve,
        WorkflowCommand::FactCheckSucceeded { text: "c".into() },
        WorkflowCommand::StoryboardSucceeded { text: "s".into() },
    ];
    for command in commands {
        machine.apply(command).unwrap();
        seen.push(machine.stage());
    }

    for pair in seen.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let back_edge = from == Stage::AwaitingApproval && to == Stage::GeneratingPlan;
        assert!(
            back_edge || to.ordinal() > from.ordinal(),
            "{} -> {}",
            from,
            to
        );
    }
}
