mod test_utils;

use scaleplan_core::{Input, Role};
use scaleplan_error::WorkflowErrorKind;
use scaleplan_workflow::{
    ConversationHistory, PLAN_SYSTEM_INSTRUCTION, PlanMode, PromptTemplates, PromptValues,
    REFINE_PREFIX, StageHandlers, Turn, parse_extraction,
};
use scaleplan_core::StageSettings;
use test_utils::{ACME_EXTRACTION, MockResponse, ScriptedDriver, two_images};

fn handlers(driver: &ScriptedDriver) -> StageHandlers<ScriptedDriver> {
    let templates = PromptTemplates::new(
        "EXTRACT",
        "PLAN for {Featured Brand} in {Category Name} vs {Comparison Brand}",
        "EVALUATE {Featured Brand}",
        "STORYBOARD {Featured Brand}",
    );
    StageHandlers::with_settings(driver.clone(), templates, StageSettings::default())
}

fn acme_values() -> PromptValues {
    PromptValues::new(Some("Acme".into()), Some("Toys".into()), Some("Rival".into()))
}

#[tokio::test]
async fn extract_sends_images_then_instruction_in_json_mode() {
    let driver = ScriptedDriver::new(vec![MockResponse::text(ACME_EXTRACTION)]);
    let record = handlers(&driver).extract(&two_images()).await.unwrap();
    assert_eq!(record.brand().name.as_deref(), Some("Acme"));

    let request = driver.last_request();
    assert!(*request.json_response());
    assert_eq!(*request.max_tokens(), Some(4000));
    assert_eq!(*request.temperature(), Some(0.2));
    assert_eq!(request.messages().len(), 1);

    let message = &request.messages()[0];
    assert_eq!(message.role(), &Role::User);
    let content = message.content();
    assert_eq!(content.len(), 3);
    assert!(content[0].is_image());
    assert!(content[1].is_image());
    assert_eq!(content[2], Input::Text("EXTRACT".to_string()));
}

#[tokio::test]
async fn extract_without_images_makes_no_call() {
    let driver = ScriptedDriver::new(vec![]);
    let err = handlers(&driver).extract(&[]).await.unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::Validation(_)));
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test]
async fn extract_rejects_incomplete_records() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("{}")]);
    let err = handlers(&driver).extract(&two_images()).await.unwrap_err();
    assert_eq!(err.kind.raw(), Some("{}"));
}

#[tokio::test]
async fn initial_plan_sends_instruction_and_data_context() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("PLAN v1")]);
    let record = parse_extraction(ACME_EXTRACTION).unwrap();

    let plan = handlers(&driver)
        .plan(&record, &ConversationHistory::new(), &acme_values(), &PlanMode::Initial)
        .await
        .unwrap();
    assert_eq!(plan, "PLAN v1");

    let request = driver.last_request();
    assert!(!*request.json_response());
    assert_eq!(*request.max_tokens(), Some(16000));
    let messages = request.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), &Role::System);
    assert_eq!(messages[0].text(), PLAN_SYSTEM_INSTRUCTION);
    assert_eq!(messages[1].role(), &Role::User);
    assert!(!messages[1].has_images());
    let context = messages[1].text();
    assert!(context.starts_with("=== EXTRACTED DATA FROM SCREENSHOTS ==="));
    assert!(context.ends_with("\n\nPLAN for Acme in Toys vs Rival"));
}

#[tokio::test]
async fn refine_replays_history_without_repeating_feedback() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("PLAN v2")]);
    let record = parse_extraction(ACME_EXTRACTION).unwrap();
    let history: ConversationHistory =
        [Turn::assistant("PLAN v1"), Turn::user("shorten it")].into_iter().collect();

    handlers(&driver)
        .plan(
            &record,
            &history,
            &acme_values(),
            &PlanMode::Refine("shorten it".to_string()),
        )
        .await
        .unwrap();

    let messages = driver.last_request().messages().clone();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role(), &Role::Assistant);
    assert_eq!(messages[2].text(), "PLAN v1");
    assert_eq!(messages[3].role(), &Role::User);
    assert_eq!(messages[3].text(), format!("{}shorten it", REFINE_PREFIX));
}

#[tokio::test]
async fn refine_keeps_earlier_feedback_turns() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("PLAN v3")]);
    let record = parse_extraction(ACME_EXTRACTION).unwrap();
    let history: ConversationHistory = [
        Turn::assistant("PLAN v1"),
        Turn::user("shorten it"),
        Turn::assistant("PLAN v2"),
        Turn::user(""),
    ]
    .into_iter()
    .collect();

    handlers(&driver)
        .plan(
            &record,
            &history,
            &acme_values(),
            &PlanMode::Refine("add prices".to_string()),
        )
        .await
        .unwrap();

    let texts: Vec<String> = driver
        .last_request()
        .messages()
        .iter()
        .skip(2)
        .map(|m| m.text())
        .collect();
    assert_eq!(
        texts,
        vec![
            "PLAN v1".to_string(),
            "shorten it".to_string(),
            "PLAN v2".to_string(),
            format!("{}add prices", REFINE_PREFIX),
        ]
    );
}

#[tokio::test]
async fn blank_feedback_is_rejected_before_the_call() {
    let driver = ScriptedDriver::new(vec![]);
    let record = parse_extraction(ACME_EXTRACTION).unwrap();
    let err = handlers(&driver)
        .plan(
            &record,
            &ConversationHistory::new(),
            &acme_values(),
            &PlanMode::Refine("  \n".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::Validation(_)));
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test]
async fn evaluate_and_storyboard_concatenate_prior_texts() {
    let driver = ScriptedDriver::new(vec![
        MockResponse::text("CHECKED"),
        MockResponse::text("SLIDES"),
    ]);
    let handlers = handlers(&driver);

    let evaluation = handlers.evaluate("THE PLAN", &acme_values()).await.unwrap();
    let storyboard = handlers
        .storyboard("THE PLAN", &evaluation, &acme_values())
        .await
        .unwrap();
    assert_eq!(storyboard, "SLIDES");

    let requests = driver.requests();
    assert_eq!(
        requests[0].messages()[0].text(),
        "EVALUATE Acme\n\n=== PLAN TO EVALUATE ===\nTHE PLAN"
    );
    assert_eq!(*requests[0].temperature(), Some(0.5));
    assert_eq!(requests[1].messages().len(), 1);
    assert_eq!(
        requests[1].messages()[0].text(),
        "STORYBOARD Acme\n\n=== APPROVED PLAN ===\nTHE PLAN\n\n=== EVALUATION ===\nCHECKED"
    );
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("   ")]);
    let err = handlers(&driver)
        .evaluate("THE PLAN", &PromptValues::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, WorkflowErrorKind::EmptyCompletion);
}

#[tokio::test]
async fn service_errors_pass_their_message_through() {
    let driver = ScriptedDriver::new(vec![MockResponse::service_error(
        429,
        "Rate limit reached",
    )]);
    let err = handlers(&driver)
        .evaluate("THE PLAN", &PromptValues::default())
        .await
        .unwrap_err();
    match err.kind {
        WorkflowErrorKind::RemoteService(message) => {
            assert!(message.contains("Rate limit reached"), "{}", message)
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn blank_inputs_are_rejected() {
    let driver = ScriptedDriver::new(vec![]);
    let handlers = handlers(&driver);
    let values = PromptValues::default();
    assert!(handlers.evaluate(" ", &values).await.is_err());
    assert!(handlers.storyboard("plan", "", &values).await.is_err());
    assert_eq!(driver.call_count(), 0);
}
