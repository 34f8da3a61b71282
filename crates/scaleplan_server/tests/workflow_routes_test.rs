mod test_utils;

use axum::http::StatusCode;
use scaleplan_core::Role;
use serde_json::json;
use test_utils::{ACME_EXTRACTION, MockResponse, PNG, ScriptedDriver, app, send};

#[tokio::test]
async fn health_reports_ok() {
    let driver = ScriptedDriver::new(vec![]);
    let (status, body) = send(&app(&driver), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn extract_returns_record_and_metadata() {
    let driver = ScriptedDriver::new(vec![MockResponse::text(ACME_EXTRACTION)]);
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/extract",
        Some(json!({"images": [PNG, PNG]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extractedData"]["brand"]["name"], "Acme");
    assert_eq!(body["metadata"]["screenshotsProcessed"], 2);
    assert_eq!(body["metadata"]["modelUsed"], "scripted-model");
    assert!(body["metadata"]["extractionTimestamp"].is_string());
    assert!(*driver.requests()[0].json_response());
}

#[tokio::test]
async fn screenshots_alias_is_accepted() {
    let driver = ScriptedDriver::new(vec![MockResponse::text(ACME_EXTRACTION)]);
    let (status, _) = send(
        &app(&driver),
        "POST",
        "/api/workflow/screenshots",
        Some(json!({"screenshots": [PNG]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn extract_validates_images_before_calling() {
    let driver = ScriptedDriver::new(vec![]);
    let app = app(&driver);

    let (status, body) = send(&app, "POST", "/api/workflow/extract", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("image"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/workflow/extract",
        Some(json!({"images": ["not an image!"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("images[0]"));
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test]
async fn malformed_extraction_returns_raw_text() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("{\"oops\": true}")]);
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/extract",
        Some(json!({"images": [PNG]})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse extracted data");
    assert_eq!(body["raw"], "{\"oops\": true}");
}

#[tokio::test]
async fn plan_requires_a_named_brand() {
    let driver = ScriptedDriver::new(vec![]);
    let app = app(&driver);

    let (status, _) = send(&app, "POST", "/api/workflow/plan", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/workflow/plan",
        Some(json!({"extractedData": {"brand": {"category": "Toys"}, "platform_data": {}}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("brand.name"));
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test]
async fn plan_returns_output() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("PLAN v1")]);
    let record: serde_json::Value = serde_json::from_str(ACME_EXTRACTION).unwrap();
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/plan",
        Some(json!({"extractedData": record})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": "PLAN v1"}));
    let request = &driver.requests()[0];
    assert_eq!(request.messages()[0].role(), &Role::System);
    assert!(request.messages()[1].text().ends_with("PLAN Acme"));
}

#[tokio::test]
async fn refine_filters_history_and_reports_warnings() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("PLAN v2")]);
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/refine",
        Some(json!({
            "extractedData": {"brand": {"name": "Acme"}},
            "conversationHistory": [
                {"role": "assistant", "content": "PLAN v1"},
                {"role": "system", "content": "ignored"},
                {"role": "user", "content": ""},
                {"role": "user", "content": "shorter please"}
            ],
            "feedback": "shorter please"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "PLAN v2");
    assert_eq!(
        body["warnings"],
        json!(["brand.category", "platform_data (none provided)"])
    );
    assert!(
        body["formattedInput"]
            .as_str()
            .unwrap()
            .starts_with("=== EXTRACTED DATA FROM SCREENSHOTS ===")
    );

    let messages = driver.requests()[0].messages().clone();
    let roles: Vec<Role> = messages.iter().map(|m| *m.role()).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert!(messages[3].text().ends_with("shorter please"));
}

#[tokio::test]
async fn refine_requires_feedback() {
    let driver = ScriptedDriver::new(vec![]);
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/refine",
        Some(json!({"extractedData": {"brand": {"name": "Acme"}}, "feedback": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "feedback is required");
}

#[tokio::test]
async fn evaluate_surfaces_service_errors() {
    let driver = ScriptedDriver::new(vec![MockResponse::service_error(503, "Overloaded")]);
    let app = app(&driver);

    let (status, _) = send(&app, "POST", "/api/workflow/evaluate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/workflow/evaluate",
        Some(json!({"planText": "THE PLAN"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Overloaded"));
}

#[tokio::test]
async fn storyboard_combines_plan_and_evaluation() {
    let driver = ScriptedDriver::new(vec![MockResponse::text("SLIDES")]);
    let (status, body) = send(
        &app(&driver),
        "POST",
        "/api/workflow/storyboard",
        Some(json!({"planText": "THE PLAN", "evaluationText": "CHECKED", "brand": "Acme"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "SLIDES");
    let text = driver.requests()[0].messages()[0].text();
    assert!(text.contains("=== APPROVED PLAN ===\nTHE PLAN"));
    assert!(text.ends_with("=== EVALUATION ===\nCHECKED"));
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let driver = ScriptedDriver::new(vec![]);
    let app = app(&driver);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/workflow/evaluate")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_are_json_404s() {
    let driver = ScriptedDriver::new(vec![]);
    let (status, body) = send(&app(&driver), "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
