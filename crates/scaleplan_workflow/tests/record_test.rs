mod test_utils;

use scaleplan_error::WorkflowErrorKind;
use scaleplan_workflow::{ExtractedRecord, parse_extraction};
use serde_json::{Number, json};
use test_utils::ACME_EXTRACTION;

#[test]
fn parses_full_extraction() {
    let record = parse_extraction(ACME_EXTRACTION).unwrap();

    assert_eq!(record.brand().name.as_deref(), Some("Acme"));
    assert_eq!(record.competitors().len(), 1);
    let shopee = &record.platform_data()["shopee"];
    let metrics = shopee.brand_metrics.as_ref().unwrap();
    assert_eq!(metrics.followers, Some(Number::from(19200u64)));
    assert_eq!(metrics.videos(), Some(&Number::from(12u64)));
    assert_eq!(record.competitive_insights(), &["Rival has 13x the followers"]);
    assert!(record.warnings().is_empty());
}

#[test]
fn empty_object_is_malformed_and_keeps_raw() {
    let err = parse_extraction("{}").unwrap_err();
    match &err.kind {
        WorkflowErrorKind::MalformedExtraction { raw, .. } => assert_eq!(raw, "{}"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.kind.raw(), Some("{}"));
}

#[test]
fn missing_platform_data_is_malformed() {
    let err = parse_extraction(r#"{"brand": {"name": "Acme"}}"#).unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::MalformedExtraction { .. }));
}

#[test]
fn non_object_brand_is_malformed() {
    let err = parse_extraction(r#"{"brand": "Acme", "platform_data": {}}"#).unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::MalformedExtraction { .. }));
}

#[test]
fn invalid_json_is_malformed() {
    let err = parse_extraction("Sorry, I cannot read these images.").unwrap_err();
    assert_eq!(
        err.kind.raw(),
        Some("Sorry, I cannot read these images.")
    );
}

#[test]
fn lenient_fields_tolerate_model_noise() {
    let raw = json!({
        "brand": {"name": "Acme", "category": null},
        "competitors": "Rival",
        "platform_data": {
            "shopee": {
                "brand_metrics": {
                    "followers": "N/A",
                    "reviews_count": "1,024",
                    "pricing": "unknown",
                    "promotions": {"voucher_examples": "₱20 off"}
                }
            },
            "lazada": null
        },
        "competitive_insights": "One insight",
        "data_quality": "High"
    })
    .to_string();

    let record = parse_extraction(&raw).unwrap();
    let metrics = record.platform_data()["shopee"].brand_metrics.clone().unwrap();
    assert_eq!(metrics.followers, None);
    assert_eq!(metrics.reviews_count, Some(Number::from(1024u64)));
    assert_eq!(metrics.pricing, None);
    assert_eq!(
        metrics.promotions.unwrap().voucher_examples,
        vec!["₱20 off".to_string()]
    );
    assert!(!record.platform_data().contains_key("lazada"));
    assert_eq!(record.competitors()[0].name.as_deref(), Some("Rival"));
    assert_eq!(record.competitive_insights(), &["One insight"]);
    assert_eq!(record.data_quality(), &None);
    assert_eq!(record.warnings(), vec!["brand.category".to_string()]);
}

#[test]
fn unknown_fields_survive_a_round_trip() {
    let raw = json!({
        "brand": {"name": "Acme", "tagline": "Fun for all"},
        "platform_data": {"shopee": {"brand_metrics": {"flash_sale": true}}},
        "notes": ["kept"]
    });
    let record = ExtractedRecord::from_json(raw).unwrap();
    let value = record.to_value();
    assert_eq!(value["brand"]["tagline"], "Fun for all");
    assert_eq!(
        value["platform_data"]["shopee"]["brand_metrics"]["flash_sale"],
        true
    );
    assert_eq!(value["notes"][0], "kept");
}

#[test]
fn client_records_need_a_brand_object() {
    let err = ExtractedRecord::from_json(json!({"platform_data": {}})).unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::Validation(_)));

    let err = ExtractedRecord::from_json(json!(["not", "an", "object"])).unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::Validation(_)));
}

#[test]
fn plan_readiness_requires_brand_name() {
    let record = ExtractedRecord::from_json(json!({"brand": {"category": "Toys"}})).unwrap();
    assert!(record.check_plan_ready().is_err());
    assert_eq!(
        record.warnings(),
        vec![
            "brand.name".to_string(),
            "platform_data (none provided)".to_string()
        ]
    );

    let record = ExtractedRecord::from_json(json!({"brand": {"name": "Acme"}})).unwrap();
    assert!(record.check_plan_ready().is_ok());
}

#[test]
fn competitor_falls_back_to_shopee_metrics() {
    let record = ExtractedRecord::from_json(json!({
        "brand": {"name": "Acme"},
        "platform_data": {"shopee": {"competitor_metrics": {"competitor_name": "Rival"}}}
    }))
    .unwrap();
    assert_eq!(record.primary_competitor(), Some("Rival"));
    assert_eq!(record.prompt_values().competitor.as_deref(), Some("Rival"));
    assert_eq!(record.prompt_values().category, None);
}
