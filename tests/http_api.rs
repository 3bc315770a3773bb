//! HTTP round-trip tests over the full router: analytics endpoints, chart
//! discovery, editor persistence, counters and the error envelope contract.

use serde_json::json;

use slidegraph::server::router;

mod common;
use common::{
    data_points, get_json, post_json, slide_body, test_app, test_state_with_rate_limit,
};

// ─── Single slide generation ────────────────────────────────────────────────

#[tokio::test]
async fn analytics_endpoint_returns_content_and_metadata() {
    let app = test_app();
    let body = slide_body(
        "slide-1",
        "Quarterly revenue growth",
        &[("Q1", 125_000.0), ("Q2", 145_000.0), ("Q3", 195_000.0), ("Q4", 220_000.0)],
    );
    let (status, value) =
        post_json(&app, "/api/v1/analytics/L02/revenue_over_time", &body).await;

    assert_eq!(status, 200);
    let content = &value["content"];
    assert!(content["element_3"].as_str().unwrap().contains("<canvas"));
    assert!(content["element_2"].as_str().unwrap().contains("width: 540px"));
    let metadata = &value["metadata"];
    assert_eq!(metadata["service"], "slidegraph");
    assert_eq!(metadata["chart_type"], "line");
    assert_eq!(metadata["library"], "chartjs");
    assert_eq!(metadata["layout"], "L02");
    assert_eq!(metadata["analytics_type"], "revenue_over_time");
    assert_eq!(metadata["data_points"], 4);
    assert_eq!(metadata["insight_source"], "fallback");
    assert!(metadata["generated_at"].is_string());
}

#[tokio::test]
async fn unknown_analytics_type_is_rejected_with_allowed_list() {
    let app = test_app();
    let body = slide_body("slide-1", "text", &[("a", 1.0), ("b", 2.0)]);
    let (status, value) = post_json(&app, "/api/v1/analytics/L02/sentiment", &body).await;

    assert_eq!(status, 400);
    assert_eq!(value["success"], false);
    let error = &value["error"];
    assert_eq!(error["code"], "INVALID_ANALYTICS_TYPE");
    assert_eq!(error["category"], "validation");
    assert_eq!(error["retryable"], true);
    assert!(error["suggestion"].is_string());
    assert_eq!(error["details"]["allowed"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn unknown_layout_is_rejected() {
    let app = test_app();
    let body = slide_body("slide-1", "text", &[("a", 1.0), ("b", 2.0)]);
    let (status, value) = post_json(&app, "/api/v1/analytics/L09/market_share", &body).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"]["code"], "INVALID_LAYOUT");
}

#[tokio::test]
async fn single_data_point_is_a_range_error() {
    let app = test_app();
    let body = slide_body("slide-1", "text", &[("only", 1.0)]);
    let (status, value) = post_json(&app, "/api/v1/analytics/L02/market_share", &body).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"]["code"], "DATA_RANGE_ERROR");
    assert_eq!(value["error"]["details"]["count"], 1);
}

#[tokio::test]
async fn duplicate_labels_are_rejected() {
    let app = test_app();
    let body = slide_body("slide-1", "text", &[("Q1", 1.0), ("Q1", 2.0)]);
    let (status, value) = post_json(&app, "/api/v1/analytics/L02/market_share", &body).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"]["code"], "DUPLICATE_LABELS");
}

#[tokio::test]
async fn unknown_chart_type_lists_compatible_types() {
    let app = test_app();
    let mut body = slide_body("slide-1", "text", &[("a", 1.0), ("b", 2.0)]);
    body["chart_type"] = json!("gauge");
    let (status, value) = post_json(&app, "/api/v1/analytics/L02/market_share", &body).await;
    assert_eq!(status, 400);
    assert_eq!(value["error"]["code"], "INVALID_CHART_TYPE");
    assert!(value["error"]["details"]["compatible"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "pie"));
}

// ─── Chart discovery ────────────────────────────────────────────────────────

#[tokio::test]
async fn chart_types_catalog_lists_all_twenty() {
    let app = test_app();
    let (status, value) = get_json(&app, "/api/v1/chart-types").await;
    assert_eq!(status, 200);
    assert_eq!(value["chart_types"].as_array().unwrap().len(), 20);
    assert!(value["summary"].as_str().unwrap().contains("20 chart types"));
}

#[tokio::test]
async fn chart_types_filter_by_library() {
    let app = test_app();
    let (status, chartjs) = get_json(&app, "/api/v1/chart-types/chartjs").await;
    assert_eq!(status, 200);
    assert_eq!(chartjs["chart_types"].as_array().unwrap().len(), 16);

    let (status, apex) = get_json(&app, "/api/v1/chart-types/apexcharts").await;
    assert_eq!(status, 200);
    assert_eq!(apex["chart_types"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn chart_types_lookup_by_id_and_alias() {
    let app = test_app();
    let (status, spec) = get_json(&app, "/api/v1/chart-types/line").await;
    assert_eq!(status, 200);
    assert_eq!(spec["id"], "line");
    assert_eq!(spec["library"], "chartjs");

    let (status, spec) = get_json(&app, "/api/v1/chart-types/matrix").await;
    assert_eq!(status, 200);
    assert_eq!(spec["id"], "heatmap");

    let (status, value) = get_json(&app, "/api/v1/chart-types/gauge").await;
    assert_eq!(status, 404);
    assert_eq!(value["error"]["code"], "CHART_NOT_FOUND");
}

#[tokio::test]
async fn layout_filter_excludes_unsupported_types() {
    let app = test_app();
    let (status, value) = get_json(&app, "/api/v1/layouts/L03/chart-types").await;
    assert_eq!(status, 200);
    let ids: Vec<&str> = value["chart_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"line"));
    assert!(!ids.contains(&"sankey"));
    assert!(!ids.contains(&"heatmap"));

    let (status, _) = get_json(&app, "/api/v1/layouts/L99/chart-types").await;
    assert_eq!(status, 400);
}

// ─── Health and stats ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_stats() {
    let app = test_app();
    let (status, _) = get_json(&app, "/health").await;
    assert_eq!(status, 200);

    let body = slide_body("slide-1", "growth", &[("Q1", 1.0), ("Q2", 2.0)]);
    let _ = post_json(&app, "/api/v1/analytics/L02/yoy_growth", &body).await;

    let (status, stats) = get_json(&app, "/stats").await;
    assert_eq!(status, 200);
    assert_eq!(stats["requests_total"], 1);
    assert_eq!(stats["slides_generated"], 1);
    assert_eq!(stats["insight_fallbacks"], 1);
    assert_eq!(stats["by_analytics_type"]["yoy_growth"], 1);
}

// ─── Editor persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn chart_data_upsert_and_fetch_roundtrip() {
    let app = test_app();
    let upsert = json!({
        "chart_id": "chart_abc",
        "presentation_id": "pres-9",
        "payload": { "labels": ["a", "b"], "values": [1.0, 2.0] },
    });
    let (status, value) = post_json(&app, "/api/v1/chart-data", &upsert).await;
    assert_eq!(status, 200);
    assert!(value["updated_at"].is_string());

    let (status, value) = get_json(&app, "/api/v1/chart-data/pres-9").await;
    assert_eq!(status, 200);
    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["chart_id"], "chart_abc");
    assert_eq!(records[0]["payload"]["labels"][0], "a");

    let (status, value) = get_json(&app, "/api/v1/chart-data/ghost").await;
    assert_eq!(status, 200);
    assert!(value["records"].as_array().unwrap().is_empty());
}

// ─── Batch (scenario 6) ─────────────────────────────────────────────────────

fn batch_slide(
    slide_id: &str,
    analytics_type: &str,
    narrative: &str,
    pairs: &[(&str, f64)],
) -> serde_json::Value {
    json!({
        "slide_id": slide_id,
        "slide_number": 1,
        "narrative": narrative,
        "data": data_points(pairs),
        "analytics_type": analytics_type,
        "layout": "L02",
    })
}

#[tokio::test]
async fn batch_of_five_scenarios_all_succeed() {
    let app = test_app();
    let body = json!({
        "presentation_id": "pres-batch",
        "slides": [
            batch_slide("s1", "revenue_over_time", "Revenue ramp",
                &[("Q1", 125_000.0), ("Q2", 145_000.0), ("Q3", 195_000.0), ("Q4", 220_000.0)]),
            batch_slide("s2", "market_share", "Share split",
                &[("NA", 45.0), ("EU", 30.0), ("APAC", 20.0), ("Other", 5.0)]),
            batch_slide("s3", "correlation_analysis", "Spend vs leads",
                &[("Jan - $20K", 95.0), ("Feb - $28K", 124.0), ("Mar - $35K", 150.0)]),
            batch_slide("s4", "multidimensional_analysis", "Opportunity sizing",
                &[("NA", 180.0), ("EU", 145.0), ("APAC", 95.0), ("LATAM", 62.0)]),
            batch_slide("s5", "multi_metric_comparison", "Scorecard",
                &[("Revenue", 90.0), ("Share", 82.0), ("Satisfaction", 85.0)]),
        ],
    });

    let (status, value) = post_json(&app, "/api/v1/analytics/batch", &body).await;
    assert_eq!(status, 200);
    assert_eq!(value["total"], 5);
    assert_eq!(value["successful"], 5);
    assert_eq!(value["presentation_id"], "pres-batch");

    let slides = value["slides"].as_array().unwrap();
    // input order preserved
    let ids: Vec<&str> = slides.iter().map(|s| s["slide_id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["s1", "s2", "s3", "s4", "s5"]);

    // chart ids are stable per slide and never collide across slides
    let mut chart_ids = std::collections::HashSet::new();
    for slide in slides {
        assert_eq!(slide["success"], true);
        let fragment = slide["content"]["element_3"].as_str().unwrap();
        let start = fragment.find("chart_").unwrap();
        let chart_id: String = fragment[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        assert!(chart_ids.insert(chart_id), "chart id collision across slides");
    }

    let expected_types = ["line", "pie", "scatter", "bubble", "radar"];
    for (slide, expected) in slides.iter().zip(expected_types) {
        assert_eq!(slide["metadata"]["chart_type"], expected);
    }
}

#[tokio::test]
async fn batch_tolerates_a_failing_slide() {
    let app = test_app();
    let body = json!({
        "presentation_id": "pres-batch",
        "slides": [
            batch_slide("good", "market_share", "Share",
                &[("NA", 45.0), ("EU", 55.0)]),
            batch_slide("bad", "market_share", "Share", &[("only", 1.0)]),
        ],
    });

    let (status, value) = post_json(&app, "/api/v1/analytics/batch", &body).await;
    assert_eq!(status, 200);
    assert_eq!(value["total"], 2);
    assert_eq!(value["successful"], 1);
    let slides = value["slides"].as_array().unwrap();
    assert_eq!(slides[0]["success"], true);
    assert_eq!(slides[1]["success"], false);
    assert_eq!(slides[1]["error"]["code"], "DATA_RANGE_ERROR");
}

// ─── Rate limiting ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rate_limit_returns_429_with_retry_after() {
    let app = router(test_state_with_rate_limit(1));
    let body = slide_body("slide-1", "growth", &[("Q1", 1.0), ("Q2", 2.0)]);

    let (status, _) = post_json(&app, "/api/v1/analytics/L02/yoy_growth", &body).await;
    assert_eq!(status, 200);

    let (status, value) = post_json(&app, "/api/v1/analytics/L02/yoy_growth", &body).await;
    assert_eq!(status, 429);
    assert_eq!(value["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(value["error"]["category"], "rate_limit");
    assert!(value["error"]["details"]["retry_after"].as_u64().unwrap() <= 60);
}
