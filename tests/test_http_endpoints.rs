//! HTTP surface behavior tests
//!
//! Tests focus on observable behavior of the endpoints: exact status codes
//! and wire bodies, not the internals of parsing or tracking.

use recordgate::server::routes;
use recordgate::tracker::{ChangeTracker, TrackerStrategy};
use serde_json::{json, Value};
use std::sync::Arc;

async fn post_record<F>(api: &F, body: &Value) -> (u16, Value)
where
    F: warp::Filter<Error = warp::Rejection> + 'static,
    F::Extract: warp::Reply + Send,
{
    let response = warp::test::request()
        .method("POST")
        .path("/process_json")
        .json(body)
        .reply(api)
        .await;

    let status = response.status().as_u16();
    let body: Value = serde_json::from_slice(response.body()).expect("response body is JSON");
    (status, body)
}

#[tokio::test]
async fn test_first_valid_record_is_new() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let (status, body) =
        post_record(&api, &json!({"ID": "123456782", "RandomNumber": 123456789})).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"result": "New"}));
}

#[tokio::test]
async fn test_repeated_record_is_same_and_changes_are_new() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));
    let record = json!({"ID": "123456782", "RandomNumber": 123456789});

    let (_, body) = post_record(&api, &record).await;
    assert_eq!(body, json!({"result": "New"}));

    let (status, body) = post_record(&api, &record).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"result": "Same"}));

    // Changing the number is a new record
    let (_, body) = post_record(&api, &json!({"ID": "123456782", "RandomNumber": 987654321})).await;
    assert_eq!(body, json!({"result": "New"}));

    // Changing the identifier is a new record
    let (_, body) = post_record(&api, &json!({"ID": "030577928", "RandomNumber": 987654321})).await;
    assert_eq!(body, json!({"result": "New"}));
}

#[tokio::test]
async fn test_digest_strategy_behaves_identically_over_http() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Digest)));
    let record = json!({"ID": "123456782", "RandomNumber": 123456789});

    let (_, body) = post_record(&api, &record).await;
    assert_eq!(body, json!({"result": "New"}));

    let (_, body) = post_record(&api, &record).await;
    assert_eq!(body, json!({"result": "Same"}));
}

#[tokio::test]
async fn test_missing_keys_return_format_error() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let (status, body) = post_record(&api, &json!({"RandomNumber": 123456789})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid JSON format"}));

    let (status, body) = post_record(&api, &json!({"ID": "123456782"})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid JSON format"}));

    let (status, body) = post_record(&api, &json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid JSON format"}));
}

#[tokio::test]
async fn test_unparseable_body_returns_format_error() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let response = warp::test::request()
        .method("POST")
        .path("/process_json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({"error": "Invalid JSON format"}));
}

#[tokio::test]
async fn test_invalid_checksum_returns_id_error() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let (status, body) =
        post_record(&api, &json!({"ID": "123456789", "RandomNumber": 123456789})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid Israeli ID"}));
}

#[tokio::test]
async fn test_invalid_number_returns_number_error() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    for bad_number in [json!(99999999), json!(1000000000), json!(1.5), json!("123456789")] {
        let (status, body) =
            post_record(&api, &json!({"ID": "123456782", "RandomNumber": bad_number})).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "Invalid RandomNumber format"}));
    }
}

#[tokio::test]
async fn test_numeric_identifier_is_accepted() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let (status, body) =
        post_record(&api, &json!({"ID": 123456782, "RandomNumber": 123456789})).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"result": "New"}));
}

#[tokio::test]
async fn test_concurrent_identical_records_yield_exactly_one_new() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));
    let record = json!({"ID": "123456782", "RandomNumber": 123456789});

    let requests = (0..16).map(|_| {
        let api = api.clone();
        let record = record.clone();
        async move {
            let (status, body) = post_record(&api, &record).await;
            assert_eq!(status, 200);
            body["result"].as_str().expect("result is a string").to_string()
        }
    });

    let results = futures::future::join_all(requests).await;

    let new_count = results.iter().filter(|r| *r == "New").count();
    let same_count = results.iter().filter(|r| *r == "Same").count();

    assert_eq!(new_count, 1, "exactly one request may observe New");
    assert_eq!(same_count, 15);
}

#[tokio::test]
async fn test_root_returns_service_index() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let response = warp::test::request().method("GET").path("/").reply(&api).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["service"], "recordgate");
    assert!(body["endpoints"]["/process_json"].is_string());
}

#[tokio::test]
async fn test_probe_endpoints_respond() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let response = warp::test::request().method("GET").path("/live").reply(&api).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["alive"], true);

    let response = warp::test::request().method("GET").path("/ready").reply(&api).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_health_endpoint_reports_component_checks() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let response = warp::test::request().method("GET").path("/health").reply(&api).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["tracker"]["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint_exports_snapshot() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    post_record(&api, &json!({"ID": "123456782", "RandomNumber": 123456789})).await;

    let response = warp::test::request().method("GET").path("/metrics").reply(&api).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    // The collector is process-global, so only assert structure, not counts
    assert!(body["requests"]["received"].is_u64());
    assert!(body["classifications"]["new"].is_u64());
    assert!(body["lifecycle"]["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let api = routes(Arc::new(ChangeTracker::new(TrackerStrategy::Raw)));

    let response = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&api)
        .await;

    assert_eq!(response.status().as_u16(), 404);
}
