//! HTTP boundary for record validation and change tracking
//!
//! Routes: `POST /process_json` (the core operation), a service index at
//! `/`, and the operational endpoints `/health`, `/live`, `/ready`, and
//! `/metrics`. Request bodies are parsed explicitly so malformed input
//! becomes a typed client error rather than a rejection.

use crate::error::{ServiceError, ServiceResult};
use crate::observability::metrics::metrics;
use crate::observability::request_span;
use crate::record::Record;
use crate::tracker::{ChangeTracker, Classification};
use crate::validate::{identifier, number};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

/// Upper bound on request body size
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Successful classification response
#[derive(Debug, Serialize)]
struct ProcessResponse {
    result: Classification,
}

#[derive(Debug, Serialize)]
struct ServiceIndex {
    service: &'static str,
    version: &'static str,
    endpoints: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
struct ComponentCheck {
    status: String,
    message: Option<String>,
    last_check: u64,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
    timestamp: u64,
    uptime_seconds: u64,
    checks: HashMap<String, ComponentCheck>,
}

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    ready: bool,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
struct LivenessResponse {
    alive: bool,
    timestamp: u64,
}

/// Build the complete route tree over a shared tracker.
pub fn routes(
    tracker: Arc<ChangeTracker>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let process_tracker = tracker.clone();
    let health_tracker = tracker;

    // POST /process_json - validate a record and classify it
    let process_route = warp::path("process_json")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and_then(move |body: Bytes| {
            let tracker = process_tracker.clone();
            async move { Ok::<_, Infallible>(process_record(tracker, body)) }
        });

    // GET /health - overall status with per-component checks
    let health_route = warp::path("health").and(warp::get()).and_then(move || {
        let tracker = health_tracker.clone();
        async move {
            let status = health_status(&tracker);
            let status_code = if status.status == "healthy" { 200 } else { 503 };
            Ok::<_, Infallible>(warp::reply::with_status(
                warp::reply::json(&status),
                StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ))
        }
    });

    // GET /metrics - complete metrics export
    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .map(|| warp::reply::json(&metrics().get_metrics()));

    // GET /ready - readiness probe; serving implies ready
    let ready_route = warp::path("ready").and(warp::get()).map(|| {
        warp::reply::json(&ReadinessResponse {
            ready: true,
            timestamp: current_timestamp(),
        })
    });

    // GET /live - liveness probe
    let live_route = warp::path("live").and(warp::get()).map(|| {
        warp::reply::json(&LivenessResponse {
            alive: true,
            timestamp: current_timestamp(),
        })
    });

    // GET / - service index
    let root_route = warp::path::end().and(warp::get()).map(|| {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            "/process_json".to_string(),
            "POST a record with ID and RandomNumber keys; responds New or Same".to_string(),
        );
        endpoints.insert(
            "/health".to_string(),
            "Overall health status with component checks".to_string(),
        );
        endpoints.insert("/metrics".to_string(), "Request metrics".to_string());
        endpoints.insert("/ready".to_string(), "Readiness probe".to_string());
        endpoints.insert("/live".to_string(), "Liveness probe".to_string());

        warp::reply::json(&ServiceIndex {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            endpoints,
        })
    });

    process_route
        .or(health_route)
        .or(metrics_route)
        .or(ready_route)
        .or(live_route)
        .or(root_route)
}

/// Bind the server and run it until the shutdown future resolves.
pub async fn serve(
    addr: SocketAddr,
    tracker: Arc<ChangeTracker>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (bound, server) =
        warp::serve(routes(tracker)).try_bind_with_graceful_shutdown(addr, shutdown)?;

    info!("Listening on http://{}", bound);
    server.await;

    Ok(())
}

/// Handle one `POST /process_json` request end to end.
fn process_record(tracker: Arc<ChangeTracker>, body: Bytes) -> impl warp::Reply {
    let request_id = Uuid::new_v4();
    let span = request_span!(request_id = %request_id);
    let _guard = span.enter();

    let started = Instant::now();
    metrics().request_received();

    let reply = match evaluate(&tracker, &body) {
        Ok(classification) => {
            metrics().request_accepted(classification);
            debug!(result = classification.as_str(), "record accepted");
            warp::reply::with_status(
                warp::reply::json(&ProcessResponse {
                    result: classification,
                }),
                StatusCode::OK,
            )
        }
        Err(err) => {
            metrics().request_rejected(&err);
            if err.status_code().is_server_error() {
                error!(error = %err, "request processing failed");
            } else {
                warn!(error = %err, "request rejected");
            }
            warp::reply::with_status(warp::reply::json(&err.to_error_body()), err.status_code())
        }
    };

    metrics().record_processing_time(started.elapsed());
    reply
}

/// Parse, validate, and classify a request body.
fn evaluate(tracker: &ChangeTracker, body: &[u8]) -> ServiceResult<Classification> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| ServiceError::InvalidFormat)?;
    let object = payload.as_object().ok_or(ServiceError::InvalidFormat)?;

    let raw_id = object.get("ID").ok_or(ServiceError::InvalidFormat)?;
    let raw_number = object.get("RandomNumber").ok_or(ServiceError::InvalidFormat)?;

    let canonical_id =
        identifier::validate(&raw_identifier(raw_id)).ok_or(ServiceError::InvalidId)?;

    let random_number = raw_number
        .as_i64()
        .filter(|n| number::is_valid(*n))
        .ok_or(ServiceError::InvalidNumber)?;

    let record = Record::new(canonical_id, random_number);
    Ok(tracker.classify(&record)?)
}

/// Render the identifier field as a string for validation.
///
/// JSON strings are taken verbatim; every other JSON value is rendered to
/// text, so numbers validate normally and booleans, nulls, and composites
/// fail the digit check.
fn raw_identifier(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn health_status(tracker: &ChangeTracker) -> HealthStatus {
    let now = current_timestamp();
    let mut checks = HashMap::new();

    let tracker_check = match tracker.remembers_record() {
        Ok(true) => ComponentCheck {
            status: "healthy".to_string(),
            message: Some("Tracking last accepted record".to_string()),
            last_check: now,
        },
        Ok(false) => ComponentCheck {
            status: "healthy".to_string(),
            message: Some("No record accepted yet".to_string()),
            last_check: now,
        },
        Err(e) => ComponentCheck {
            status: "unhealthy".to_string(),
            message: Some(e.to_string()),
            last_check: now,
        },
    };
    checks.insert("tracker".to_string(), tracker_check);

    let snapshot = metrics().get_metrics();
    checks.insert(
        "requests".to_string(),
        ComponentCheck {
            status: "healthy".to_string(),
            message: Some(format!(
                "{} received, {} accepted",
                snapshot.requests.received, snapshot.requests.accepted
            )),
            last_check: now,
        },
    );

    let overall_healthy = checks.values().all(|check| check.status == "healthy");
    HealthStatus {
        status: if overall_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: now,
        uptime_seconds: snapshot.lifecycle.uptime_seconds,
        checks,
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerStrategy;
    use serde_json::json;

    fn tracker() -> ChangeTracker {
        ChangeTracker::new(TrackerStrategy::Raw)
    }

    fn evaluate_json(tracker: &ChangeTracker, payload: Value) -> ServiceResult<Classification> {
        evaluate(tracker, payload.to_string().as_bytes())
    }

    #[test]
    fn test_valid_record_classifies_new_then_same() {
        let tracker = tracker();
        let payload = json!({"ID": "123456782", "RandomNumber": 123456789});

        assert_eq!(
            evaluate_json(&tracker, payload.clone()).unwrap(),
            Classification::New
        );
        assert_eq!(
            evaluate_json(&tracker, payload).unwrap(),
            Classification::Same
        );
    }

    #[test]
    fn test_missing_keys_are_format_errors() {
        let tracker = tracker();

        let result = evaluate_json(&tracker, json!({"RandomNumber": 123456789}));
        assert!(matches!(result, Err(ServiceError::InvalidFormat)));

        let result = evaluate_json(&tracker, json!({"ID": "123456782"}));
        assert!(matches!(result, Err(ServiceError::InvalidFormat)));
    }

    #[test]
    fn test_non_object_bodies_are_format_errors() {
        let tracker = tracker();

        for body in [&b"not json"[..], b"[1, 2]", b"\"text\"", b"42", b""] {
            let result = evaluate(&tracker, body);
            assert!(
                matches!(result, Err(ServiceError::InvalidFormat)),
                "expected format error for body {body:?}"
            );
        }
    }

    #[test]
    fn test_checksum_failure_is_an_id_error() {
        let tracker = tracker();
        let result = evaluate_json(
            &tracker,
            json!({"ID": "123456789", "RandomNumber": 123456789}),
        );
        assert!(matches!(result, Err(ServiceError::InvalidId)));
    }

    #[test]
    fn test_numeric_identifier_is_stringified() {
        let tracker = tracker();
        let result = evaluate_json(&tracker, json!({"ID": 123456782, "RandomNumber": 123456789}));
        assert_eq!(result.unwrap(), Classification::New);
    }

    #[test]
    fn test_non_scalar_identifiers_fail_the_digit_check() {
        let tracker = tracker();

        for id in [json!(null), json!(true), json!([1]), json!({"a": 1}), json!(3.5)] {
            let result =
                evaluate_json(&tracker, json!({"ID": id.clone(), "RandomNumber": 123456789}));
            assert!(
                matches!(result, Err(ServiceError::InvalidId)),
                "expected id error for {id}"
            );
        }
    }

    #[test]
    fn test_out_of_range_or_non_integer_numbers_are_rejected() {
        let tracker = tracker();

        for n in [
            json!(99_999_999),
            json!(1_000_000_000),
            json!(123456789.5),
            json!("123456789"),
            json!(null),
        ] {
            let result =
                evaluate_json(&tracker, json!({"ID": "123456782", "RandomNumber": n.clone()}));
            assert!(
                matches!(result, Err(ServiceError::InvalidNumber)),
                "expected number error for {n}"
            );
        }
    }

    #[test]
    fn test_id_is_validated_before_the_number() {
        // Both fields invalid: the identifier error wins
        let tracker = tracker();
        let result = evaluate_json(&tracker, json!({"ID": "bad", "RandomNumber": 1}));
        assert!(matches!(result, Err(ServiceError::InvalidId)));
    }

    #[test]
    fn test_identifier_variants_with_equal_canonical_form_compare_same() {
        let tracker = tracker();

        evaluate_json(&tracker, json!({"ID": "18", "RandomNumber": 123456789})).unwrap();
        let result = evaluate_json(
            &tracker,
            json!({"ID": "000000018", "RandomNumber": 123456789}),
        );
        assert_eq!(result.unwrap(), Classification::Same);

        let result = evaluate_json(&tracker, json!({"ID": 18, "RandomNumber": 123456789}));
        assert_eq!(result.unwrap(), Classification::Same);
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let tracker = tracker();

        evaluate_json(
            &tracker,
            json!({"ID": "123456782", "RandomNumber": 123456789, "note": "a"}),
        )
        .unwrap();
        let result = evaluate_json(
            &tracker,
            json!({"ID": "123456782", "RandomNumber": 123456789, "note": "b"}),
        );
        assert_eq!(result.unwrap(), Classification::Same);
    }

    #[test]
    fn test_raw_identifier_rendering() {
        assert_eq!(raw_identifier(&json!("18")), "18");
        assert_eq!(raw_identifier(&json!(18)), "18");
        assert_eq!(raw_identifier(&json!(null)), "null");
        assert_eq!(raw_identifier(&json!(true)), "true");
    }

    #[test]
    fn test_health_status_reports_healthy_tracker() {
        let tracker = tracker();
        let status = health_status(&tracker);

        assert_eq!(status.status, "healthy");
        assert_eq!(status.checks["tracker"].status, "healthy");
        assert!(status.checks.contains_key("requests"));
    }
}
