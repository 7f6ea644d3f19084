//! Request client integration tests
//!
//! Credential handling, failure taxonomy and response guards.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use studio_admin::api::{Exchange, RequestOptions, ResponseGuard};
use studio_admin::shared::models::Direction;
use studio_admin::shared::ApiError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::*;

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(String, Option<u16>, Option<String>)>>,
}

impl ResponseGuard for Recorder {
    fn inspect(&self, exchange: &Exchange<'_>) {
        let status = match exchange.outcome {
            Ok(status) => Some(status.as_u16()),
            Err(error) => error.status(),
        };
        self.seen.lock().unwrap().push((
            exchange.path.to_string(),
            status,
            exchange.credential.map(str::to_string),
        ));
    }
}

#[tokio::test]
async fn test_bearer_header_follows_credential() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    crate::assert_ok!(client.products().list().await);
    client.set_credential("first");
    crate::assert_ok!(client.products().list().await);
    client.set_credential("second");
    crate::assert_ok!(client.products().list().await);

    let headers: Vec<Option<String>> = received(&server).await.iter().map(bearer_of).collect();
    assert_eq!(
        headers,
        vec![
            None,
            Some("Bearer first".to_string()),
            Some("Bearer second".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_clear_credential_makes_calls_anonymous() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.set_credential("abc");
    client.clear_credential();
    crate::assert_ok!(client.payments().list().await);

    let requests = received(&server).await;
    assert_eq!(bearer_of(&requests[0]), None);
}

#[tokio::test]
async fn test_bad_request_carries_detail() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/directions"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "name"], "msg": "field required", "type": "missing"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/directions/9"))
        .respond_with(detail(404, "Direction not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .post::<Direction>("/directions", None, RequestOptions::new())
        .await;
    assert_eq!(
        created,
        Err(ApiError::BadRequest {
            status: 422,
            message: "field required".to_string()
        })
    );

    let updated = client
        .directions()
        .update(9, &Default::default())
        .await;
    match updated {
        Err(ApiError::BadRequest { status, message }) => {
            assert_eq!(status, 404);
            crate::assert_contains!(message, "not found");
        }
        other => panic!("Expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_errors() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/bookings/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.bookings().stats().await,
        Err(ApiError::ServerError {
            status: 503,
            message: "Service Unavailable".to_string()
        })
    );
}

#[tokio::test]
async fn test_network_error_without_response() {
    let client = client_at(&closed_port_url());
    assert_matches!(
        client.get::<Value>("/auth/me", RequestOptions::new()).await,
        Err(ApiError::Network { .. })
    );
}

#[tokio::test]
async fn test_per_call_timeout_is_network_error() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .get::<Value>(
            "/users",
            RequestOptions::new().timeout(Duration::from_millis(50)),
        )
        .await;
    assert_matches!(result, Err(ApiError::Network { .. }));
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_matches!(
        client.directions().list(false).await,
        Err(ApiError::InvalidResponse { .. })
    );
}

#[tokio::test]
async fn test_empty_body_delete() {
    let server = start_backend().await;
    Mock::given(method("DELETE"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    crate::assert_ok!(client.products().delete(3).await);
}

#[tokio::test]
async fn test_base_url_path_prefix() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/directions"))
        .and(query_param("include_inactive", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Contemporary", "description": null, "is_active": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_at(&format!("{}/api/", server.uri()));
    let directions = crate::assert_ok!(client.directions().list(true).await);
    assert_eq!(directions.len(), 1);
    assert!(!directions[0].is_active);
}

#[tokio::test]
async fn test_guard_sees_every_outcome() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payments"))
        .respond_with(detail(401, "Not authenticated"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.set_credential("abc");
    let recorder = Arc::new(Recorder::default());
    let handle = client.register_guard(recorder.clone());
    assert!(handle.is_active());
    assert_eq!(client.guard_count(), 1);

    crate::assert_ok!(client.products().list().await);
    crate::assert_err!(client.payments().list().await, ApiError::Unauthorized { .. });

    handle.eject();
    assert_eq!(client.guard_count(), 0);
    crate::assert_ok!(client.products().list().await);

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("/products".to_string(), Some(200), Some("abc".to_string())),
            ("/payments".to_string(), Some(401), Some("abc".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_guard_sees_network_failures() {
    let client = client_at(&closed_port_url());
    let recorder = Arc::new(Recorder::default());
    let _handle = client.register_guard(recorder.clone());

    crate::assert_err!(client.users().list().await, ApiError::Network { .. });

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("/users".to_string(), None, None)]);
}
