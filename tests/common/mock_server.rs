//! Mock backend helpers for integration tests
//!
//! Wraps wiremock so suites can stand up a fake studio API and point a
//! client at it.

use std::time::Duration;

use serde_json::{json, Value};
use studio_admin::api::ApiClient;
use studio_admin::shared::models::AdminUser;
use studio_admin::shared::AppConfig;
use wiremock::{MockServer, Request, ResponseTemplate};

/// Start an empty mock backend
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock backend
pub fn client_for(server: &MockServer) -> ApiClient {
    client_at(&server.uri())
}

/// Client pointed at an arbitrary base URL
pub fn client_at(base_url: &str) -> ApiClient {
    let config = AppConfig::builder()
        .api_base_url(base_url)
        .request_timeout(Duration::from_secs(5))
        .build()
        .expect("test config");
    ApiClient::new(&config).expect("test client")
}

/// Base URL where nothing is listening
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn admin_json() -> Value {
    json!({"id": 7, "email": "a@b.com", "role": "admin"})
}

pub fn admin_user() -> AdminUser {
    AdminUser {
        id: 7,
        email: "a@b.com".to_string(),
        role: "admin".to_string(),
    }
}

/// Successful `/auth/login` answer carrying `token`
pub fn login_ok(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": admin_json(),
    }))
}

/// Error answer in the backend's `{"detail": ...}` shape
pub fn detail(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": message }))
}

/// `Authorization` header of a recorded request
pub fn bearer_of(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Requests received so far
pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}
