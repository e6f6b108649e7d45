// ABOUTME: Shared helpers for integration tests
// ABOUTME: Test configuration, router construction, and request/cookie utilities
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::Router;
use folio_admin_guard::config::environment::{
    AuthConfig, Environment, LogLevel, SecurityConfig, ServerConfig,
};
use folio_admin_guard::models::AdminIdentity;
use folio_admin_guard::routes::{router, ServerResources};
use http::header::{CONTENT_TYPE, SET_COOKIE};
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::sync::Arc;

pub const TEST_EMAIL: &str = "author@example.com";
pub const TEST_PASSWORD: &str = "correct horse battery staple";
pub const TEST_SECRET: &str = "an-integration-test-secret-at-least-32-bytes-long";

/// Configuration for tests: real identity, zero failure delay, plain cookies
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        log_level: LogLevel::Info,
        environment: Environment::Testing,
        admin: AdminIdentity::new(
            TEST_EMAIL.into(),
            // cost 4 keeps the hash fast enough for tests
            bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
            "Author".into(),
        ),
        auth: AuthConfig {
            session_secret: TEST_SECRET.into(),
            session_expiry_hours: 24,
        },
        security: SecurityConfig {
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
            failed_login_delay_ms: 0,
            secure_cookies: false,
            trusted_proxy: false,
        },
    }
}

/// Build an app router plus a handle on its shared resources
pub fn test_app() -> (Arc<ServerResources>, Router) {
    let resources = Arc::new(ServerResources::new(test_config()));
    let app = router(Arc::clone(&resources));
    (resources, app)
}

/// Build a request carrying the peer address handlers resolve clients from
pub fn request(method: Method, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    request_from(method, uri, body, "127.0.0.1:4000")
}

/// Variant of [`request`] with an explicit peer address
pub fn request_from(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    peer: &str,
) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    let mut request = builder
        .body(body.map_or_else(Body::empty, |json| Body::from(json.to_string())))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

/// A login request for the fixed test administrator
pub fn login_request(email: &str, password: &str) -> Request<Body> {
    request(
        Method::POST,
        "/api/admin/login",
        Some(serde_json::json!({ "email": email, "password": password })),
    )
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` values on a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Extract a named cookie's value from `Set-Cookie` headers
pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response).iter().find_map(|cookie| {
        let (pair, _) = cookie.split_once(';')?;
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
