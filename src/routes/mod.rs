// ABOUTME: HTTP route organization and shared server state
// ABOUTME: Assembles the axum router and the resource container handlers receive
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # HTTP Routes
//!
//! The router exposes the admin auth endpoints plus liveness probes. All
//! handlers receive one [`ServerResources`] container as axum state; there
//! are no ambient globals.

pub mod auth;
pub mod health;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::login_attempts::{LoginAttemptPolicy, LoginAttemptTracker};
use crate::security::activity::ActivityLog;
use crate::security::csrf::CsrfTokenManager;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body size; login payloads are tiny
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Container for all server-wide shared resources
///
/// Constructed once at startup from the loaded configuration and shared
/// with every handler through `Arc`.
pub struct ServerResources {
    /// Server configuration
    pub config: ServerConfig,
    /// Session token issuance and validation
    pub auth_manager: AuthManager,
    /// Per-address login throttling state
    pub login_attempts: LoginAttemptTracker,
    /// CSRF tokens issued alongside sessions
    pub csrf_tokens: CsrfTokenManager,
    /// Dashboard activity feed
    pub activity: ActivityLog,
}

impl ServerResources {
    /// Build the resource container from configuration
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let auth_manager = AuthManager::new(
            config.auth.session_secret.as_bytes(),
            config.auth.session_expiry_hours,
        );
        let login_attempts =
            LoginAttemptTracker::new(LoginAttemptPolicy::from_config(&config.security));
        let csrf_tokens =
            CsrfTokenManager::new(chrono::Duration::hours(config.auth.session_expiry_hours));

        Self {
            config,
            auth_manager,
            login_attempts,
            csrf_tokens,
            activity: ActivityLog::default(),
        }
    }
}

/// Assemble the application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/verify", get(auth::verify))
        .route("/api/admin/logout", post(auth::logout))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(resources)
}
