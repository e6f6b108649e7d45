// ABOUTME: Admin authentication HTTP handlers for login, verify, and logout
// ABOUTME: Owns cookie issuance, throttling checks, and CSRF enforcement at the HTTP boundary
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Admin authentication endpoints.
//!
//! Login issues an http-only session cookie plus a JS-readable CSRF cookie;
//! verify decodes the session cookie; logout requires the CSRF token back
//! in a header and clears both cookies. Credential failures share one
//! generic message and are throttled per client address.

use crate::constants::{cookies, error_messages};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::login_attempts::AttemptDecision;
use crate::models::{ActivityKind, ActivityRecord};
use crate::routes::ServerResources;
use axum::extract::{ConnectInfo, State};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, COOKIE, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Header the admin panel echoes the CSRF token back in
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Login request payload
///
/// Fields are optional so an absent field surfaces as a 400 with our error
/// body rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Administrator identity as returned to the admin panel
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// Successful login response body
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub admin: AdminProfile,
    pub expires_at: DateTime<Utc>,
}

/// Successful verify response body
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub authenticated: bool,
    pub admin: AdminProfile,
    pub expires_at: DateTime<Utc>,
}

/// Logout response body
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Handle `POST /api/admin/login`
///
/// # Errors
///
/// 400 when email or password is absent, 429 while the client address is
/// locked out, 401 with a generic message on bad credentials.
pub async fn login(
    State(resources): State<Arc<ServerResources>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> AppResult<Response> {
    let source_ip = client_addr(&headers, peer, resources.config.security.trusted_proxy);

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(AppError::missing_field(error_messages::MISSING_CREDENTIALS));
        }
    };

    if let AttemptDecision::LockedOut { until } =
        resources.login_attempts.check_attempts(source_ip).await
    {
        tracing::warn!(
            address = %source_ip,
            locked_until = %until.to_rfc3339(),
            "login attempt rejected during lockout"
        );
        return Err(AppError::rate_limit_exceeded(until));
    }

    let session = match resources
        .auth_manager
        .authenticate(&resources.config.admin, &email, &password, source_ip)
        .await
    {
        Ok(session) => session,
        Err(err) if err.code == ErrorCode::AuthInvalid => {
            // Bookkeeping first: the failure must count before the delayed
            // response, or attempts landing inside the delay window would
            // all clear the throttle check
            let decision = resources
                .login_attempts
                .record_attempt(source_ip, false)
                .await;
            record_failure(&resources, source_ip, &decision).await;

            // Flat delay on every credential failure blunts timing probes
            tokio::time::sleep(Duration::from_millis(
                resources.config.security.failed_login_delay_ms,
            ))
            .await;

            return Err(err);
        }
        Err(err) => return Err(err),
    };

    resources
        .login_attempts
        .record_attempt(source_ip, true)
        .await;
    let csrf_token = resources.csrf_tokens.generate_token(session.token_id).await;
    resources
        .activity
        .record_login(
            source_ip.to_string(),
            true,
            format!("administrator {} logged in", session.email),
        )
        .await;

    let max_age = resources.config.auth.session_expiry_hours * 3600;
    let secure = resources.config.security.secure_cookies;
    let response = (
        AppendHeaders([
            (
                SET_COOKIE,
                session_cookie(&session.token, max_age, secure),
            ),
            (SET_COOKIE, csrf_cookie(&csrf_token, max_age, secure)),
        ]),
        Json(LoginResponse {
            admin: profile(&resources),
            expires_at: session.expires_at,
        }),
    );
    Ok(response.into_response())
}

/// Handle `GET /api/admin/verify`
///
/// # Errors
///
/// 401 when the session cookie is absent, expired, or fails validation.
pub async fn verify(
    State(resources): State<Arc<ServerResources>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> AppResult<Json<VerifyResponse>> {
    let source_ip = client_addr(&headers, peer, resources.config.security.trusted_proxy);
    let claims = session_claims(&resources, &headers, source_ip).await?;

    Ok(Json(VerifyResponse {
        authenticated: true,
        admin: profile(&resources),
        expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
    }))
}

/// Handle `POST /api/admin/logout`
///
/// # Errors
///
/// 401 when the session is invalid or the `X-CSRF-Token` header is absent
/// or does not match the session.
pub async fn logout(
    State(resources): State<Arc<ServerResources>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let source_ip = client_addr(&headers, peer, resources.config.security.trusted_proxy);
    let claims = session_claims(&resources, &headers, source_ip).await?;

    let csrf_token = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::auth_invalid(error_messages::CSRF_INVALID))?;
    resources
        .csrf_tokens
        .validate_token(csrf_token, claims.jti)
        .await
        .map_err(|_| AppError::auth_invalid(error_messages::CSRF_INVALID))?;
    resources.csrf_tokens.invalidate_token(csrf_token).await;

    resources
        .activity
        .record(ActivityRecord::new(
            ActivityKind::Logout,
            source_ip.to_string(),
            true,
            format!("administrator {} logged out", claims.email),
        ))
        .await;

    let secure = resources.config.security.secure_cookies;
    let response = (
        AppendHeaders([
            (SET_COOKIE, expired_cookie(cookies::SESSION, true, secure)),
            (SET_COOKIE, expired_cookie(cookies::CSRF, false, secure)),
        ]),
        Json(LogoutResponse { success: true }),
    );
    Ok(response.into_response())
}

/// Decode and validate the session cookie, recording rejections
async fn session_claims(
    resources: &ServerResources,
    headers: &HeaderMap,
    source_ip: IpAddr,
) -> AppResult<crate::auth::Claims> {
    let token =
        cookie_value(headers, cookies::SESSION).ok_or_else(AppError::auth_required)?;

    match resources.auth_manager.verify_token(&token) {
        Ok(claims) => Ok(claims),
        Err(validation_error) => {
            resources
                .activity
                .record(ActivityRecord::new(
                    ActivityKind::TokenRejected,
                    source_ip.to_string(),
                    false,
                    validation_error.to_string(),
                ))
                .await;
            Err(match validation_error {
                crate::auth::JwtValidationError::TokenExpired { .. } => AppError::auth_expired(),
                _ => AppError::auth_invalid(error_messages::SESSION_INVALID),
            })
        }
    }
}

/// Record a failed attempt in the activity feed, flagging a fresh lockout
async fn record_failure(
    resources: &ServerResources,
    source_ip: IpAddr,
    decision: &AttemptDecision,
) {
    let record = match decision {
        AttemptDecision::LockedOut { until } => ActivityRecord::new(
            ActivityKind::LockoutTriggered,
            source_ip.to_string(),
            false,
            format!("address locked out until {}", until.to_rfc3339()),
        ),
        AttemptDecision::Allowed { remaining } => ActivityRecord::new(
            ActivityKind::LoginFailed,
            source_ip.to_string(),
            false,
            format!("invalid credentials, {remaining} attempts remaining"),
        ),
    };
    resources.activity.record(record).await;
}

fn profile(resources: &ServerResources) -> AdminProfile {
    let admin = &resources.config.admin;
    AdminProfile {
        id: admin.id,
        email: admin.email.clone(),
        display_name: admin.display_name.clone(),
        role: admin.role.to_string(),
    }
}

/// Resolve the client address throttling keys on
///
/// `X-Forwarded-For` is client-controlled unless a trusted front proxy
/// overwrites it, so the header is honored only when the deployment says
/// one exists; otherwise a direct client could mint a fresh address per
/// attempt and sidestep the lockout.
fn client_addr(headers: &HeaderMap, peer: SocketAddr, trusted_proxy: bool) -> IpAddr {
    if !trusted_proxy {
        return peer.ip();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .unwrap_or_else(|| peer.ip())
}

/// Extract a named cookie from the `Cookie` header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "{}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}{}",
        cookies::SESSION,
        secure_suffix(secure)
    )
}

fn csrf_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    // Deliberately not HttpOnly: the admin panel reads it to set the header
    format!(
        "{}={token}; SameSite=Strict; Path=/; Max-Age={max_age_secs}{}",
        cookies::CSRF,
        secure_suffix(secure)
    )
}

fn expired_cookie(name: &str, http_only: bool, secure: bool) -> String {
    format!(
        "{name}=; {}SameSite=Strict; Path=/; Max-Age=0{}",
        if http_only { "HttpOnly; " } else { "" },
        secure_suffix(secure)
    )
}

const fn secure_suffix(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}
