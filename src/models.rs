// ABOUTME: Core data models for the admin session guard
// ABOUTME: Administrator identity, issued sessions, and dashboard activity records
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Common data structures shared by the auth manager, route handlers, and
//! the activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role encoded into session tokens
///
/// The portfolio site has a single author, so `Admin` is the only role the
/// guard ever issues; the enum keeps the claim forward-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The fixed administrator identity loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Stable administrator id, generated at startup and used as the token subject
    pub id: Uuid,
    /// Administrator email, compared case-sensitively at login
    pub email: String,
    /// Display name shown in the admin dashboard
    pub display_name: String,
    /// Pre-computed bcrypt hash of the administrator password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role issued into session tokens
    pub role: AdminRole,
}

impl AdminIdentity {
    /// Create an identity with a fresh id
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            role: AdminRole::Admin,
        }
    }
}

/// An issued admin session: the signed token plus its metadata
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    /// Administrator id the session was issued for
    pub admin_id: Uuid,
    /// Signed session token
    pub token: String,
    /// Token id (`jti` claim), used to scope CSRF tokens
    pub token_id: Uuid,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
    /// Administrator email
    pub email: String,
}

/// Kinds of authentication activity surfaced in the dashboard feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    LoginSucceeded,
    LoginFailed,
    LockoutTriggered,
    Logout,
    TokenRejected,
}

/// Severity attached to an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySeverity {
    Info,
    Warning,
}

/// A single auth event shown in the admin dashboard activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// What happened
    pub kind: ActivityKind,
    /// Severity level
    pub severity: ActivitySeverity,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Source address the request came from
    pub source_ip: String,
    /// Whether the underlying operation succeeded
    pub success: bool,
    /// Human-readable detail message
    pub detail: String,
}

impl ActivityRecord {
    /// Create a new record stamped with the current time
    #[must_use]
    pub fn new(kind: ActivityKind, source_ip: String, success: bool, detail: String) -> Self {
        let severity = if success {
            ActivitySeverity::Info
        } else {
            ActivitySeverity::Warning
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            timestamp: Utc::now(),
            source_ip,
            success,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_identity_hides_password_hash() {
        let identity = AdminIdentity::new(
            "author@example.com".into(),
            "$2b$12$abcdefghijklmnopqrstuv".into(),
            "Author".into(),
        );
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(json.contains("author@example.com"));
    }

    #[test]
    fn test_activity_record_severity_tracks_outcome() {
        let ok = ActivityRecord::new(
            ActivityKind::LoginSucceeded,
            "127.0.0.1".into(),
            true,
            "logged in".into(),
        );
        assert_eq!(ok.severity, ActivitySeverity::Info);

        let bad = ActivityRecord::new(
            ActivityKind::LoginFailed,
            "127.0.0.1".into(),
            false,
            "bad password".into(),
        );
        assert_eq!(bad.severity, ActivitySeverity::Warning);
    }
}
