// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Groups limits, env lookups, cookie names, and error messages by concern
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Application constants grouped by domain.

use std::env;

/// Service identity used in token issuer/audience claims and logging
pub mod service_names {
    /// Token issuer claim
    pub const ISSUER: &str = "folio-admin-guard";
    /// Token audience claim (the portfolio admin panel)
    pub const ADMIN_PANEL: &str = "folio-admin-panel";
    /// Service name for structured logging
    pub const SERVICE: &str = "folio-admin-server";
}

/// Numeric limits and policy durations
pub mod limits {
    /// Session token lifetime in hours
    pub const SESSION_EXPIRY_HOURS: i64 = 24;
    /// Consecutive failures from one address before lockout
    pub const MAX_LOGIN_ATTEMPTS: u32 = 5;
    /// Lockout duration in minutes once the failure threshold is hit
    pub const LOCKOUT_DURATION_MINUTES: i64 = 15;
    /// Artificial delay before responding to a failed login, in milliseconds
    pub const FAILED_LOGIN_DELAY_MS: u64 = 500;
    /// Minimum accepted length for the session signing secret, in bytes
    pub const MIN_SESSION_SECRET_BYTES: usize = 32;
    /// CSRF token length in bytes (32 bytes = 256 bits)
    pub const CSRF_TOKEN_BYTES: usize = 32;
    /// Most recent activity records kept for the dashboard feed
    pub const ACTIVITY_FEED_CAPACITY: usize = 200;
}

/// Cookie names shared between login, verify, and logout handlers
pub mod cookies {
    /// Http-only session cookie carrying the signed token
    pub const SESSION: &str = "folio_session";
    /// JS-readable cookie carrying the CSRF token
    pub const CSRF: &str = "folio_csrf";
}

/// Canonical user-facing error messages
pub mod error_messages {
    /// Generic message for any credential failure; never reveals which field was wrong
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    /// Returned when email or password is absent from the request body
    pub const MISSING_CREDENTIALS: &str = "Email and password are required";
    /// Returned alongside the lockout expiry timestamp
    pub const TOO_MANY_ATTEMPTS: &str = "Too many failed login attempts";
    /// Returned when the session cookie is absent or fails verification
    pub const SESSION_INVALID: &str = "Session is missing or invalid";
    /// Returned when the CSRF header is absent or does not match
    pub const CSRF_INVALID: &str = "CSRF token is missing or invalid";
}

/// Environment-based configuration lookups
pub mod env_config {
    use super::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    }

    /// Get the session signing secret; `None` when unset
    #[must_use]
    pub fn session_secret() -> Option<String> {
        env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty())
    }

    /// Get the administrator email; `None` when unset
    #[must_use]
    pub fn admin_email() -> Option<String> {
        env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty())
    }

    /// Get the pre-computed bcrypt hash of the administrator password; `None` when unset
    #[must_use]
    pub fn admin_password_hash() -> Option<String> {
        env::var("ADMIN_PASSWORD_HASH")
            .ok()
            .filter(|s| !s.is_empty())
    }

    /// Get the administrator display name from environment or default
    #[must_use]
    pub fn admin_display_name() -> String {
        env::var("ADMIN_DISPLAY_NAME").unwrap_or_else(|_| "Administrator".to_string())
    }

    /// Get session expiry hours from environment or default
    #[must_use]
    pub fn session_expiry_hours() -> i64 {
        env::var("SESSION_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::limits::SESSION_EXPIRY_HOURS)
    }

    /// Whether cookies should carry the `Secure` attribute (default true outside development)
    #[must_use]
    pub fn secure_cookies() -> bool {
        env::var("SECURE_COOKIES")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true)
    }

    /// Whether the service sits behind a reverse proxy whose
    /// `X-Forwarded-For` header can be trusted (default false)
    #[must_use]
    pub fn trusted_proxy() -> bool {
        env::var("TRUSTED_PROXY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }
}
