// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, runtime configuration parsing, and secret validation
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment
//!
//! Secrets are mandatory: a missing `SESSION_SECRET`, `ADMIN_EMAIL`, or
//! `ADMIN_PASSWORD_HASH` is a fatal startup error rather than a silent
//! fallback to insecure defaults.

use crate::constants::{env_config, limits};
use crate::models::AdminIdentity;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for security-sensitive defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Authentication and token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token signing secret
    #[serde(skip_serializing)]
    pub session_secret: String,
    /// Session token lifetime in hours
    pub session_expiry_hours: i64,
}

/// Login throttling and cookie policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Consecutive failures from one address before lockout
    pub max_login_attempts: u32,
    /// Lockout duration in minutes
    pub lockout_duration_minutes: i64,
    /// Artificial delay before failed-login responses, in milliseconds
    pub failed_login_delay_ms: u64,
    /// Whether cookies carry the `Secure` attribute
    pub secure_cookies: bool,
    /// Whether `X-Forwarded-For` from the front proxy may be trusted for
    /// client addresses; when false, throttling keys on the socket peer
    pub trusted_proxy: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: limits::MAX_LOGIN_ATTEMPTS,
            lockout_duration_minutes: limits::LOCKOUT_DURATION_MINUTES,
            failed_login_delay_ms: limits::FAILED_LOGIN_DELAY_MS,
            secure_cookies: true,
            trusted_proxy: false,
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Administrator identity
    pub admin: AdminIdentity,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Security settings
    pub security: SecurityConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET`, `ADMIN_EMAIL`, or
    /// `ADMIN_PASSWORD_HASH` is unset, or if the secret is shorter than the
    /// minimum accepted length. There is deliberately no insecure default.
    pub fn from_env() -> Result<Self> {
        let session_secret = env_config::session_secret()
            .context("SESSION_SECRET must be set; refusing to start with a default secret")?;
        if session_secret.len() < limits::MIN_SESSION_SECRET_BYTES {
            bail!(
                "SESSION_SECRET must be at least {} bytes, got {}",
                limits::MIN_SESSION_SECRET_BYTES,
                session_secret.len()
            );
        }

        let admin_email =
            env_config::admin_email().context("ADMIN_EMAIL must be set to the author's email")?;
        let admin_password_hash = env_config::admin_password_hash()
            .context("ADMIN_PASSWORD_HASH must be set to a bcrypt hash of the admin password")?;

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        let log_level = LogLevel::from_str_or_default(
            &env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        );

        let config = Self {
            http_port: env_config::http_port(),
            log_level,
            environment,
            admin: AdminIdentity::new(
                admin_email,
                admin_password_hash,
                env_config::admin_display_name(),
            ),
            auth: AuthConfig {
                session_secret,
                session_expiry_hours: env_config::session_expiry_hours(),
            },
            security: SecurityConfig {
                max_login_attempts: limits::MAX_LOGIN_ATTEMPTS,
                lockout_duration_minutes: limits::LOCKOUT_DURATION_MINUTES,
                failed_login_delay_ms: limits::FAILED_LOGIN_DELAY_MS,
                secure_cookies: env_config::secure_cookies(),
                trusted_proxy: env_config::trusted_proxy(),
            },
        };

        config.validate();
        Ok(config)
    }

    /// Warn about configurations that are legal but probably unintended
    fn validate(&self) {
        if self.environment.is_production() && !self.security.secure_cookies {
            warn!("SECURE_COOKIES is disabled in production; session cookies will be sent over plain HTTP");
        }
        if self.auth.session_expiry_hours > limits::SESSION_EXPIRY_HOURS {
            warn!(
                "session expiry of {}h exceeds the default {}h window",
                self.auth.session_expiry_hours,
                limits::SESSION_EXPIRY_HOURS
            );
        }
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} environment={} admin={} session_expiry={}h lockout={}min/{}attempts",
            self.http_port,
            self.environment,
            self.admin.email,
            self.auth.session_expiry_hours,
            self.security.lockout_duration_minutes,
            self.security.max_login_attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default(""),
            Environment::Development
        );
    }

    #[test]
    fn test_auth_config_hides_secret() {
        let auth = AuthConfig {
            session_secret: "a-very-long-secret-that-should-not-leak".into(),
            session_expiry_hours: 24,
        };
        let json = serde_json::to_string(&auth).unwrap();
        assert!(!json.contains("should-not-leak"));
    }
}
