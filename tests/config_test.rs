// ABOUTME: Integration tests for environment-driven server configuration
// ABOUTME: Verifies fail-fast secret handling and env variable parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use folio_admin_guard::config::environment::{Environment, ServerConfig};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "SESSION_SECRET",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD_HASH",
    "ADMIN_DISPLAY_NAME",
    "SESSION_EXPIRY_HOURS",
    "SECURE_COOKIES",
    "TRUSTED_PROXY",
    "HTTP_PORT",
    "ENVIRONMENT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn set_required_env() {
    env::set_var(
        "SESSION_SECRET",
        "a-test-session-secret-of-sufficient-length!!",
    );
    env::set_var("ADMIN_EMAIL", "author@example.com");
    env::set_var("ADMIN_PASSWORD_HASH", "$2b$12$abcdefghijklmnopqrstuv");
}

#[test]
#[serial]
fn missing_session_secret_is_fatal() {
    clear_env();
    env::set_var("ADMIN_EMAIL", "author@example.com");
    env::set_var("ADMIN_PASSWORD_HASH", "$2b$12$abcdefghijklmnopqrstuv");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SESSION_SECRET"));
    clear_env();
}

#[test]
#[serial]
fn short_session_secret_is_fatal() {
    clear_env();
    set_required_env();
    env::set_var("SESSION_SECRET", "too-short");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("at least"));
    clear_env();
}

#[test]
#[serial]
fn missing_admin_credentials_are_fatal() {
    clear_env();
    env::set_var(
        "SESSION_SECRET",
        "a-test-session-secret-of-sufficient-length!!",
    );

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("ADMIN_EMAIL"));
    clear_env();
}

#[test]
#[serial]
fn complete_environment_loads() {
    clear_env();
    set_required_env();
    env::set_var("ADMIN_DISPLAY_NAME", "Author");
    env::set_var("HTTP_PORT", "9090");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("SESSION_EXPIRY_HOURS", "12");
    env::set_var("SECURE_COOKIES", "true");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 9090);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.admin.email, "author@example.com");
    assert_eq!(config.admin.display_name, "Author");
    assert_eq!(config.auth.session_expiry_hours, 12);
    assert!(config.security.secure_cookies);
    clear_env();
}

#[test]
#[serial]
fn defaults_apply_when_optional_vars_are_absent() {
    clear_env();
    set_required_env();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.admin.display_name, "Administrator");
    assert_eq!(config.auth.session_expiry_hours, 24);
    assert_eq!(config.security.max_login_attempts, 5);
    assert_eq!(config.security.lockout_duration_minutes, 15);
    assert!(!config.security.trusted_proxy);
    clear_env();
}

#[test]
#[serial]
fn trusted_proxy_is_opt_in() {
    clear_env();
    set_required_env();
    env::set_var("TRUSTED_PROXY", "true");

    let config = ServerConfig::from_env().unwrap();
    assert!(config.security.trusted_proxy);
    clear_env();
}
