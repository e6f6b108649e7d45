// ABOUTME: Library root for the portfolio admin session guard
// ABOUTME: Exposes authentication, throttling, security, and HTTP route modules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Folio Admin Guard
//!
//! Authentication backend for a single-author portfolio and technical-blog
//! site. The guard verifies the administrator's email and bcrypt password
//! hash, issues HS256-signed session tokens with a 24-hour lifetime, and
//! throttles failed logins per client address (five consecutive failures
//! lock an address out for fifteen minutes).
//!
//! ## Architecture
//!
//! - [`auth`] — credential verification and session token issue/verify
//! - [`login_attempts`] — per-address failure tracking and lockout
//! - [`security`] — CSRF tokens and the dashboard activity feed
//! - [`routes`] — axum HTTP handlers (login, verify, logout, probes)
//! - [`config`] — environment-driven configuration, fail-fast on secrets
//! - [`errors`] — unified error codes and JSON error responses
//!
//! All state is process-local; a restart clears throttling and CSRF
//! state, while issued tokens remain valid until expiry as long as the
//! signing secret is unchanged.

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod login_attempts;
pub mod models;
pub mod routes;
pub mod security;
