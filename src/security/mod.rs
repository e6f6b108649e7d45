// ABOUTME: Security primitives for the admin guard
// ABOUTME: CSRF token management and the dashboard activity feed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Security support: CSRF protection and auth activity records.

pub mod activity;
pub mod csrf;
