// ABOUTME: Configuration module for the admin guard
// ABOUTME: Environment-driven server configuration with fail-fast secret handling
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Configuration management.

pub mod environment;
