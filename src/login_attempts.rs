// ABOUTME: Per-address login attempt tracking with lockout enforcement
// ABOUTME: Owns the synchronized failure-count map consulted by the login endpoint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Login attempt throttling
//!
//! Tracks consecutive failed logins per client address in a synchronized
//! in-memory map. After `max_attempts` failures the address is locked out
//! for `lockout_duration`; the lockout expires on its own and resets the
//! counter. A successful login deletes the address's record entirely.
//!
//! State lives for the lifetime of the process only; a restart clears all
//! throttling state.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

use crate::config::environment::SecurityConfig;

/// Throttling policy: failure threshold and lockout window
#[derive(Debug, Clone, Copy)]
pub struct LoginAttemptPolicy {
    /// Consecutive failures from one address before lockout
    pub max_attempts: u32,
    /// How long a lockout lasts once triggered
    pub lockout_duration: Duration,
}

impl LoginAttemptPolicy {
    /// Build the policy from the server security configuration
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            max_attempts: config.max_login_attempts,
            lockout_duration: Duration::minutes(config.lockout_duration_minutes),
        }
    }
}

impl Default for LoginAttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::limits::MAX_LOGIN_ATTEMPTS,
            lockout_duration: Duration::minutes(
                crate::constants::limits::LOCKOUT_DURATION_MINUTES,
            ),
        }
    }
}

/// Failure history for one client address
#[derive(Debug, Clone)]
struct LoginAttemptRecord {
    /// Consecutive failures since the last success or lockout expiry
    failed_attempts: u32,
    /// Timestamp of the most recent attempt
    last_attempt: DateTime<Utc>,
    /// Lockout expiry, set once `failed_attempts` reaches the threshold
    locked_until: Option<DateTime<Utc>>,
}

/// Decision returned to the login handler before processing credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// Further attempts are allowed; `remaining` counts down to lockout
    Allowed {
        /// Attempts left before the address is locked out
        remaining: u32,
    },
    /// The address is locked out until the given time
    LockedOut {
        /// When the lockout expires
        until: DateTime<Utc>,
    },
}

/// Tracker owning the per-address failure map
///
/// Constructed once at startup and shared through the server state; request
/// handlers never touch ambient globals. Check and record both take the
/// write lock, so the read-check/write-update window the map would otherwise
/// have under parallel requests is closed.
pub struct LoginAttemptTracker {
    policy: LoginAttemptPolicy,
    records: RwLock<HashMap<IpAddr, LoginAttemptRecord>>,
}

impl LoginAttemptTracker {
    /// Create a tracker with the given policy
    #[must_use]
    pub fn new(policy: LoginAttemptPolicy) -> Self {
        Self {
            policy,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// The policy this tracker enforces
    #[must_use]
    pub const fn policy(&self) -> &LoginAttemptPolicy {
        &self.policy
    }

    /// Check whether `addr` may attempt a login right now
    pub async fn check_attempts(&self, addr: IpAddr) -> AttemptDecision {
        self.check_attempts_at(addr, Utc::now()).await
    }

    /// Variant of [`Self::check_attempts`] taking an explicit timestamp
    ///
    /// An expired lockout is removed here, so the next attempt after expiry
    /// sees a fresh counter.
    pub async fn check_attempts_at(&self, addr: IpAddr, now: DateTime<Utc>) -> AttemptDecision {
        let mut records = self.records.write().await;

        let Some(record) = records.get(&addr) else {
            return AttemptDecision::Allowed {
                remaining: self.policy.max_attempts,
            };
        };

        if let Some(until) = record.locked_until {
            if now < until {
                return AttemptDecision::LockedOut { until };
            }
            // Lockout expired: full reset for this address
            records.remove(&addr);
            return AttemptDecision::Allowed {
                remaining: self.policy.max_attempts,
            };
        }

        AttemptDecision::Allowed {
            remaining: self.policy.max_attempts.saturating_sub(record.failed_attempts),
        }
    }

    /// Record the outcome of a login attempt from `addr`
    ///
    /// Success deletes the address's record; failure increments the counter
    /// and starts the lockout when the threshold is reached. Returns the
    /// state after recording so callers can log a newly triggered lockout.
    pub async fn record_attempt(&self, addr: IpAddr, success: bool) -> AttemptDecision {
        self.record_attempt_at(addr, success, Utc::now()).await
    }

    /// Variant of [`Self::record_attempt`] taking an explicit timestamp
    pub async fn record_attempt_at(
        &self,
        addr: IpAddr,
        success: bool,
        now: DateTime<Utc>,
    ) -> AttemptDecision {
        let mut records = self.records.write().await;

        if success {
            records.remove(&addr);
            return AttemptDecision::Allowed {
                remaining: self.policy.max_attempts,
            };
        }

        let record = records.entry(addr).or_insert(LoginAttemptRecord {
            failed_attempts: 0,
            last_attempt: now,
            locked_until: None,
        });

        // An active lockout is left untouched so its expiry stays at
        // lockout start + duration; a stale one resets the counter
        if let Some(until) = record.locked_until {
            if now < until {
                return AttemptDecision::LockedOut { until };
            }
            record.failed_attempts = 0;
            record.locked_until = None;
        }

        record.failed_attempts += 1;
        record.last_attempt = now;

        if record.failed_attempts >= self.policy.max_attempts {
            let until = now + self.policy.lockout_duration;
            record.locked_until = Some(until);
            tracing::warn!(
                address = %addr,
                failed_attempts = record.failed_attempts,
                locked_until = %until.to_rfc3339(),
                "address locked out after repeated login failures"
            );
            return AttemptDecision::LockedOut { until };
        }

        AttemptDecision::Allowed {
            remaining: self
                .policy
                .max_attempts
                .saturating_sub(record.failed_attempts),
        }
    }

    /// Number of addresses currently tracked (failing or locked out)
    pub async fn tracked_addresses(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for LoginAttemptTracker {
    fn default() -> Self {
        Self::new(LoginAttemptPolicy::default())
    }
}
