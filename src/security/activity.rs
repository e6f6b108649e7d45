// ABOUTME: In-memory activity feed of authentication events for the admin dashboard
// ABOUTME: Records login outcomes, lockouts, and logouts, and mirrors them to structured logs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Auth Activity Feed
//!
//! Every authentication outcome is recorded twice: once into a bounded
//! in-memory ring buffer the dashboard reads, and once through `tracing`
//! with structured fields for operators. The feed is process-local and
//! clears on restart, like the rest of the guard's state.

use crate::constants::limits;
use crate::models::{ActivityKind, ActivityRecord, ActivitySeverity};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Bounded, most-recent-first feed of auth activity
pub struct ActivityLog {
    records: RwLock<VecDeque<ActivityRecord>>,
    capacity: usize,
}

impl ActivityLog {
    /// Create a feed holding at most `capacity` records
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record an auth event, evicting the oldest record when full
    pub async fn record(&self, record: ActivityRecord) {
        match record.severity {
            ActivitySeverity::Info => {
                tracing::info!(
                    record_id = %record.id,
                    kind = ?record.kind,
                    source_ip = %record.source_ip,
                    success = record.success,
                    "auth activity: {}",
                    record.detail
                );
            }
            ActivitySeverity::Warning => {
                tracing::warn!(
                    record_id = %record.id,
                    kind = ?record.kind,
                    source_ip = %record.source_ip,
                    success = record.success,
                    "auth activity: {}",
                    record.detail
                );
            }
        }

        // Zero-capacity feeds keep the log emission but store nothing
        if self.capacity == 0 {
            return;
        }

        let mut records = self.records.write().await;
        while records.len() >= self.capacity {
            records.pop_back();
        }
        records.push_front(record);
    }

    /// Convenience: record a login outcome from the login handler
    pub async fn record_login(&self, source_ip: String, success: bool, detail: String) {
        let kind = if success {
            ActivityKind::LoginSucceeded
        } else {
            ActivityKind::LoginFailed
        };
        self.record(ActivityRecord::new(kind, source_ip, success, detail))
            .await;
    }

    /// The most recent records, newest first, up to `limit`
    pub async fn recent(&self, limit: usize) -> Vec<ActivityRecord> {
        let records = self.records.read().await;
        records.iter().take(limit).cloned().collect()
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the feed is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(limits::ACTIVITY_FEED_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_are_newest_first() {
        let log = ActivityLog::default();
        log.record_login("127.0.0.1".into(), false, "first".into())
            .await;
        log.record_login("127.0.0.1".into(), true, "second".into())
            .await;

        let recent = log.recent(10).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].detail, "second");
        assert_eq!(recent[1].detail, "first");
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.record_login("127.0.0.1".into(), true, format!("event {i}"))
                .await;
        }

        assert_eq!(log.len().await, 3);
        let recent = log.recent(10).await;
        assert_eq!(recent[0].detail, "event 4");
        assert_eq!(recent[2].detail, "event 2");
    }

    #[tokio::test]
    async fn zero_capacity_feed_stores_nothing() {
        let log = ActivityLog::new(0);
        for _ in 0..3 {
            log.record_login("127.0.0.1".into(), true, "event".into())
                .await;
        }

        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn lockout_records_are_warnings() {
        let log = ActivityLog::default();
        log.record(ActivityRecord::new(
            ActivityKind::LockoutTriggered,
            "203.0.113.7".into(),
            false,
            "locked out".into(),
        ))
        .await;

        let recent = log.recent(1).await;
        assert_eq!(recent[0].severity, ActivitySeverity::Warning);
    }
}
