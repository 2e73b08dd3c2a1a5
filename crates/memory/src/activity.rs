//! User activity tracker: per-conversation usage counters.

use std::sync::{Arc, Mutex};

use atlas_core::message::ConversationId;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use serde::Serialize;

/// Source of "now" for activity timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Cloning shares the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Raw counters for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub message_count: u64,
    pub ai_query_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// A point-in-time view of a record, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub message_count: u64,
    pub ai_query_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Whole days since first contact, rounded down
    pub days_active: i64,
}

pub struct ActivityTracker {
    records: DashMap<ConversationId, ActivityRecord>,
    clock: Arc<dyn Clock>,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// The only way a record comes into existence: first-seen and last-seen
    /// are both set to now, counters start at zero.
    /// Do not hold the returned guard across an `.await`.
    pub fn get_or_create(&self, id: &ConversationId) -> RefMut<'_, ConversationId, ActivityRecord> {
        self.records.entry(id.clone()).or_insert_with(|| {
            let now = self.clock.now();
            ActivityRecord {
                message_count: 0,
                ai_query_count: 0,
                first_seen: now,
                last_seen: now,
            }
        })
    }

    /// Count an inbound message, command or not.
    pub fn record_message(&self, id: &ConversationId) {
        let now = self.clock.now();
        let mut record = self.get_or_create(id);
        record.message_count += 1;
        record.last_seen = now;
    }

    /// Count a message routed to the completion pipeline. No-op for unknown ids.
    pub fn record_ai_query(&self, id: &ConversationId) {
        if let Some(mut record) = self.records.get_mut(id) {
            record.ai_query_count += 1;
        }
    }

    /// `None` when the conversation has never been seen.
    pub fn summarize(&self, id: &ConversationId) -> Option<ActivitySummary> {
        let record = self.records.get(id)?;
        let elapsed = self.clock.now() - record.first_seen;
        Some(ActivitySummary {
            message_count: record.message_count,
            ai_query_count: record.ai_query_count,
            first_seen: record.first_seen,
            last_seen: record.last_seen,
            days_active: elapsed.num_days().max(0),
        })
    }

    pub fn snapshot(&self, id: &ConversationId) -> Option<ActivityRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    pub fn tracked_count(&self) -> usize {
        self.records.len()
    }
}
