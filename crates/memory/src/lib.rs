//! Per-conversation state for Atlas.
//!
//! Both stores live for the lifetime of the process and are never persisted.
//! They are constructed once at startup and shared behind `Arc`.

pub mod activity;
pub mod conversation;

pub use activity::{
    ActivityRecord, ActivitySummary, ActivityTracker, Clock, ManualClock, SystemClock,
};
pub use conversation::ConversationStore;
