//! Conversation store: bounded, ordered turn history per conversation.

use std::collections::VecDeque;

use atlas_core::message::{ConversationId, Role, Turn};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use tracing::debug;

/// In-memory history keyed by conversation.
///
/// Stored history never contains the system prompt; it is prepended fresh by
/// [`ConversationStore::build_context`]. After every append the history is
/// trimmed from the front so at most `cap` turns remain.
pub struct ConversationStore {
    histories: DashMap<ConversationId, VecDeque<Turn>>,
    system_prompt: String,
    cap: usize,
}

impl ConversationStore {
    /// Create a store. A `cap` of 0 is treated as 1.
    pub fn new(system_prompt: impl Into<String>, cap: usize) -> Self {
        Self {
            histories: DashMap::new(),
            system_prompt: system_prompt.into(),
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The only way a history comes into existence; every mutation goes
    /// through here. Do not hold the returned guard across an `.await`.
    pub fn get_or_create(&self, id: &ConversationId) -> RefMut<'_, ConversationId, VecDeque<Turn>> {
        self.histories.entry(id.clone()).or_default()
    }

    pub fn append_user_turn(&self, id: &ConversationId, text: &str) {
        self.append(id, Turn::user(text));
    }

    pub fn append_assistant_turn(&self, id: &ConversationId, text: &str) {
        self.append(id, Turn::assistant(text));
    }

    fn append(&self, id: &ConversationId, turn: Turn) {
        debug_assert!(turn.role() != Role::System);
        let mut history = self.get_or_create(id);
        history.push_back(turn);
        let mut dropped = 0;
        while history.len() > self.cap {
            history.pop_front();
            dropped += 1;
        }
        if dropped > 0 {
            debug!(conversation = %id, dropped, kept = history.len(), "Trimmed history to cap");
        }
    }

    /// System persona followed by the stored history, oldest first.
    ///
    /// Read-only: an unknown id yields just the system turn and creates nothing.
    pub fn build_context(&self, id: &ConversationId) -> Vec<Turn> {
        let mut context = Vec::with_capacity(self.cap + 1);
        context.push(Turn::system(self.system_prompt.clone()));
        if let Some(history) = self.histories.get(id) {
            context.extend(history.iter().cloned());
        }
        context
    }

    /// Reset the history to empty.
    pub fn clear(&self, id: &ConversationId) {
        self.get_or_create(id).clear();
    }

    /// Snapshot of the stored turns (no system prompt).
    pub fn history(&self, id: &ConversationId) -> Vec<Turn> {
        self.histories
            .get(id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, id: &ConversationId) -> usize {
        self.histories.get(id).map(|h| h.len()).unwrap_or(0)
    }

    /// Number of conversations that have a history entry.
    pub fn conversation_count(&self) -> usize {
        self.histories.len()
    }
}
