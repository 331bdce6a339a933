//! Per-room conversation state driven by NLU dialog outcomes.
//!
//! Each room owns one slot in the shared key-value store: a timestamp while a
//! multi-turn dialog is active, JSON null otherwise. Entries are nulled on
//! stop, never deleted. The tracker also hands out a per-room async lock so
//! the read-state / NLU-call / write-state sequence for one room never
//! interleaves with another message in the same room.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::{
    base::types::{DialogAction, DialogOutcome, Res},
    service::db::DbClient,
};

/// Result of applying a dialog outcome to a room's conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The conversation is now active (started or refreshed).
    Started,
    /// The conversation was cleared.
    Stopped,
    /// No state was written.
    Unchanged,
}

/// Tracks which rooms currently have an active multi-turn dialog.
#[derive(Clone)]
pub struct DialogTracker {
    db: DbClient,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl DialogTracker {
    pub fn new(db: DbClient) -> Self {
        Self {
            db,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The store key holding a room's conversation state.
    pub fn conversation_key(room_id: &str) -> String {
        format!("conversation-{room_id}")
    }

    /// Acquires the room's message-handling lock.
    ///
    /// Held across the full filter / NLU / state-write sequence so consecutive
    /// messages in one room observe each other's writes. Locks for different
    /// rooms are independent.
    pub async fn lock_room(&self, room_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room_id.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    /// Whether the room has an active conversation.
    ///
    /// A room that has never had a dialog has no entry, which reads the same
    /// as an explicit null.
    pub async fn is_active(&self, room_id: &str) -> Res<bool> {
        let state = self.db.get(&Self::conversation_key(room_id)).await?;

        Ok(state.is_some_and(|value| !value.is_null()))
    }

    /// Applies a dialog outcome to the room's conversation state.
    pub async fn apply(&self, room_id: &str, outcome: &DialogOutcome) -> Res<Transition> {
        let key = Self::conversation_key(room_id);

        let transition = match outcome.action() {
            DialogAction::Continue => {
                info!("Starting conversation for {}.", key);
                self.db.set(&key, Value::from(chrono::Utc::now().timestamp_millis())).await?;
                Transition::Started
            }
            DialogAction::Stop => {
                info!("Stopping conversation for {}.", key);
                self.db.set(&key, Value::Null).await?;
                Transition::Stopped
            }
            DialogAction::Inert => {
                debug!("Unrecognized dialog outcome for {}; state untouched.", key);
                Transition::Unchanged
            }
        };

        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn tracker() -> DialogTracker {
        let db = DbClient::surreal_memory().await.expect("in-memory store");
        DialogTracker::new(db)
    }

    #[test]
    fn conversation_key_is_derived_from_the_room() {
        assert_eq!(DialogTracker::conversation_key("r1"), "conversation-r1");
    }

    #[tokio::test]
    async fn rooms_start_inactive() {
        let tracker = tracker().await;

        assert!(!tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn continue_outcome_activates_the_room() {
        let tracker = tracker().await;

        let transition = tracker.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();

        assert_eq!(transition, Transition::Started);
        assert!(tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn consecutive_continue_outcomes_stay_active() {
        let tracker = tracker().await;

        tracker.apply("r1", &DialogOutcome::ConfirmIntent).await.unwrap();
        let transition = tracker.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();

        assert_eq!(transition, Transition::Started);
        assert!(tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn fulfilled_clears_any_prior_state() {
        let tracker = tracker().await;

        tracker.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();
        let transition = tracker.apply("r1", &DialogOutcome::Fulfilled).await.unwrap();

        assert_eq!(transition, Transition::Stopped);
        assert!(!tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn stop_on_an_inactive_room_is_a_noop_transition() {
        let tracker = tracker().await;

        let transition = tracker.apply("r1", &DialogOutcome::Failed).await.unwrap();

        assert_eq!(transition, Transition::Stopped);
        assert!(!tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn unrecognized_outcome_leaves_state_untouched() {
        let tracker = tracker().await;

        tracker.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();
        let transition = tracker.apply("r1", &DialogOutcome::Unrecognized).await.unwrap();

        assert_eq!(transition, Transition::Unchanged);
        assert!(tracker.is_active("r1").await.unwrap());
    }

    #[tokio::test]
    async fn rooms_are_tracked_independently() {
        let tracker = tracker().await;

        tracker.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();

        assert!(tracker.is_active("r1").await.unwrap());
        assert!(!tracker.is_active("r2").await.unwrap());
    }
}
