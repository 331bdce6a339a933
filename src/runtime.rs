//! Runtime services and shared state for lex-relay.

use tracing::instrument;

use crate::base::config::Config;
use crate::base::types::{Res, Void};
use crate::interaction::dialog::DialogTracker;
use crate::service::{chat::ChatClient, db::DbClient, nlu::NluClient};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the state store, dialog tracker, NLU client, chat
/// client, and configuration. It is designed to be trivially cloneable,
/// allowing it to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The conversation-state store.
    pub db: DbClient,
    /// The per-room dialog tracker.
    pub dialog: DialogTracker,
    /// The NLU client instance.
    pub nlu: NluClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the state store and the dialog tracker over it.
        let db = DbClient::surreal(&config).await?;
        let dialog = DialogTracker::new(db.clone());

        // Initialize the NLU client.
        let nlu = NluClient::lex(&config).await?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, dialog.clone(), nlu.clone()).await?;

        Ok(Self { config, db, dialog, nlu, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
