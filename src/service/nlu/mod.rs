pub mod lex;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{NluReply, Res};

// Traits.

/// Generic NLU client trait that clients must implement.
///
/// This trait defines the single operation the relay needs from a natural
/// language understanding service: hand over one message of user text and get
/// back a dialog status plus optional reply text. Implementing this trait
/// allows different NLU providers to be used with lex-relay.
#[async_trait]
pub trait GenericNluClient: Send + Sync + 'static {
    /// Sends one message of user text to the NLU service.
    ///
    /// `user_id` scopes the service-side dialog session and is passed through
    /// opaquely. One call per accepted message; no batching, no retries.
    async fn post_text(&self, user_id: &str, text: &str) -> Res<NluReply>;
}

// Structs.

/// NLU client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct NluClient {
    inner: Arc<dyn GenericNluClient>,
}

impl Deref for NluClient {
    type Target = dyn GenericNluClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl NluClient {
    pub fn new(inner: Arc<dyn GenericNluClient>) -> Self {
        Self { inner }
    }
}
