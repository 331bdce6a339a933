pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::base::types::{Res, Void};

// Traits.

/// Generic key-value store trait that clients must implement.
///
/// This is the shared "brain" holding per-room conversation state. Keys are
/// plain strings and values arbitrary JSON; reads and writes for different
/// keys are independent. Implementing this trait allows different storage
/// backends to be used with lex-relay.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the value stored under `key`, if any.
    ///
    /// A key that was never written and a key explicitly set to JSON null are
    /// both "empty" from the caller's perspective; callers that care about the
    /// distinction get `None` vs `Some(Value::Null)`.
    async fn get(&self, key: &str) -> Res<Option<Value>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// Writing `Value::Null` clears the slot without deleting it.
    async fn set(&self, key: &str, value: Value) -> Void;
}

// Structs.

/// Key-value store client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
