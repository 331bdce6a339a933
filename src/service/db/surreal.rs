//! SurrealDB-backed key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::instrument;

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{DbClient, GenericDbClient};

const NAMESPACE: &str = "lex_relay";
const DATABASE: &str = "brain";
const TABLE: &str = "brain";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Creates a SurrealDB-backed store from configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::connect(&config.db_endpoint, &config.db_username, &config.db_password).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates an in-memory store, useful for tests.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::connect("mem://", "", "").await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// One stored value. The record id is the caller's key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct BrainRecord {
    // SurrealDB stores a null as NONE and drops the field; default it back
    // to `Value::Null` on read so nulled entries round-trip.
    #[serde(default)]
    value: Value,
}

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Connects to the given endpoint (`mem://` for in-process storage) and
    /// selects the relay namespace.
    #[instrument(name = "SurrealDbClient::connect", skip(username, password))]
    pub async fn connect(endpoint: &str, username: &str, password: &str) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        if !username.is_empty() {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(NAMESPACE).use_db(DATABASE).await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    async fn get(&self, key: &str) -> Res<Option<Value>> {
        let record: Option<BrainRecord> = self.db.select((TABLE, key)).await?;

        Ok(record.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: Value) -> Void {
        let _: Option<BrainRecord> = self.db.upsert((TABLE, key)).content(BrainRecord { value }).await?;

        Ok(())
    }
}
