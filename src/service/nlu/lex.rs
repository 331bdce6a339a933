//! AWS Lex runtime integration.
//!
//! Wraps the Lex `PostText` operation behind the [`GenericNluClient`] trait.
//! Credentials come from the SDK's default provider chain; only the region can
//! be overridden from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lexruntime::{error::DisplayErrorContext, types::DialogState};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{DialogOutcome, NluReply, Res},
};

use super::{GenericNluClient, NluClient};

// Extra methods on `NluClient` applied by the lex implementation.

impl NluClient {
    /// Creates a new AWS Lex NLU client.
    pub async fn lex(config: &Config) -> Res<Self> {
        let client = LexNluClient::new(config).await;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// AWS Lex client implementation.
#[derive(Clone)]
pub struct LexNluClient {
    client: aws_sdk_lexruntime::Client,
    bot_name: String,
    bot_alias: String,
}

impl LexNluClient {
    /// Create a new Lex client from configuration.
    #[instrument(name = "LexNluClient::new", skip_all)]
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.aws_region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;

        Self {
            client: aws_sdk_lexruntime::Client::new(&sdk_config),
            bot_name: config.bot_name.clone(),
            bot_alias: config.bot_alias.clone(),
        }
    }
}

#[async_trait]
impl GenericNluClient for LexNluClient {
    #[instrument(skip(self, text))]
    async fn post_text(&self, user_id: &str, text: &str) -> Res<NluReply> {
        let response = self
            .client
            .post_text()
            .bot_name(&self.bot_name)
            .bot_alias(&self.bot_alias)
            .user_id(user_id)
            .input_text(text)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Lex PostText failed: {}", DisplayErrorContext(&e)))?;

        let outcome = match response.dialog_state() {
            Some(DialogState::ConfirmIntent) => DialogOutcome::ConfirmIntent,
            Some(DialogState::ElicitSlot) => DialogOutcome::ElicitSlot,
            Some(DialogState::ElicitIntent) => DialogOutcome::ElicitIntent,
            Some(DialogState::Failed) => DialogOutcome::Failed,
            Some(DialogState::Fulfilled) => DialogOutcome::Fulfilled,
            Some(DialogState::ReadyForFulfillment) => DialogOutcome::ReadyForFulfillment,
            // Covers absent states and variants newer than this SDK.
            _ => DialogOutcome::Unrecognized,
        };

        info!("Lex dialog state: {:?}.", outcome);

        Ok(NluReply {
            outcome,
            message: response.message().map(str::to_string),
        })
    }
}
