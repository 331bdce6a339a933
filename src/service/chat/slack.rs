//! Slack integration for lex-relay.
//!
//! Listens over socket mode for messages addressed to the bot (app mentions
//! in channels, plus direct messages) and feeds them into the relay pipeline.
//! Replies go back to the originating room as plain channel messages.

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{self, dialog::DialogTracker, trigger::TriggerFilter},
    service::nlu::NluClient,
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, dialog: DialogTracker, nlu: NluClient) -> Res<Self> {
        let client = SlackChatClient::new(config, dialog, nlu).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    trigger: Arc<TriggerFilter>,
    dialog: DialogTracker,
    nlu: NluClient,
    chat: ChatClient,
    bot_user_id: String,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub trigger: Arc<TriggerFilter>,
    pub dialog: DialogTracker,
    pub nlu: NluClient,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, dialog: DialogTracker, nlu: NluClient) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        // The trigger filter strips this literal token off accepted messages.
        let trigger = Arc::new(TriggerFilter::new(config, &format!("<@{bot_user_id}>")));

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            trigger,
            dialog,
            nlu,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            trigger: self.trigger.clone(),
            dialog: self.dialog.clone(),
            nlu: self.nlu.clone(),
            chat: ChatClient::from(self.clone()),
            bot_user_id: self.bot_user_id.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn reply(&self, channel_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            // Only direct messages count as "addressed to the bot" here;
            // channel messages reach us through the app-mention event.
            let is_direct = slack_message_event.origin.channel_type.as_ref().is_some_and(|ct| ct.0 == "im");
            if !is_direct {
                return Ok(());
            }

            // Skip the bot's own messages.
            let Some(user_id) = slack_message_event.sender.user.as_ref().map(|u| u.0.to_owned()) else {
                return Ok(());
            };
            if user_id == user_state.bot_user_id {
                return Ok(());
            }

            let Some(channel_id) = slack_message_event.origin.channel.as_ref().map(|c| c.0.to_owned()) else {
                warn!("Message event without a channel; skipping.");
                return Ok(());
            };

            let text = slack_message_event.content.as_ref().and_then(|c| c.text.to_owned()).unwrap_or_default();
            if text.is_empty() {
                return Ok(());
            }

            info!("Received direct message event ...");

            interaction::chat_event::handle_chat_event(
                user_id,
                channel_id,
                text,
                user_state.trigger.clone(),
                user_state.dialog.clone(),
                user_state.nlu.clone(),
                user_state.chat.clone(),
            );
        }
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");

            let user_id = slack_app_mention_event.user.0.to_owned();
            let channel_id = slack_app_mention_event.channel.0.to_owned();
            let text = slack_app_mention_event.content.text.to_owned().unwrap_or_default();

            if text.is_empty() {
                return Ok(());
            }

            interaction::chat_event::handle_chat_event(
                user_id,
                channel_id,
                text,
                user_state.trigger.clone(),
                user_state.dialog.clone(),
                user_state.nlu.clone(),
                user_state.chat.clone(),
            );
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.

#[cfg(test)]
mod tests {
    // The slack client is a thin wrapper over the platform API; the relay
    // pipeline it feeds is covered by the integration tests with a mocked
    // chat client.
}
