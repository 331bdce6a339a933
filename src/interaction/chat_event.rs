//! The relay pipeline: trigger filter, NLU call, state update, reply.

use std::sync::Arc;

use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{FALLBACK_MESSAGE, Void},
    service::{chat::ChatClient, nlu::NluClient},
};

use super::{dialog::DialogTracker, trigger::TriggerFilter};

/// Handles one inbound message addressed to the bot.
///
/// Spawns the pipeline so the chat listener is never blocked on the NLU call;
/// pipeline errors are logged, not propagated.
#[instrument(skip_all)]
pub fn handle_chat_event(user_id: String, channel_id: String, text: String, trigger: Arc<TriggerFilter>, dialog: DialogTracker, nlu: NluClient, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_chat_event(&user_id, &channel_id, &text, &trigger, &dialog, &nlu, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Runs the pipeline for one message.
///
/// The room lock is held for the whole sequence so the state read at the top
/// always reflects the previous message's outcome, and two messages in one
/// room cannot race each other through the NLU call.
#[instrument(skip(text, trigger, dialog, nlu, chat))]
pub async fn process_chat_event(user_id: &str, channel_id: &str, text: &str, trigger: &TriggerFilter, dialog: &DialogTracker, nlu: &NluClient, chat: &ChatClient) -> Void {
    let _guard = dialog.lock_room(channel_id).await;

    let conversation_active = dialog.is_active(channel_id).await?;

    let Some(cleaned) = trigger.evaluate(user_id, text, conversation_active) else {
        return Ok(());
    };

    // The sender id is passed through to the NLU service unmodified; it only
    // scopes the service-side session.
    let reply = match nlu.post_text(user_id, &cleaned).await {
        Ok(reply) => reply,
        Err(err) => {
            // A failed call leaves the conversation state untouched; the next
            // message simply tries again.
            error!("NLU request failed: {}", err);
            chat.reply(channel_id, FALLBACK_MESSAGE).await?;
            return Ok(());
        }
    };

    let transition = dialog.apply(channel_id, &reply.outcome).await?;
    info!("Applied {:?} for {:?}.", transition, reply.outcome);

    if let Some(message) = reply.message.filter(|m| !m.is_empty()) {
        chat.reply(channel_id, &message).await?;
    }

    Ok(())
}
