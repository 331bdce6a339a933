#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use lex_relay::{
    base::{
        config::{Config, ConfigInner},
        types::{DialogOutcome, FALLBACK_MESSAGE, NluReply, Res, Void},
    },
    interaction::{chat_event::process_chat_event, dialog::DialogTracker, trigger::TriggerFilter},
    service::{
        chat::{ChatClient, GenericChatClient},
        db::DbClient,
        nlu::{GenericNluClient, NluClient},
    },
};
use mockall::{mock, predicate::eq};
use serde_json::Value;

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn reply(&self, channel_id: &str, text: &str) -> Void;
    }
}

mock! {
    pub Nlu {}

    #[async_trait]
    impl GenericNluClient for Nlu {
        async fn post_text(&self, user_id: &str, text: &str) -> Res<NluReply>;
    }
}

// Helpers.

fn test_config(ignore_user_ids: &str, start_pattern: Option<&str>) -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            bot_name: "OrderPizza".to_string(),
            bot_alias: "prod".to_string(),
            ignore_user_ids: ignore_user_ids.to_string(),
            start_pattern: start_pattern.map(str::to_string),
            slack_app_token: "xapp-test".to_string(),
            slack_bot_token: "xoxb-test".to_string(),
            db_endpoint: "mem://".to_string(),
            ..Default::default()
        }),
    }
}

fn test_trigger(ignore_user_ids: &str) -> Arc<TriggerFilter> {
    Arc::new(TriggerFilter::new(&test_config(ignore_user_ids, None), "<@U12345>"))
}

async fn test_tracker() -> (DbClient, DialogTracker) {
    let db = DbClient::surreal_memory().await.expect("Failed to create state store");
    let dialog = DialogTracker::new(db.clone());

    (db, dialog)
}

// Tests.

#[tokio::test]
async fn start_phrase_opens_a_dialog_and_relays_the_reply() {
    let (_db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    let mut nlu = MockNlu::new();
    nlu.expect_post_text()
        .with(eq("u1"), eq("lex order pizza"))
        .times(1)
        .returning(|_, _| {
            Ok(NluReply {
                outcome: DialogOutcome::ElicitSlot,
                message: Some("What size?".to_string()),
            })
        });

    let mut chat = MockChat::new();
    chat.expect_reply().with(eq("r1"), eq("What size?")).times(1).returning(|_, _| Ok(()));

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "lex order pizza", &trigger, &dialog, &nlu, &chat).await.unwrap();

    assert!(dialog.is_active("r1").await.unwrap());
}

#[tokio::test]
async fn active_dialog_accepts_text_that_misses_the_start_phrase() {
    let (db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    // A prior ElicitSlot left the room active.
    dialog.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();

    let mut nlu = MockNlu::new();
    nlu.expect_post_text()
        .with(eq("u1"), eq("large, please"))
        .times(1)
        .returning(|_, _| {
            Ok(NluReply {
                outcome: DialogOutcome::Fulfilled,
                message: Some("Your order is placed.".to_string()),
            })
        });

    let mut chat = MockChat::new();
    chat.expect_reply().with(eq("r1"), eq("Your order is placed.")).times(1).returning(|_, _| Ok(()));

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "large, please", &trigger, &dialog, &nlu, &chat).await.unwrap();

    // Fulfilled nulls the slot rather than deleting it.
    assert!(!dialog.is_active("r1").await.unwrap());
    assert_eq!(db.get("conversation-r1").await.unwrap(), Some(Value::Null));
}

#[tokio::test]
async fn ignored_senders_never_reach_the_nlu_service() {
    let (_db, dialog) = test_tracker().await;
    let trigger = test_trigger("blocked1");

    // Even an active dialog does not override the ignore list.
    dialog.apply("r1", &DialogOutcome::ElicitSlot).await.unwrap();

    let mut nlu = MockNlu::new();
    nlu.expect_post_text().times(0);

    let mut chat = MockChat::new();
    chat.expect_reply().times(0);

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("BLOCKED1", "r1", "lex order pizza", &trigger, &dialog, &nlu, &chat).await.unwrap();
}

#[tokio::test]
async fn nlu_failure_sends_the_fallback_and_keeps_state() {
    let (db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    dialog.apply("r1", &DialogOutcome::ConfirmIntent).await.unwrap();
    let before = db.get("conversation-r1").await.unwrap();

    let mut nlu = MockNlu::new();
    nlu.expect_post_text().times(1).returning(|_, _| Err(anyhow::anyhow!("connection reset")));

    let mut chat = MockChat::new();
    chat.expect_reply().with(eq("r1"), eq(FALLBACK_MESSAGE)).times(1).returning(|_, _| Ok(()));

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "yes", &trigger, &dialog, &nlu, &chat).await.unwrap();

    assert!(dialog.is_active("r1").await.unwrap());
    assert_eq!(db.get("conversation-r1").await.unwrap(), before);
}

#[tokio::test]
async fn unrelated_messages_are_dropped_silently() {
    let (db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    let mut nlu = MockNlu::new();
    nlu.expect_post_text().times(0);

    let mut chat = MockChat::new();
    chat.expect_reply().times(0);

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "good morning everyone", &trigger, &dialog, &nlu, &chat).await.unwrap();

    assert_eq!(db.get("conversation-r1").await.unwrap(), None);
}

#[tokio::test]
async fn replies_without_text_are_not_relayed() {
    let (_db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    let mut nlu = MockNlu::new();
    nlu.expect_post_text().times(1).returning(|_, _| {
        Ok(NluReply {
            outcome: DialogOutcome::ReadyForFulfillment,
            message: None,
        })
    });

    let mut chat = MockChat::new();
    chat.expect_reply().times(0);

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "lex checkout", &trigger, &dialog, &nlu, &chat).await.unwrap();

    assert!(!dialog.is_active("r1").await.unwrap());
}

#[tokio::test]
async fn mention_prefix_is_stripped_before_forwarding() {
    let (_db, dialog) = test_tracker().await;
    let trigger = test_trigger("");

    let mut nlu = MockNlu::new();
    nlu.expect_post_text().with(eq("u1"), eq("lex hello")).times(1).returning(|_, _| {
        Ok(NluReply {
            outcome: DialogOutcome::Fulfilled,
            message: None,
        })
    });

    let mut chat = MockChat::new();
    chat.expect_reply().times(0);

    let nlu = NluClient::new(Arc::new(nlu));
    let chat = ChatClient::new(Arc::new(chat));

    process_chat_event("u1", "r1", "<@U12345> lex hello", &trigger, &dialog, &nlu, &chat).await.unwrap();
}
