//! Library root for `lex-relay`.
//!
//! Lex-relay forwards chat messages addressed to the bot to an AWS Lex bot
//! and relays Lex's reply back to the room:
//! - A trigger filter decides which messages reach Lex (ignore list,
//!   active-conversation flag, start pattern)
//! - A per-room dialog tracker follows Lex's dialog state across turns
//! - Replies (or a fixed fallback on service errors) go back to the room
//!
//! The relay integrates with Slack for chat, SurrealDB for conversation
//! state, and AWS Lex for natural language understanding. The architecture
//! is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the lex-relay runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the state store, NLU, and chat clients
/// - Starts the chat listener for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting lex-relay ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().map_err(|_| anyhow::anyhow!("Failed to install crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
