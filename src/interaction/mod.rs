//! Event handling and message flow for lex-relay.
//!
//! This module provides the relay's own logic, independent of any particular
//! chat platform or NLU provider:
//! - Deciding which messages are forwarded to the NLU service
//! - Tracking per-room conversation state
//! - Composing the filter, NLU call, and reply into one pipeline

pub mod chat_event;
pub mod dialog;
pub mod trigger;
