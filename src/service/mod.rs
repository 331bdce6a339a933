//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by lex-relay:
//! - Chat services (e.g., Slack)
//! - Key-value state stores (e.g., SurrealDB)
//! - NLU services (e.g., AWS Lex)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
pub mod nlu;
