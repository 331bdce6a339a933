//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default endpoint for the conversation-state store.
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

/// Configuration for the lex-relay application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Name of the Lex bot (`BOT_NAME`). Required.
    pub bot_name: String,
    /// Alias of the Lex bot (`BOT_ALIAS`). Required.
    pub bot_alias: String,
    /// AWS region override for the Lex client (`AWS_REGION`).
    /// When unset, the SDK's default provider chain decides.
    #[serde(default)]
    pub aws_region: Option<String>,
    /// Comma-separated sender ids to always ignore (`IGNORE_USER_IDS`).
    /// Matched case-insensitively.
    #[serde(default)]
    pub ignore_user_ids: String,
    /// Pattern that starts a new dialog (`START_PATTERN`).
    /// Falls back to the default `lex` trigger when unset or invalid.
    #[serde(default)]
    pub start_pattern: Option<String>,
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Conversation-state store endpoint (`DB_ENDPOINT`).
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Store username (`DB_USERNAME`); empty means no authentication.
    #[serde(default)]
    pub db_username: String,
    /// Store password (`DB_PASSWORD`).
    #[serde(default)]
    pub db_password: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("LEX_RELAY"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.bot_name.is_empty() {
            return Err(anyhow::anyhow!("Lex bot name must be specified."));
        }

        if result.bot_alias.is_empty() {
            return Err(anyhow::anyhow!("Lex bot alias must be specified."));
        }

        Ok(result)
    }
}
