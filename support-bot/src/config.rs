//! App config: Telegram connection, review channel, database, logging,
//! optional Airtable directory. Loaded from env.

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// SUPPORT_CHAT_ID: the single review channel all tickets land in
    pub support_chat_id: i64,
    /// DATABASE_URL (SQLite file path)
    pub database_url: String,
    /// LOG_FILE
    pub log_file: String,
    /// Present when all AIRTABLE_* vars are set; otherwise the static
    /// directory is used.
    pub airtable: Option<AirtableConfig>,
}

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

impl RelayConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if
    /// provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let support_chat_id = env::var("SUPPORT_CHAT_ID")
            .map_err(|_| anyhow::anyhow!("SUPPORT_CHAT_ID not set"))?
            .parse()
            .map_err(|_| anyhow::anyhow!("SUPPORT_CHAT_ID is not a valid chat id"))?;
        let database_url = Self::database_url_from_env();
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/support-bot.log".to_string());

        let airtable = match (
            env::var("AIRTABLE_API_KEY"),
            env::var("AIRTABLE_BASE_ID"),
            env::var("AIRTABLE_TABLE_NAME"),
        ) {
            (Ok(api_key), Ok(base_id), Ok(table_name)) => Some(AirtableConfig {
                api_key,
                base_id,
                table_name,
            }),
            _ => None,
        };

        Ok(Self {
            bot_token,
            support_chat_id,
            database_url,
            log_file,
            airtable,
        })
    }

    /// DATABASE_URL with its default. Administrative subcommands that never
    /// talk to Telegram use this instead of a full config load.
    pub fn database_url_from_env() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "./support_relay.db".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if self.support_chat_id == 0 {
            anyhow::bail!("SUPPORT_CHAT_ID must be a real chat id");
        }
        Ok(())
    }
}
