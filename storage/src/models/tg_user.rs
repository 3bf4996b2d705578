//! Chat-user record: one row per participant that has ever messaged the bot.
//!
//! `is_banned` here is the single source of truth consulted before rendering
//! ticket controls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TgUserRecord {
    pub tg_id: i64,
    pub tg_username: Option<String>,
    pub is_banned: bool,
}
