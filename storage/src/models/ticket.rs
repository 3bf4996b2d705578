//! Ticket record: one tracked customer inquiry per forwarded channel message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketRecord {
    pub ticket_id: i64,
    pub customer_tg_id: i64,
    /// Unique: the review-channel message this ticket was forwarded as.
    pub support_chat_message_id: i64,
    /// false = Open, true = Answered. Never deleted, only toggled.
    pub answered: bool,
    pub created_at: DateTime<Utc>,
}
