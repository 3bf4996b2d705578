//! Storage error types.
//!
//! `Database` is the transient class (connection loss, lock contention) and
//! the only variant the retry helper will re-attempt. The other variants are
//! definitive outcomes: retrying them with the same input cannot succeed.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Phone already registered: {0}")]
    DuplicatePhone(String),
    #[error("Ticket already exists for channel message: {0}")]
    DuplicateTicket(String),
}

impl StorageError {
    /// Maps a sqlx error, routing UNIQUE violations to the matching
    /// duplicate variant by constraint name.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let msg = db.message();
            if msg.contains("UNIQUE constraint failed") {
                if msg.contains("customer.phone") {
                    return StorageError::DuplicatePhone(msg.to_string());
                }
                if msg.contains("ticket.support_chat_message_id") {
                    return StorageError::DuplicateTicket(msg.to_string());
                }
            }
        }
        StorageError::Database(e.to_string())
    }

    /// True for errors worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Database(_))
    }
}
