//! Storage crate: the durable entity store for the support relay.
//!
//! ## Modules
//!
//! - [`error`] – StorageError taxonomy (transient vs definitive)
//! - [`models`] – TgUserRecord, CustomerRecord, TicketRecord
//! - [`store`] – SupportStore (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`retry`] – backoff helper for transient store errors

mod error;
mod models;
mod retry;
mod sqlite_pool;
mod store;

pub use error::StorageError;
pub use models::{CustomerRecord, TgUserRecord, TicketRecord};
pub use retry::with_backoff;
pub use sqlite_pool::SqlitePoolManager;
pub use store::SupportStore;
