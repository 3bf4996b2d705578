//! # Support bot application
//!
//! Wires the ticket router, object cache, registration flow, and storage
//! behind a teloxide dispatcher. Loads config from env and runs polling.

pub mod cache;
pub mod cli;
pub mod config;
pub mod contact;
pub mod registration;
pub mod router;
pub mod runner;
pub mod telegram;
pub mod texts;

pub use cache::ObjectCache;
pub use cli::{Cli, Commands};
pub use config::{AirtableConfig, RelayConfig};
pub use contact::AirtableLookup;
pub use registration::{Registrar, Registration};
pub use router::TicketRouter;
pub use runner::{add_operator, run_bot};
pub use telegram::{AppState, TelegramTransport};
