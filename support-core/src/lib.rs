//! # support-core
//!
//! Transport-agnostic domain for the support relay bot: user/chat types, the
//! control vocabulary rendered under forwarded tickets, and the ports
//! (ChatTransport, ContactLookup) implemented by adapter code in support-bot.

pub mod contact;
pub mod controls;
pub mod error;
pub mod logger;
pub mod transport;
pub mod types;

pub use contact::{ContactLookup, StaticLookup};
pub use controls::{ControlAction, ControlSet};
pub use error::{RelayError, Result};
pub use logger::init_tracing;
pub use transport::ChatTransport;
pub use types::{Chat, User};
