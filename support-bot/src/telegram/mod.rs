//! Teloxide glue: the [`TelegramTransport`] adapter and the dptree update
//! handlers. Everything above this module talks in core types only.

mod handlers;
mod transport;

pub use handlers::{handle_callback, handle_message, AppState};
pub use transport::TelegramTransport;
