//! Chat transport port.
//!
//! [`ChatTransport`] is transport-agnostic; the teloxide implementation lives
//! in support-bot. Tests substitute a recording impl.

use crate::controls::ControlSet;
use crate::error::Result;
use crate::types::Chat;
use async_trait::async_trait;

/// Abstraction for the messaging side of the relay: plain sends to customers,
/// control-carrying sends to the review channel, and control re-renders.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a text message with the given control set attached and returns
    /// the transport message id. Tickets are keyed by this id.
    async fn send_with_controls(
        &self,
        chat: &Chat,
        text: &str,
        controls: &ControlSet,
    ) -> Result<i64>;

    /// Replaces the control set under an already-sent message.
    async fn edit_controls(&self, chat: &Chat, message_id: i64, controls: &ControlSet)
        -> Result<()>;
}
