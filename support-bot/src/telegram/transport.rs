//! [`ChatTransport`] implemented on a teloxide [`Bot`].

use async_trait::async_trait;
use support_core::{Chat, ChatTransport, ControlSet, RelayError, Result};
use teloxide::payloads::{EditMessageReplyMarkupSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Renders a control set as a single inline keyboard row.
fn control_keyboard(controls: &ControlSet) -> InlineKeyboardMarkup {
    let row = controls
        .buttons()
        .into_iter()
        .map(|action| InlineKeyboardButton::callback(action.label(), action.callback_data()))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

fn message_id(raw: i64) -> Result<MessageId> {
    let id = i32::try_from(raw)
        .map_err(|_| RelayError::Transport(format!("message id {raw} out of range")))?;
    Ok(MessageId(id))
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text)
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn send_with_controls(&self, chat: &Chat, text: &str, controls: &ControlSet) -> Result<i64> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text)
            .reply_markup(control_keyboard(controls))
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(i64::from(sent.id.0))
    }

    async fn edit_controls(&self, chat: &Chat, raw_message_id: i64, controls: &ControlSet) -> Result<()> {
        self.bot
            .edit_message_reply_markup(ChatId(chat.id), message_id(raw_message_id)?)
            .reply_markup(control_keyboard(controls))
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(())
    }
}
