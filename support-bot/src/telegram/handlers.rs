//! dptree endpoints: one for messages, one for callback queries.
//!
//! The message endpoint splits on chat: replies inside the review channel go
//! to the operator path, private chats go to registration or ticket creation.
//! Everything else is ignored. Handler failures are logged and answered with
//! a short notice; they never take the dispatcher down.

use std::sync::Arc;

use anyhow::Result;
use support_core::{ControlAction, RelayError, User};
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove};
use tracing::{error, info, warn};

use crate::config::RelayConfig;
use crate::registration::{Registrar, Registration};
use crate::router::TicketRouter;
use crate::texts;

pub struct AppState {
    pub config: RelayConfig,
    pub router: TicketRouter,
    pub registrar: Registrar,
}

fn core_user(user: &teloxide::types::User) -> User {
    User {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

fn phone_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(texts::SHARE_PHONE_BUTTON).request(ButtonRequest::Contact),
    ]])
    .one_time_keyboard()
    .resize_keyboard()
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    if msg.chat.id.0 == state.config.support_chat_id {
        return handle_review_channel_message(bot, msg, state).await;
    }
    if msg.chat.is_private() {
        return handle_private_message(bot, msg, state).await;
    }
    Ok(())
}

/// Operator path: only replies carry a ticket handle, anything else in the
/// channel is chatter.
async fn handle_review_channel_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let (Some(reply_to), Some(text)) = (msg.reply_to_message(), msg.text()) else {
        return Ok(());
    };
    let channel_message_id = i64::from(reply_to.id.0);

    match state
        .router
        .handle_operator_reply(channel_message_id, text)
        .await
    {
        Ok(()) => {}
        Err(RelayError::TicketNotFound(id)) => {
            warn!(channel_message_id = id, "Reply to a message with no ticket");
            bot.send_message(msg.chat.id, texts::NO_TICKET_FOR_REPLY)
                .await?;
        }
        Err(e) => {
            error!(channel_message_id, error = %e, "Operator reply failed");
            let _ = bot
                .send_message(msg.chat.id, texts::TEMPORARILY_UNAVAILABLE)
                .await;
        }
    }
    Ok(())
}

async fn handle_private_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user = core_user(from);

    if let Some(contact) = msg.contact() {
        return handle_contact(bot, &msg, state, &user, &contact.phone_number).await;
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    match text {
        "/start" => {
            if let Err(e) = state.registrar.start(&user).await {
                error!(user_id = user.id, error = %e, "Registration start failed");
                bot.send_message(msg.chat.id, texts::TEMPORARILY_UNAVAILABLE)
                    .await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, texts::INSTRUCTION)
                .reply_markup(phone_keyboard())
                .await?;
        }
        "/help" => {
            bot.send_message(msg.chat.id, texts::HELP)
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        _ => {
            handle_customer_text(bot, &msg, state, &user, text).await?;
        }
    }
    Ok(())
}

async fn handle_contact(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    user: &User,
    phone: &str,
) -> Result<()> {
    match state.registrar.register(user, phone).await {
        Ok(Registration::Registered { name }) => {
            info!(user_id = user.id, named = name.is_some(), "Registration complete");
            bot.send_message(msg.chat.id, texts::PHONE_FOUND)
                .reply_markup(KeyboardRemove::new())
                .await?;
            bot.send_message(msg.chat.id, texts::HOW_TO_USE).await?;
        }
        Ok(Registration::PhoneUnknown) => {
            bot.send_message(msg.chat.id, texts::PHONE_NOT_FOUND)
                .reply_markup(phone_keyboard())
                .await?;
        }
        Ok(Registration::PhoneTaken) => {
            bot.send_message(msg.chat.id, texts::PHONE_TAKEN)
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        Err(e) => {
            error!(user_id = user.id, error = %e, "Registration failed");
            bot.send_message(msg.chat.id, texts::TEMPORARILY_UNAVAILABLE)
                .await?;
        }
    }
    Ok(())
}

async fn handle_customer_text(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    user: &User,
    text: &str,
) -> Result<()> {
    match state.router.handle_customer_message(user, text).await {
        Ok(ticket) => {
            info!(user_id = user.id, ticket_id = ticket.ticket_id, "Message forwarded");
        }
        Err(RelayError::CustomerNotFound(_)) => {
            bot.send_message(msg.chat.id, texts::NOT_REGISTERED).await?;
        }
        Err(e) => {
            error!(user_id = user.id, error = %e, "Forwarding failed");
            let _ = bot
                .send_message(msg.chat.id, texts::TEMPORARILY_UNAVAILABLE)
                .await;
        }
    }
    Ok(())
}

/// Control presses under forwarded tickets. The query is always answered so
/// the operator's client stops the spinner, even when the press was a no-op.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> Result<()> {
    let action = q.data.as_deref().and_then(ControlAction::parse);
    let message_id = q
        .message
        .as_ref()
        .map(|m| i64::from(m.id().0));

    if let (Some(action), Some(message_id)) = (action, message_id) {
        if let Err(e) = state.router.handle_control_press(message_id, action).await {
            error!(message_id, ?action, error = %e, "Control press failed");
        }
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}
