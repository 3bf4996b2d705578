//! Ticket router: turns customer messages into tickets, operator replies into
//! outbound messages, and control presses into state transitions.
//!
//! Per-ticket state machine: `Open` (answered = false) becomes `Answered`
//! only on the reply-delivery path. Control re-renders always read the
//! freshly persisted `{banned, answered}` pair through the caches, never a
//! value captured before the write.

use std::sync::Arc;

use storage::{CustomerRecord, StorageError, SupportStore, TgUserRecord, TicketRecord};
use support_core::{Chat, ChatTransport, ControlAction, ControlSet, RelayError, Result, User};
use tracing::{info, instrument, warn};

use crate::cache::ObjectCache;

pub struct TicketRouter {
    store: SupportStore,
    transport: Arc<dyn ChatTransport>,
    review_channel: Chat,
    users: ObjectCache<i64, TgUserRecord>,
    customers: ObjectCache<i64, CustomerRecord>,
    /// Keyed by the review-channel message id, the handle every inbound
    /// operator action carries.
    tickets: ObjectCache<i64, TicketRecord>,
}

impl TicketRouter {
    pub fn new(
        store: SupportStore,
        transport: Arc<dyn ChatTransport>,
        review_channel: Chat,
    ) -> Self {
        Self {
            store,
            transport,
            review_channel,
            users: ObjectCache::new(),
            customers: ObjectCache::new(),
            tickets: ObjectCache::new(),
        }
    }

    /// Handle to the customer cache. Everything that mutates customer rows
    /// outside this router (registration) shares this handle so its writes
    /// invalidate what the router has hydrated.
    pub fn customer_cache(&self) -> ObjectCache<i64, CustomerRecord> {
        self.customers.clone()
    }

    /// Forwards an inbound customer message to the review channel and creates
    /// the ticket tracking it. The sender must already be a registered
    /// customer; an unregistered sender is a caller precondition failure
    /// reported as [`RelayError::CustomerNotFound`].
    #[instrument(skip(self, text), fields(sender_id = sender.id))]
    pub async fn handle_customer_message(
        &self,
        sender: &User,
        text: &str,
    ) -> Result<Arc<TicketRecord>> {
        let customer = self.customer_by_tg_id(sender.id).await?;

        let mut name = customer.full_name();
        if name.is_empty() {
            name = sender.display_name();
        }
        let body = format!("From: {name}\n\n{text}");

        let message_id = self
            .transport
            .send_with_controls(&self.review_channel, &body, &ControlSet::default())
            .await?;

        self.store
            .create_ticket(sender.id, message_id)
            .await
            .map_err(storage_err)?;

        let ticket = self.ticket_by_message(message_id).await?;
        info!(
            ticket_id = ticket.ticket_id,
            channel_message_id = message_id,
            "Ticket created"
        );
        Ok(ticket)
    }

    /// Delivers an operator's reply to the ticket's customer and transitions
    /// the ticket to `Answered`. The answered write completes before the
    /// control re-render that reflects it.
    #[instrument(skip(self, text))]
    pub async fn handle_operator_reply(&self, reply_to_message_id: i64, text: &str) -> Result<()> {
        let ticket = self.ticket_by_message(reply_to_message_id).await?;

        self.transport
            .send_message(&Chat::new(ticket.customer_tg_id), text)
            .await?;

        self.store
            .set_answered(ticket.ticket_id, true)
            .await
            .map_err(storage_err)?;
        self.tickets.invalidate(&reply_to_message_id).await;

        info!(ticket_id = ticket.ticket_id, "Ticket answered");
        self.rerender_controls(reply_to_message_id).await
    }

    /// Applies an operator control press to the ticket behind a channel
    /// message. Ban/unban mutate the customer's user row; the answer label is
    /// display-only, so pressing it only re-renders. Either way the controls
    /// end up reflecting current persisted state, which makes repeated taps
    /// idempotent.
    #[instrument(skip(self))]
    pub async fn handle_control_press(&self, message_id: i64, action: ControlAction) -> Result<()> {
        let ticket = self.ticket_by_message(message_id).await?;

        match action {
            ControlAction::Ban => self.apply_ban(ticket.customer_tg_id, true).await?,
            ControlAction::Unban => self.apply_ban(ticket.customer_tg_id, false).await?,
            // The reply-delivery path is the only writer of `answered`.
            ControlAction::Answered | ControlAction::Unanswered => {}
        }

        self.rerender_controls(message_id).await
    }

    async fn apply_ban(&self, tg_id: i64, banned: bool) -> Result<()> {
        match self.store.set_banned(tg_id, banned).await {
            Ok(()) => {
                self.users.invalidate(&tg_id).await;
                info!(tg_id, banned, "Ban flag updated");
                Ok(())
            }
            // Missing user row: log and leave state unchanged.
            Err(StorageError::NotFound(msg)) => {
                warn!(tg_id, error = %msg, "Ban target not found, state unchanged");
                Ok(())
            }
            Err(e) => Err(storage_err(e)),
        }
    }

    /// Re-renders a ticket's controls from current persisted state.
    async fn rerender_controls(&self, message_id: i64) -> Result<()> {
        let ticket = self.ticket_by_message(message_id).await?;
        let user = self.user_by_tg_id(ticket.customer_tg_id).await?;

        self.transport
            .edit_controls(
                &self.review_channel,
                message_id,
                &ControlSet::new(user.is_banned, ticket.answered),
            )
            .await
    }

    async fn customer_by_tg_id(&self, tg_id: i64) -> Result<Arc<CustomerRecord>> {
        let store = self.store.clone();
        self.customers
            .get_or_create(tg_id, || async move {
                match store.get_customer_by_tg_id(tg_id).await {
                    Ok(Some(customer)) => Ok(customer),
                    Ok(None) => Err(RelayError::CustomerNotFound(tg_id)),
                    Err(e) => Err(storage_err(e)),
                }
            })
            .await
    }

    async fn user_by_tg_id(&self, tg_id: i64) -> Result<Arc<TgUserRecord>> {
        let store = self.store.clone();
        self.users
            .get_or_create(tg_id, || async move {
                match store.get_tg_user(tg_id).await {
                    Ok(Some(user)) => Ok(user),
                    Ok(None) => Err(RelayError::Storage(format!("tg_user {tg_id} not found"))),
                    Err(e) => Err(storage_err(e)),
                }
            })
            .await
    }

    async fn ticket_by_message(&self, message_id: i64) -> Result<Arc<TicketRecord>> {
        let store = self.store.clone();
        self.tickets
            .get_or_create(message_id, || async move {
                match store.get_ticket_by_channel_message(message_id).await {
                    Ok(ticket) => Ok(ticket),
                    Err(StorageError::NotFound(_)) => Err(RelayError::TicketNotFound(message_id)),
                    Err(e) => Err(storage_err(e)),
                }
            })
            .await
    }
}

fn storage_err(e: StorageError) -> RelayError {
    RelayError::Storage(e.to_string())
}
