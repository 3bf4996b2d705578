//! Integration tests for [`support_bot::TicketRouter`] against a real store
//! and a recording transport.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storage::SupportStore;
use support_bot::{Registrar, TicketRouter};
use support_core::{Chat, ChatTransport, ControlAction, ControlSet, Result, StaticLookup, User};
use tempfile::TempDir;

const REVIEW_CHANNEL: i64 = -100_500;

/// Captures everything the router asks the transport to do.
#[derive(Default)]
struct RecordingTransport {
    next_message_id: AtomicI64,
    sent: Mutex<Vec<(i64, String)>>,
    forwarded: Mutex<Vec<(i64, String, ControlSet)>>,
    edits: Mutex<Vec<(i64, ControlSet)>>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1000),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn forwarded(&self) -> Vec<(i64, String, ControlSet)> {
        self.forwarded.lock().unwrap().clone()
    }

    fn edits(&self) -> Vec<(i64, ControlSet)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat.id, text.to_string()));
        Ok(())
    }

    async fn send_with_controls(
        &self,
        chat: &Chat,
        text: &str,
        controls: &ControlSet,
    ) -> Result<i64> {
        assert_eq!(chat.id, REVIEW_CHANNEL, "Forwards must target the review channel");
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.forwarded
            .lock()
            .unwrap()
            .push((message_id, text.to_string(), *controls));
        Ok(message_id)
    }

    async fn edit_controls(&self, chat: &Chat, message_id: i64, controls: &ControlSet) -> Result<()> {
        assert_eq!(chat.id, REVIEW_CHANNEL, "Edits must target the review channel");
        self.edits.lock().unwrap().push((message_id, *controls));
        Ok(())
    }
}

async fn new_relay() -> (TempDir, SupportStore, Arc<RecordingTransport>, TicketRouter) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("support.db");
    let store = SupportStore::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("Failed to create store");
    let transport = Arc::new(RecordingTransport::new());
    let router = TicketRouter::new(
        store.clone(),
        transport.clone(),
        Chat::new(REVIEW_CHANNEL),
    );
    (dir, store, transport, router)
}

fn customer_user(tg_id: i64) -> User {
    User {
        id: tg_id,
        username: Some(format!("user{tg_id}")),
        first_name: Some("Ada".to_string()),
        last_name: None,
    }
}

async fn register(store: &SupportStore, tg_id: i64, phone: &str, first_name: &str) -> i64 {
    store
        .upsert_tg_user(tg_id, None)
        .await
        .expect("Failed to upsert user");
    let customer_id = store
        .register_customer(tg_id, phone)
        .await
        .expect("Failed to register customer");
    store
        .set_customer_first_name(customer_id, first_name)
        .await
        .expect("Failed to set name");
    customer_id
}

/// **Test: Customer message becomes a ticket in the review channel.**
///
/// **Setup:** Registered customer with first name `Ada`.
/// **Action:** `handle_customer_message(&user, "where is my order?")`.
/// **Expected:** One forwarded message with signature `From: Ada`, the
/// question below, and fresh `{Ban, Unanswered}` controls; a ticket row keyed
/// by the forwarded message id.
#[tokio::test]
async fn test_customer_message_creates_ticket() {
    let (_dir, store, transport, router) = new_relay().await;
    register(&store, 10, "+100", "Ada").await;

    let ticket = router
        .handle_customer_message(&customer_user(10), "where is my order?")
        .await
        .expect("Forwarding should succeed");

    let forwarded = transport.forwarded();
    assert_eq!(forwarded.len(), 1);
    let (message_id, body, controls) = &forwarded[0];
    assert_eq!(body, "From: Ada\n\nwhere is my order?");
    assert_eq!(*controls, ControlSet::new(false, false));

    assert_eq!(ticket.support_chat_message_id, *message_id);
    assert_eq!(ticket.customer_tg_id, 10);
    assert!(!ticket.answered);

    let stored = store
        .get_ticket_by_channel_message(*message_id)
        .await
        .expect("Ticket should be persisted");
    assert_eq!(stored.ticket_id, ticket.ticket_id);
}

/// **Test: Signature falls back to the username when no name is on file.**
///
/// **Setup:** Customer registered without a name backfill.
/// **Action:** Forward one message.
/// **Expected:** Signature uses the Telegram username.
#[tokio::test]
async fn test_signature_falls_back_to_username() {
    let (_dir, store, transport, router) = new_relay().await;
    store.upsert_tg_user(10, Some("user10")).await.expect("Failed to upsert");
    store.register_customer(10, "+100").await.expect("Failed to register");

    router
        .handle_customer_message(&customer_user(10), "hello")
        .await
        .expect("Forwarding should succeed");

    let (_, body, _) = &transport.forwarded()[0];
    assert_eq!(body, "From: user10\n\nhello");
}

/// **Test: Unregistered senders are rejected before anything is sent.**
///
/// **Setup:** Empty store.
/// **Action:** `handle_customer_message` from an unknown user.
/// **Expected:** `CustomerNotFound`; no forwards, no tickets.
#[tokio::test]
async fn test_unregistered_sender_is_rejected() {
    let (_dir, _store, transport, router) = new_relay().await;

    let err = router
        .handle_customer_message(&customer_user(42), "hi")
        .await
        .expect_err("Unknown sender must fail");
    assert!(matches!(err, support_core::RelayError::CustomerNotFound(42)));
    assert!(transport.forwarded().is_empty());
}

/// **Test: Operator reply delivers to the customer and marks answered.**
///
/// **Setup:** One open ticket.
/// **Action:** `handle_operator_reply(message_id, "it ships tomorrow")`.
/// **Expected:** Customer's private chat receives the text; the ticket is
/// answered in the store; the controls are re-rendered `{Ban, Answered}`.
#[tokio::test]
async fn test_operator_reply_marks_answered() {
    let (_dir, store, transport, router) = new_relay().await;
    register(&store, 10, "+100", "Ada").await;

    let ticket = router
        .handle_customer_message(&customer_user(10), "where is my order?")
        .await
        .expect("Forwarding should succeed");
    let message_id = ticket.support_chat_message_id;

    router
        .handle_operator_reply(message_id, "it ships tomorrow")
        .await
        .expect("Reply should succeed");

    assert_eq!(transport.sent(), vec![(10, "it ships tomorrow".to_string())]);

    let stored = store
        .get_ticket_by_channel_message(message_id)
        .await
        .expect("Ticket should exist");
    assert!(stored.answered);

    let edits = transport.edits();
    assert_eq!(edits.last(), Some(&(message_id, ControlSet::new(false, true))));
}

/// **Test: Replying to a message with no ticket changes nothing.**
///
/// **Setup:** One open ticket.
/// **Action:** `handle_operator_reply` against an unrelated message id.
/// **Expected:** `TicketNotFound`; nothing sent, the real ticket stays
/// unanswered.
#[tokio::test]
async fn test_reply_to_unknown_message() {
    let (_dir, store, transport, router) = new_relay().await;
    register(&store, 10, "+100", "Ada").await;

    let ticket = router
        .handle_customer_message(&customer_user(10), "question")
        .await
        .expect("Forwarding should succeed");

    let err = router
        .handle_operator_reply(999_999, "lost answer")
        .await
        .expect_err("Unknown message must fail");
    assert!(matches!(err, support_core::RelayError::TicketNotFound(999_999)));

    assert!(transport.sent().is_empty());
    let stored = store
        .get_ticket_by_channel_message(ticket.support_chat_message_id)
        .await
        .expect("Ticket should exist");
    assert!(!stored.answered);
}

/// **Test: Ban press flips the flag and re-renders; repeat press is a no-op.**
///
/// **Setup:** One open ticket.
/// **Action:** Press `Ban` twice, then `Unban`.
/// **Expected:** After the presses the user ends unbanned; every press
/// re-rendered controls from persisted state; `list_active_customers`
/// excluded the customer while banned.
#[tokio::test]
async fn test_ban_press_round_trip() {
    let (_dir, store, transport, router) = new_relay().await;
    register(&store, 10, "+100", "Ada").await;

    let ticket = router
        .handle_customer_message(&customer_user(10), "question")
        .await
        .expect("Forwarding should succeed");
    let message_id = ticket.support_chat_message_id;

    router
        .handle_control_press(message_id, ControlAction::Ban)
        .await
        .expect("Ban press should succeed");
    assert!(store.get_tg_user(10).await.unwrap().unwrap().is_banned);
    assert!(store.list_active_customers().await.unwrap().is_empty());
    assert_eq!(
        transport.edits().last(),
        Some(&(message_id, ControlSet::new(true, false)))
    );

    router
        .handle_control_press(message_id, ControlAction::Ban)
        .await
        .expect("Repeat ban press should succeed");
    assert!(store.get_tg_user(10).await.unwrap().unwrap().is_banned);

    router
        .handle_control_press(message_id, ControlAction::Unban)
        .await
        .expect("Unban press should succeed");
    assert!(!store.get_tg_user(10).await.unwrap().unwrap().is_banned);
    assert_eq!(store.list_active_customers().await.unwrap(), vec![10]);
    assert_eq!(
        transport.edits().last(),
        Some(&(message_id, ControlSet::new(false, false)))
    );
}

/// **Test: Re-registration refreshes the forwarded signature.**
///
/// **Setup:** Router and registrar sharing the customer cache; the directory
/// maps `+100` → `Grace` and `+200` → `Hopper`.
/// **Action:** Register, forward a message, re-register under the second
/// phone, forward again.
/// **Expected:** First signature reads `From: Grace`, second `From: Hopper` —
/// the registration write dropped the router's cached customer row.
#[tokio::test]
async fn test_reregistration_refreshes_signature() {
    let (_dir, store, transport, router) = new_relay().await;
    let lookup = StaticLookup::new()
        .with_entry("+100", "Grace")
        .with_entry("+200", "Hopper");
    let registrar = Registrar::new(store.clone(), Arc::new(lookup), router.customer_cache());

    registrar
        .register(&customer_user(10), "+100")
        .await
        .expect("First registration should succeed");
    router
        .handle_customer_message(&customer_user(10), "first")
        .await
        .expect("First forward should succeed");

    registrar
        .register(&customer_user(10), "+200")
        .await
        .expect("Re-registration should succeed");
    router
        .handle_customer_message(&customer_user(10), "second")
        .await
        .expect("Second forward should succeed");

    let bodies: Vec<String> = transport
        .forwarded()
        .into_iter()
        .map(|(_, body, _)| body)
        .collect();
    assert_eq!(
        bodies,
        vec!["From: Grace\n\nfirst", "From: Hopper\n\nsecond"]
    );
}

/// **Test: Answer-label presses never write, only re-render.**
///
/// **Setup:** One open ticket.
/// **Action:** Press `Unanswered`, then `Answered`.
/// **Expected:** Ticket stays unanswered; both presses re-rendered
/// `{Ban, Unanswered}`.
#[tokio::test]
async fn test_answer_press_is_display_only() {
    let (_dir, store, transport, router) = new_relay().await;
    register(&store, 10, "+100", "Ada").await;

    let ticket = router
        .handle_customer_message(&customer_user(10), "question")
        .await
        .expect("Forwarding should succeed");
    let message_id = ticket.support_chat_message_id;

    for action in [ControlAction::Unanswered, ControlAction::Answered] {
        router
            .handle_control_press(message_id, action)
            .await
            .expect("Press should succeed");
    }

    let stored = store
        .get_ticket_by_channel_message(message_id)
        .await
        .expect("Ticket should exist");
    assert!(!stored.answered);
    assert_eq!(
        transport.edits().last(),
        Some(&(message_id, ControlSet::new(false, false)))
    );
}
