//! Wiring and the long-poll loop: config, tracing, store, transport, router,
//! registrar, then the teloxide dispatcher.

use std::sync::Arc;

use anyhow::{Context, Result};
use storage::SupportStore;
use support_core::{init_tracing, Chat, ContactLookup, StaticLookup};
use teloxide::prelude::*;
use tracing::{info, instrument, warn};

use crate::config::RelayConfig;
use crate::contact::AirtableLookup;
use crate::registration::Registrar;
use crate::router::TicketRouter;
use crate::telegram::{handle_callback, handle_message, AppState, TelegramTransport};

/// Main entry: validate config, init logging, build the relay, dispatch
/// updates until shutdown.
#[instrument(skip(config))]
pub async fn run_bot(config: RelayConfig) -> Result<()> {
    config.validate()?;
    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    init_tracing(&config.log_file)?;

    info!(
        database_url = %config.database_url,
        support_chat_id = config.support_chat_id,
        "Initializing support relay"
    );

    let store = SupportStore::new(&config.database_url)
        .await
        .context("Failed to open database")?;

    let bot = Bot::new(config.bot_token.clone());
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let review_channel = Chat::new(config.support_chat_id);
    let router = TicketRouter::new(store.clone(), transport, review_channel);

    let lookup: Arc<dyn ContactLookup> = match &config.airtable {
        Some(airtable) => Arc::new(AirtableLookup::new(
            airtable.api_key.clone(),
            airtable.base_id.clone(),
            airtable.table_name.clone(),
        )),
        None => {
            warn!("AIRTABLE_* not set, phone directory is empty");
            Arc::new(StaticLookup::default())
        }
    };
    let registrar = Registrar::new(store, lookup, router.customer_cache());

    let state = Arc::new(AppState {
        config,
        router,
        registrar,
    });

    info!("Support relay is running");

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Admin helper behind the `add-operator` subcommand: record a user as an
/// operator. Needs only the database, not the Telegram config. Idempotent.
pub async fn add_operator(database_url: &str, tg_id: i64) -> Result<()> {
    let store = SupportStore::new(database_url)
        .await
        .context("Failed to open database")?;

    store
        .add_operator(tg_id)
        .await
        .context("Failed to add operator")?;

    if store.is_operator(tg_id).await? {
        println!("{tg_id} is registered as an operator");
    }
    Ok(())
}
