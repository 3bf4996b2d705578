//! Customer registration: phone lookup, customer row creation, name backfill.
//!
//! Registration sits outside the ticket core but is the path that turns a
//! chat user into a customer the router will accept messages from.

use std::sync::Arc;

use storage::{CustomerRecord, StorageError, SupportStore};
use support_core::{ContactLookup, RelayError, Result, User};
use tracing::{info, instrument};

use crate::cache::ObjectCache;

/// Outcome of a registration attempt. `PhoneUnknown` invites a retry with a
/// different phone; `PhoneTaken` is definitive and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered { name: Option<String> },
    PhoneUnknown,
    PhoneTaken,
}

pub struct Registrar {
    store: SupportStore,
    lookup: Arc<dyn ContactLookup>,
    /// The router's customer cache: customer-row writes here must drop the
    /// router's hydrated copy or forwarded signatures go stale.
    customers: ObjectCache<i64, CustomerRecord>,
}

impl Registrar {
    pub fn new(
        store: SupportStore,
        lookup: Arc<dyn ContactLookup>,
        customers: ObjectCache<i64, CustomerRecord>,
    ) -> Self {
        Self {
            store,
            lookup,
            customers,
        }
    }

    /// First contact: make sure a user row exists before anything else
    /// references it. Idempotent.
    #[instrument(skip(self))]
    pub async fn start(&self, user: &User) -> Result<()> {
        self.store
            .upsert_tg_user(user.id, user.username.as_deref())
            .await
            .map_err(|e| RelayError::Storage(e.to_string()))
    }

    /// Registers `user` as a customer under `phone`: the directory must know
    /// the phone, and the phone must not belong to a different customer.
    /// On success the directory name is backfilled onto the customer row.
    #[instrument(skip(self, phone), fields(user_id = user.id))]
    pub async fn register(&self, user: &User, phone: &str) -> Result<Registration> {
        let Some(name) = self.lookup.find_name_by_phone(phone).await? else {
            info!(user_id = user.id, "Phone not in directory");
            return Ok(Registration::PhoneUnknown);
        };

        self.store
            .upsert_tg_user(user.id, user.username.as_deref())
            .await
            .map_err(|e| RelayError::Storage(e.to_string()))?;

        let customer_id = match self.store.register_customer(user.id, phone).await {
            Ok(id) => id,
            Err(StorageError::DuplicatePhone(_)) => {
                info!(user_id = user.id, "Phone already registered to another customer");
                return Ok(Registration::PhoneTaken);
            }
            Err(e) => return Err(RelayError::Storage(e.to_string())),
        };

        let backfill = if name.is_empty() {
            Ok(())
        } else {
            self.store.set_customer_first_name(customer_id, &name).await
        };
        // The row changed either way; drop whatever the router has cached.
        self.customers.invalidate(&user.id).await;
        backfill.map_err(|e| RelayError::Storage(e.to_string()))?;

        info!(user_id = user.id, customer_id, "Customer registered");
        Ok(Registration::Registered {
            name: (!name.is_empty()).then_some(name),
        })
    }
}
