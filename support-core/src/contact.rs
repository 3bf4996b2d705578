//! Contact-lookup port.
//!
//! Registration resolves a customer's name from their phone number through an
//! external directory. [`StaticLookup`] is the in-memory implementation used
//! in tests and when no directory is configured.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Phone-to-name directory consulted at registration time only.
#[async_trait]
pub trait ContactLookup: Send + Sync {
    /// Returns the name on file for `phone`, or `None` if the phone is not in
    /// the directory.
    async fn find_name_by_phone(&self, phone: &str) -> Result<Option<String>>;
}

/// Fixed in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    entries: HashMap<String, String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a phone → name entry.
    pub fn with_entry(mut self, phone: &str, name: &str) -> Self {
        self.entries.insert(phone.to_string(), name.to_string());
        self
    }
}

#[async_trait]
impl ContactLookup for StaticLookup {
    async fn find_name_by_phone(&self, phone: &str) -> Result<Option<String>> {
        Ok(self.entries.get(phone).cloned())
    }
}
