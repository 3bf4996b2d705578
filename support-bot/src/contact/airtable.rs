//! Airtable-backed phone directory.
//!
//! One table, one row per known customer, columns `phone` and `name`. A row
//! with the phone but no name counts as found with an empty name.

use async_trait::async_trait;
use serde::Deserialize;
use support_core::{ContactLookup, RelayError, Result};
use tracing::{info, instrument};

const AIRTABLE_API_BASE: &str = "https://api.airtable.com/v0";

/// Builds the filterByFormula term. Single quotes in the phone are escaped so
/// the value cannot terminate the formula's string literal.
fn phone_filter_formula(phone: &str) -> String {
    let escaped = phone.replace('\'', "\\'");
    format!("{{phone}} = '{escaped}'")
}

pub struct AirtableLookup {
    client: reqwest::Client,
    api_key: String,
    base_id: String,
    table_name: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    fields: Fields,
}

#[derive(Debug, Default, Deserialize)]
struct Fields {
    name: Option<String>,
}

impl AirtableLookup {
    pub fn new(api_key: String, base_id: String, table_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_id,
            table_name,
            api_base: AIRTABLE_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API host (tests).
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }
}

#[async_trait]
impl ContactLookup for AirtableLookup {
    #[instrument(skip(self, phone))]
    async fn find_name_by_phone(&self, phone: &str) -> Result<Option<String>> {
        let url = format!("{}/{}/{}", self.api_base, self.base_id, self.table_name);
        let formula = phone_filter_formula(phone);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await
            .map_err(|e| RelayError::Lookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| RelayError::Lookup(e.to_string()))?;

        let body: RecordsResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Lookup(e.to_string()))?;

        let name = body
            .records
            .into_iter()
            .next()
            .map(|record| record.fields.name.unwrap_or_default());

        info!(found = name.is_some(), "Phone directory lookup finished");
        Ok(name)
    }
}
