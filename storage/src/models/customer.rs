//! Customer record: a chat user that completed phone registration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerRecord {
    pub customer_id: i64,
    pub tg_id: i64,
    /// Globally unique; a second registration with the same phone fails.
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CustomerRecord {
    /// "First Last" with missing parts skipped; used as the ticket signature.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(first) = self.first_name.as_deref() {
            parts.push(first);
        }
        if let Some(last) = self.last_name.as_deref() {
            parts.push(last);
        }
        parts.join(" ")
    }
}
