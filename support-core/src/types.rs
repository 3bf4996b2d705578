//! Core identity types shared by the router, storage callers, and adapters.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names) as seen by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Display name: username if present, otherwise the numeric id.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Chat identity. Covers both private chats and the review channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Chat {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}
