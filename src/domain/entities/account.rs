//! Account entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An account that owns apps and authenticates with access keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account stamped with the current time.
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
