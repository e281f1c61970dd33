use crate::error::{LaunchpadError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A syntactically valid email address, normalised to lowercase.
///
/// Leads are deduplicated on this value, so `Jane@Example.com` and
/// `jane@example.com` are the same lead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if !validator::validate_email(value) {
            return Err(LaunchpadError::ValidationError("Invalid email".to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A marketing lead captured from the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    pub email: EmailAddress,
    /// Serialized attribution parameters, stored as received.
    pub utms: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    pub fn new(email: EmailAddress, utms: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            utms,
            created_at: Utc::now(),
        }
    }
}
