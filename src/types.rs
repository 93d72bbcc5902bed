use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login request body for the registry's user login endpoint
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response carrying the bearer token
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// One page of the repository tag listing
#[derive(Debug, Clone, Deserialize)]
pub struct TagPage {
    /// Absolute URL of the next page, null on the last one
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<TagRecord>,
}

/// Individual tag in the listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRecord {
    pub name: String,
    /// Last push time. Older registry payloads name it `tag_last_pushed`.
    #[serde(rename = "last_pushed", alias = "tag_last_pushed", default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl TagRecord {
    pub fn new(name: impl Into<String>, last_activity: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            last_activity,
        }
    }
}
