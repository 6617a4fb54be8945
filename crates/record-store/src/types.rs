//! Collection and record types.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// A named collection backed by its own JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Contacts,
}

impl Collection {
    /// File name used when the collection lives in a data directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Contacts => "contactus.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Users => write!(f, "users"),
            Collection::Contacts => write!(f, "contacts"),
        }
    }
}

/// A record type that belongs to exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
}

/// A registered user.
///
/// The password is kept as submitted; login compares it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl UserRecord {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Exact match on both login fields.
    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl Record for UserRecord {
    const COLLECTION: Collection = Collection::Users;
}

/// A contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Localized submission time, stored under the `date` key.
    #[serde(rename = "date")]
    pub timestamp: String,
}

impl Record for ContactSubmission {
    const COLLECTION: Collection = Collection::Contacts;
}
