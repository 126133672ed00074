// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Type definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered property values of an item, keyed by property name
pub type Properties = IndexMap<String, String>;

/// Approval status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// A registered user. The username is the key of the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub password: String,
    pub status: AccountStatus,
    pub address: String,
    pub contact: String,
}

impl Account {
    pub fn is_approved(&self) -> bool {
        self.status == AccountStatus::Approved
    }
}

/// Named, ordered set of property labels that items of this type must fill in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemType {
    pub name: String,
    pub properties: Vec<String>,
}

impl ItemType {
    /// Build a schema, dropping blank property labels
    pub fn new(name: impl Into<String>, properties: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            properties: properties
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// The free-text fields every item carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl ItemFields {
    /// Labels of empty fields, in display order
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("address", &self.address),
            ("phone", &self.phone),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Reject the fields if any of them is empty
    pub fn validate(&self) -> Result<(), AppError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "All fields are required, missing: {}",
                missing.join(", ")
            )))
        }
    }
}

/// An item offered for exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(flatten)]
    pub fields: ItemFields,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Item {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }
}

/// Role of a logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

/// A logged-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wrong password")]
    InvalidCredential,

    #[error("Account {0} has not been approved yet")]
    NotApproved(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
