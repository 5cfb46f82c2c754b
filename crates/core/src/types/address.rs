//! Shipping address type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use super::id::UserId;

/// Errors found when validating an [`Address`] before it is saved.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The contact email does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A shipping address as entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
}

impl Address {
    /// Check that every required field is filled in and the email parses.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field, in form order, or
    /// `AddressError::InvalidEmail`.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("email", &self.email),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AddressError::MissingField(*field));
        }
        Email::parse(&self.email)?;
        Ok(())
    }

    /// Copy of this address stamped for the remote store: owner, creation
    /// time, default flag, and whether it was entered as a guest.
    #[must_use]
    pub fn stamped(&self, owner: &UserId, now: DateTime<Utc>) -> Self {
        Self {
            is_guest: Some(self.user_id.is_none()),
            user_id: Some(owner.clone()),
            created_at: Some(now),
            is_default: Some(true),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Address;

    pub fn address() -> Address {
        Address {
            full_name: "Ada Lovelace".to_owned(),
            phone: "555-0100".to_owned(),
            email: "ada@example.com".to_owned(),
            street: "12 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: "Greater London".to_owned(),
            zip_code: "N1 9GU".to_owned(),
            country: "UK".to_owned(),
            ..Address::default()
        }
    }
}
