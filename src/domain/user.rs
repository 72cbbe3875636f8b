use chrono::{DateTime, Utc};

use super::{impl_entity, is_blank};
use crate::error::{DomainError, DomainResult};

/// A registered user. Users author and approve reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub login_name: String,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}

impl_entity!(User, "User");

impl User {
    pub fn new(login_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            version: 0,
            login_name: login_name.into(),
            email_address: email_address.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if is_blank(&self.login_name) {
            return Err(DomainError::validation("Login name cannot be empty."));
        }
        if !self.email_address.contains('@') {
            return Err(DomainError::validation(format!(
                "'{}' is not a valid email address.",
                self.email_address
            )));
        }
        Ok(())
    }
}
