use chrono::{DateTime, Utc};

use super::{impl_entity, is_blank};
use crate::error::{DomainError, DomainResult};

/// A point of sale that can be reviewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub name: String,
    pub description: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
}

impl_entity!(Pos, "POS");

impl Pos {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            version: 0,
            name: name.into(),
            description: description.into(),
            street: String::new(),
            house_number: String::new(),
            postal_code: 0,
            city: String::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if is_blank(&self.name) {
            return Err(DomainError::validation("POS name cannot be empty."));
        }
        Ok(())
    }
}
