//! Domain error types.
//!
//! Raised where a business rule or lookup fails and propagated unchanged
//! to the HTTP layer, which maps each variant to a status code.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{resource} with ID {id} does not exist")]
    NotFound { resource: &'static str, id: u64 },

    /// A business rule was violated.
    #[error("{0}")]
    Validation(String),

    /// The entity changed between read and write.
    #[error("{resource} with ID {id} was modified concurrently")]
    ConcurrentModification { resource: &'static str, id: u64 },

    /// A stored record points at a record that no longer exists.
    #[error("{owner} {owner_id} references missing {resource} {id}")]
    DanglingReference {
        owner: &'static str,
        owner_id: u64,
        resource: &'static str,
        id: u64,
    },
}

impl DomainError {
    pub fn not_found(resource: &'static str, id: u64) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
