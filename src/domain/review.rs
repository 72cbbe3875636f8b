use chrono::{DateTime, Utc};

use super::{impl_entity, is_blank};
use crate::error::{DomainError, DomainResult};

/// A review of a point of sale.
///
/// `pos_id` and `author_id` reference stored records; readers resolve them
/// so a review always shows the current POS and author. Reviews become
/// approved once they collect the configured number of approvals from
/// users other than the author. `approved` is always derived from
/// `approval_count`; use [`Review::with_approval`] to change either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub pos_id: u64,
    pub author_id: u64,
    pub review: String,
    pub approval_count: u32,
    pub approved: bool,
}

impl_entity!(Review, "Review");

impl Review {
    /// A fresh, unapproved review.
    pub fn new(pos_id: u64, author_id: u64, review: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            version: 0,
            pos_id,
            author_id,
            review: review.into(),
            approval_count: 0,
            approved: false,
        }
    }

    pub fn is_authored_by(&self, user_id: u64) -> bool {
        self.author_id == user_id
    }

    pub fn validate(&self) -> DomainResult<()> {
        if is_blank(&self.review) {
            return Err(DomainError::validation("Review cannot be empty."));
        }
        Ok(())
    }

    /// Copy with exactly one more approval and the approval status recomputed.
    pub fn with_approval(self, min_count: u32) -> DomainResult<Self> {
        let approval_count = self.approval_count.checked_add(1).ok_or_else(|| {
            DomainError::validation("Review cannot take any more approvals.")
        })?;
        Ok(Self {
            approval_count,
            approved: meets_quorum(approval_count, min_count),
            ..self
        })
    }
}

/// A review is approved once it reaches the minimum approval count.
pub fn meets_quorum(approval_count: u32, min_count: u32) -> bool {
    approval_count >= min_count
}
