//! Data access contracts.
//!
//! `DataService` is the generic CRUD contract every stored record goes
//! through; `ReviewDataService` adds the review lookups and the
//! one-review-per-author-and-POS write. `InMemoryStore` implements both.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::domain::{Entity, Review};
use crate::error::DomainResult;

#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// All records, ordered by id.
    async fn get_all(&self) -> Vec<T>;

    /// Fails with `NotFound` when no record has this id.
    async fn get_by_id(&self, id: u64) -> DomainResult<T>;

    /// Insert when `id` is absent, otherwise replace the stored record.
    ///
    /// Inserts assign the id, timestamps and version 1. Replacements keep
    /// `created_at`, refresh `updated_at` and bump the version; they fail
    /// with `ConcurrentModification` if the stored version differs from the
    /// one carried by `entity`.
    async fn upsert(&self, entity: T) -> DomainResult<T>;

    /// Fails with `NotFound` when no record has this id.
    async fn delete(&self, id: u64) -> DomainResult<()>;

    async fn count(&self) -> usize;
}

#[async_trait]
pub trait ReviewDataService: DataService<Review> {
    /// Reviews of one POS with the given approval status.
    async fn filter(&self, pos_id: u64, approved: bool) -> Vec<Review>;

    /// `upsert` that fails with `Validation` when another review already
    /// has the same POS and author. Check and write share one lock.
    async fn upsert_unique(&self, review: Review) -> DomainResult<Review>;

    async fn has_reviews_for_pos(&self, pos_id: u64) -> bool;

    async fn has_reviews_by_author(&self, author_id: u64) -> bool;
}
