//! In-memory implementation of the data access contracts.
//!
//! Records live in a `BTreeMap` behind a `RwLock`; every write happens
//! under a single write-lock acquisition. All data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DataService, ReviewDataService};
use crate::domain::{Entity, Review};
use crate::error::{DomainError, DomainResult};

struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T: Entity> Table<T> {
    /// Insert or replace `entity`; callers hold the write lock.
    fn write(&mut self, entity: T) -> DomainResult<T> {
        let now = Utc::now();

        let stored = match entity.id() {
            None => {
                let id = self.next_id;
                self.next_id += 1;
                entity.stamped(id, now, now, 1)
            }
            Some(id) => {
                let current = self
                    .rows
                    .get(&id)
                    .ok_or_else(|| DomainError::not_found(T::RESOURCE, id))?;
                if current.version() != entity.version() {
                    return Err(DomainError::ConcurrentModification {
                        resource: T::RESOURCE,
                        id,
                    });
                }
                let created_at = current.created_at().unwrap_or(now);
                let version = current.version() + 1;
                entity.stamped(id, created_at, now, version)
            }
        };

        // stamped() always sets the id
        let id = stored.id().unwrap_or_default();
        debug!(resource = T::RESOURCE, id, version = stored.version(), "Stored record");
        self.rows.insert(id, stored.clone());
        Ok(stored)
    }
}

pub struct InMemoryStore<T> {
    table: RwLock<Table<T>>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for InMemoryStore<T> {
    async fn get_all(&self) -> Vec<T> {
        let table = self.table.read().await;
        table.rows.values().cloned().collect()
    }

    async fn get_by_id(&self, id: u64) -> DomainResult<T> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(T::RESOURCE, id))
    }

    async fn upsert(&self, entity: T) -> DomainResult<T> {
        self.table.write().await.write(entity)
    }

    async fn delete(&self, id: u64) -> DomainResult<()> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(T::RESOURCE, id))
    }

    async fn count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl ReviewDataService for InMemoryStore<Review> {
    async fn filter(&self, pos_id: u64, approved: bool) -> Vec<Review> {
        let table = self.table.read().await;
        table
            .rows
            .values()
            .filter(|review| review.pos_id == pos_id && review.approved == approved)
            .cloned()
            .collect()
    }

    async fn upsert_unique(&self, review: Review) -> DomainResult<Review> {
        let mut table = self.table.write().await;
        let taken = table.rows.values().any(|other| {
            other.id != review.id
                && other.pos_id == review.pos_id
                && other.author_id == review.author_id
        });
        if taken {
            return Err(DomainError::validation(format!(
                "User {} has already reviewed POS {}.",
                review.author_id, review.pos_id
            )));
        }
        table.write(review)
    }

    async fn has_reviews_for_pos(&self, pos_id: u64) -> bool {
        let table = self.table.read().await;
        table.rows.values().any(|review| review.pos_id == pos_id)
    }

    async fn has_reviews_by_author(&self, author_id: u64) -> bool {
        let table = self.table.read().await;
        table.rows.values().any(|review| review.author_id == author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pos, User};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = InMemoryStore::<Pos>::new();
        let first = store.upsert(Pos::new("Mensa", "")).await.unwrap();
        let second = store.upsert(Pos::new("Bistro", "")).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(first.version, 1);
        assert!(first.created_at.is_some());
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_bumps_version() {
        let store = InMemoryStore::<Pos>::new();
        let inserted = store.upsert(Pos::new("Mensa", "")).await.unwrap();

        let changed = Pos {
            description: "Main canteen".to_string(),
            ..inserted.clone()
        };
        let updated = store.upsert(changed).await.unwrap();

        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.created_at, inserted.created_at);
        assert_eq!(updated.version, 2);
        assert_eq!(store.get_by_id(1).await.unwrap().description, "Main canteen");
    }

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let store = InMemoryStore::<Pos>::new();
        let inserted = store.upsert(Pos::new("Mensa", "")).await.unwrap();

        store.upsert(inserted.clone()).await.unwrap();
        let err = store.upsert(inserted).await.unwrap_err();

        assert_eq!(
            err,
            DomainError::ConcurrentModification {
                resource: "POS",
                id: 1
            }
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = InMemoryStore::<Pos>::new();
        let mut pos = Pos::new("Ghost", "");
        pos.id = Some(42);

        let err = store.upsert(pos).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("POS", 42));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::<User>::new();
        store.upsert(User::new("jane", "jane@example.com")).await.unwrap();

        store.delete(1).await.unwrap();
        assert_eq!(store.count().await, 0);
        assert_eq!(
            store.delete(1).await.unwrap_err(),
            DomainError::not_found("User", 1)
        );
    }

    #[tokio::test]
    async fn test_filter_by_pos_and_status() {
        let store = InMemoryStore::<Review>::new();
        store
            .upsert(Review::new(5, 1, "good"))
            .await
            .unwrap();
        let mut approved = Review::new(5, 2, "great");
        approved.approval_count = 3;
        approved.approved = true;
        store.upsert(approved).await.unwrap();
        store
            .upsert(Review::new(6, 1, "meh"))
            .await
            .unwrap();

        let approved = store.filter(5, true).await;
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].review, "great");

        let pending = store.filter(5, false).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].review, "good");

        assert!(store.filter(7, false).await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_unique_rejects_second_review_for_pair() {
        let store = InMemoryStore::<Review>::new();
        let first = store.upsert_unique(Review::new(5, 1, "good")).await.unwrap();

        let err = store
            .upsert_unique(Review::new(5, 1, "again"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // other pairs and the review itself are fine
        store.upsert_unique(Review::new(5, 2, "fine")).await.unwrap();
        store.upsert_unique(Review::new(6, 1, "fine")).await.unwrap();
        let edited = Review {
            review: "still good".to_string(),
            ..first
        };
        store.upsert_unique(edited).await.unwrap();
        assert_eq!(store.count().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_creates_store_one_review_per_pair() {
        let store = Arc::new(InMemoryStore::<Review>::new());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_unique(Review::new(5, 1, format!("attempt {i}")))
                        .await
                })
            })
            .collect();

        let mut stored = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                stored += 1;
            }
        }

        assert_eq!(stored, 1);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_reference_checks() {
        let store = InMemoryStore::<Review>::new();
        store.upsert(Review::new(5, 1, "good")).await.unwrap();

        assert!(store.has_reviews_for_pos(5).await);
        assert!(!store.has_reviews_for_pos(6).await);
        assert!(store.has_reviews_by_author(1).await);
        assert!(!store.has_reviews_by_author(2).await);
    }
}
