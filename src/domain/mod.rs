//! Domain records.
//!
//! Records are plain values. Persistence-managed fields (`id`, timestamps,
//! `version`) are `None`/zero until a data service stores the record and
//! hands back a stamped copy.

use chrono::{DateTime, Utc};

/// A record that can be stored by a `DataService`.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Resource name used in error messages and logs.
    const RESOURCE: &'static str;

    fn id(&self) -> Option<u64>;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Optimistic concurrency counter, bumped by the store on every write.
    fn version(&self) -> u64;

    /// Return a copy carrying the given persistence-managed fields.
    fn stamped(
        self,
        id: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u64,
    ) -> Self;
}

/// Implements `Entity` for a record with `id`, `created_at`, `updated_at`
/// and `version` fields.
macro_rules! impl_entity {
    ($ty:ty, $resource:literal) => {
        impl $crate::domain::Entity for $ty {
            const RESOURCE: &'static str = $resource;

            fn id(&self) -> Option<u64> {
                self.id
            }

            fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.created_at
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn stamped(
                self,
                id: u64,
                created_at: chrono::DateTime<chrono::Utc>,
                updated_at: chrono::DateTime<chrono::Utc>,
                version: u64,
            ) -> Self {
                Self {
                    id: Some(id),
                    created_at: Some(created_at),
                    updated_at: Some(updated_at),
                    version,
                    ..self
                }
            }
        }
    };
}

pub(crate) use impl_entity;

pub mod pos;
pub mod review;
pub mod user;

pub use pos::Pos;
pub use review::Review;
pub use user::User;

/// True when the string is empty or only whitespace.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
