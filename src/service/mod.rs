//! Business services.
//!
//! Each entity gets a service implementing `CrudService`; handlers only
//! talk to services, never to the data layer directly.

pub mod pos;
pub mod review;
pub mod user;

pub use pos::PosService;
pub use review::ReviewService;
pub use user::UserService;

use async_trait::async_trait;

use crate::domain::Entity;
use crate::error::DomainResult;

#[async_trait]
pub trait CrudService<T: Entity>: Send + Sync {
    async fn get_all(&self) -> Vec<T>;

    async fn get_by_id(&self, id: u64) -> DomainResult<T>;

    /// Create the record when it has no id, otherwise update it.
    async fn upsert(&self, entity: T) -> DomainResult<T>;

    async fn delete(&self, id: u64) -> DomainResult<()>;
}
