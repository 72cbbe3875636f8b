use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::CrudService;
use crate::domain::User;
use crate::error::{DomainError, DomainResult};
use crate::storage::{DataService, ReviewDataService};

pub struct UserService {
    users: Arc<dyn DataService<User>>,
    reviews: Arc<dyn ReviewDataService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn DataService<User>>,
        reviews: Arc<dyn ReviewDataService>,
    ) -> Self {
        Self { users, reviews }
    }
}

#[async_trait]
impl CrudService<User> for UserService {
    async fn get_all(&self) -> Vec<User> {
        self.users.get_all().await
    }

    async fn get_by_id(&self, id: u64) -> DomainResult<User> {
        self.users.get_by_id(id).await
    }

    async fn upsert(&self, user: User) -> DomainResult<User> {
        user.validate()?;

        let taken = self
            .users
            .get_all()
            .await
            .into_iter()
            .any(|other| other.login_name == user.login_name && other.id != user.id);
        if taken {
            return Err(DomainError::validation(format!(
                "Login name '{}' is already taken.",
                user.login_name
            )));
        }

        match user.id {
            None => {
                info!(login_name = %user.login_name, "Creating new user");
                self.users.upsert(user).await
            }
            Some(id) => {
                info!(id, "Updating user");
                let existing = self.users.get_by_id(id).await?;
                self.users
                    .upsert(User {
                        version: existing.version,
                        ..user
                    })
                    .await
            }
        }
    }

    async fn delete(&self, id: u64) -> DomainResult<()> {
        info!(id, "Deleting user");
        if self.reviews.has_reviews_by_author(id).await {
            return Err(DomainError::validation(format!(
                "User {} is still referenced by reviews.",
                id
            )));
        }
        self.users.delete(id).await
    }
}
