use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::CrudService;
use crate::domain::Pos;
use crate::error::{DomainError, DomainResult};
use crate::storage::{DataService, ReviewDataService};

pub struct PosService {
    pos: Arc<dyn DataService<Pos>>,
    reviews: Arc<dyn ReviewDataService>,
}

impl PosService {
    pub fn new(
        pos: Arc<dyn DataService<Pos>>,
        reviews: Arc<dyn ReviewDataService>,
    ) -> Self {
        Self { pos, reviews }
    }
}

#[async_trait]
impl CrudService<Pos> for PosService {
    async fn get_all(&self) -> Vec<Pos> {
        self.pos.get_all().await
    }

    async fn get_by_id(&self, id: u64) -> DomainResult<Pos> {
        self.pos.get_by_id(id).await
    }

    async fn upsert(&self, pos: Pos) -> DomainResult<Pos> {
        pos.validate()?;

        let taken = self
            .pos
            .get_all()
            .await
            .into_iter()
            .any(|other| other.name == pos.name && other.id != pos.id);
        if taken {
            return Err(DomainError::validation(format!(
                "POS with name '{}' already exists.",
                pos.name
            )));
        }

        match pos.id {
            None => {
                info!(name = %pos.name, "Creating new POS");
                self.pos.upsert(pos).await
            }
            Some(id) => {
                info!(id, "Updating POS");
                let existing = self.pos.get_by_id(id).await?;
                self.pos
                    .upsert(Pos {
                        version: existing.version,
                        ..pos
                    })
                    .await
            }
        }
    }

    async fn delete(&self, id: u64) -> DomainResult<()> {
        info!(id, "Deleting POS");
        if self.reviews.has_reviews_for_pos(id).await {
            return Err(DomainError::validation(format!(
                "POS {} is still referenced by reviews.",
                id
            )));
        }
        self.pos.delete(id).await
    }
}
