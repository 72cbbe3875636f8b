//! Review service: upsert validation, filtering and the approval workflow.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::CrudService;
use crate::config::ApprovalConfig;
use crate::domain::{Entity, Pos, Review, User};
use crate::error::{DomainError, DomainResult};
use crate::storage::{DataService, ReviewDataService};

/// A review together with the current records it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDetails {
    pub review: Review,
    pub pos: Pos,
    pub author: User,
}

pub struct ReviewService {
    reviews: Arc<dyn ReviewDataService>,
    users: Arc<dyn DataService<User>>,
    pos: Arc<dyn DataService<Pos>>,
    approval: ApprovalConfig,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewDataService>,
        users: Arc<dyn DataService<User>>,
        pos: Arc<dyn DataService<Pos>>,
        approval: ApprovalConfig,
    ) -> Self {
        Self {
            reviews,
            users,
            pos,
            approval,
        }
    }

    pub async fn count(&self) -> usize {
        self.reviews.count().await
    }

    /// Reviews of the given POS with the given approval status.
    pub async fn filter(&self, pos_id: u64, approved: bool) -> DomainResult<Vec<Review>> {
        let pos = self.pos.get_by_id(pos_id).await?;
        debug!(pos_id, name = %pos.name, approved, "Filtering reviews");
        Ok(self.reviews.filter(pos_id, approved).await)
    }

    /// Record one approval of `review_id` by `user_id`.
    ///
    /// The approver must exist, the review must exist and the approver must
    /// not be its author, checked in that order. Each call adds exactly one
    /// approval; repeated approvals by the same user are not deduplicated.
    pub async fn approve(&self, review_id: u64, user_id: u64) -> DomainResult<Review> {
        info!(review_id, user_id, "Processing approval request");

        let approver = self.users.get_by_id(user_id).await?;
        let review = self.reviews.get_by_id(review_id).await?;

        if review.is_authored_by(user_id) {
            return Err(DomainError::validation(format!(
                "Author '{}' is not allowed to approve own review.",
                approver.login_name
            )));
        }

        let approved = review.with_approval(self.approval.min_count)?;
        info!(
            review_id,
            approval_count = approved.approval_count,
            min_count = self.approval.min_count,
            approved = approved.approved,
            "Approval recorded"
        );

        self.reviews.upsert(approved).await
    }

    /// Resolve the POS and author a review points at.
    pub async fn details(&self, review: Review) -> DomainResult<ReviewDetails> {
        let owner_id = review.id.unwrap_or_default();
        let pos = self
            .pos
            .get_by_id(review.pos_id)
            .await
            .map_err(|e| dangling(e, owner_id))?;
        let author = self
            .users
            .get_by_id(review.author_id)
            .await
            .map_err(|e| dangling(e, owner_id))?;

        Ok(ReviewDetails {
            review,
            pos,
            author,
        })
    }

    pub async fn details_all(&self, reviews: Vec<Review>) -> DomainResult<Vec<ReviewDetails>> {
        let mut resolved = Vec::with_capacity(reviews.len());
        for review in reviews {
            resolved.push(self.details(review).await?);
        }
        Ok(resolved)
    }
}

/// A stored review whose POS or author vanished is a storage fault, not a
/// caller error.
fn dangling(err: DomainError, owner_id: u64) -> DomainError {
    match err {
        DomainError::NotFound { resource, id } => {
            error!(review_id = owner_id, resource, id, "Review references a missing record");
            DomainError::DanglingReference {
                owner: Review::RESOURCE,
                owner_id,
                resource,
                id,
            }
        }
        other => other,
    }
}

#[async_trait]
impl CrudService<Review> for ReviewService {
    async fn get_all(&self) -> Vec<Review> {
        self.reviews.get_all().await
    }

    async fn get_by_id(&self, id: u64) -> DomainResult<Review> {
        self.reviews.get_by_id(id).await
    }

    /// Approval state never comes from the caller: new reviews start
    /// unapproved, updates keep the stored state.
    async fn upsert(&self, review: Review) -> DomainResult<Review> {
        review.validate()?;
        let (pos_id, author_id) = (review.pos_id, review.author_id);

        match review.id {
            None => {
                info!(pos_id, author_id, "Creating new review");
                self.pos.get_by_id(pos_id).await?;
                self.users.get_by_id(author_id).await?;

                self.reviews
                    .upsert_unique(Review::new(pos_id, author_id, review.review))
                    .await
            }
            Some(id) => {
                info!(id, "Updating review");
                let existing = self.reviews.get_by_id(id).await?;
                self.pos.get_by_id(pos_id).await?;
                self.users.get_by_id(author_id).await?;

                self.reviews
                    .upsert_unique(Review {
                        pos_id,
                        author_id,
                        review: review.review,
                        ..existing
                    })
                    .await
            }
        }
    }

    async fn delete(&self, id: u64) -> DomainResult<()> {
        info!(id, "Deleting review");
        self.reviews.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    struct Fixture {
        service: ReviewService,
        reviews: Arc<InMemoryStore<Review>>,
        users: Arc<InMemoryStore<User>>,
        pos: u64,
        author: u64,
        alice: u64,
        bob: u64,
    }

    async fn fixture(min_count: u32) -> Fixture {
        let reviews = Arc::new(InMemoryStore::<Review>::new());
        let users = Arc::new(InMemoryStore::<User>::new());
        let pos_store = Arc::new(InMemoryStore::<Pos>::new());

        let pos = pos_store.upsert(Pos::new("Cafe Botanik", "")).await.unwrap();
        let mut ids = Vec::new();
        for login in ["author", "alice", "bob"] {
            let user = users
                .upsert(User::new(login, format!("{login}@example.com")))
                .await
                .unwrap();
            ids.push(user.id.unwrap());
        }

        let service = ReviewService::new(
            reviews.clone(),
            users.clone(),
            pos_store,
            ApprovalConfig { min_count },
        );

        Fixture {
            service,
            reviews,
            users,
            pos: pos.id.unwrap(),
            author: ids[0],
            alice: ids[1],
            bob: ids[2],
        }
    }

    async fn create_review(f: &Fixture) -> Review {
        f.service
            .upsert(Review::new(f.pos, f.author, "Smooth flat white"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_starts_unapproved() {
        let f = fixture(2).await;
        let mut input = Review::new(f.pos, f.author, "Smooth flat white");
        input.approval_count = 10;
        input.approved = true;

        let created = f.service.upsert(input).await.unwrap();

        assert_eq!(created.id, Some(1));
        assert_eq!(created.pos_id, f.pos);
        assert_eq!(created.author_id, f.author);
        assert_eq!(created.approval_count, 0);
        assert!(!created.approved);
    }

    #[tokio::test]
    async fn test_quorum_reached_after_two_approvals() {
        let f = fixture(2).await;
        let id = create_review(&f).await.id.unwrap();

        let once = f.service.approve(id, f.alice).await.unwrap();
        assert_eq!(once.approval_count, 1);
        assert!(!once.approved);

        let twice = f.service.approve(id, f.bob).await.unwrap();
        assert_eq!(twice.approval_count, 2);
        assert!(twice.approved);

        let stored = f.service.get_by_id(id).await.unwrap();
        assert_eq!(stored, twice);
    }

    #[tokio::test]
    async fn test_approved_tracks_count_after_every_approval() {
        let f = fixture(3).await;
        let id = create_review(&f).await.id.unwrap();

        for expected in 1..=5u32 {
            let review = f.service.approve(id, f.alice).await.unwrap();
            assert_eq!(review.approval_count, expected);
            assert_eq!(review.approved, expected >= 3);
        }
    }

    #[tokio::test]
    async fn test_approval_at_counter_limit_leaves_review_untouched() {
        let f = fixture(3).await;
        let created = create_review(&f).await;
        let saturated = f
            .reviews
            .upsert(Review {
                approval_count: u32::MAX,
                approved: true,
                ..created
            })
            .await
            .unwrap();

        let err = f
            .service
            .approve(saturated.id.unwrap(), f.alice)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = f.service.get_by_id(saturated.id.unwrap()).await.unwrap();
        assert_eq!(stored.version, saturated.version);
        assert_eq!(stored.approval_count, u32::MAX);
    }

    #[tokio::test]
    async fn test_author_cannot_approve_own_review() {
        let f = fixture(1).await;
        let id = create_review(&f).await.id.unwrap();
        f.service.approve(id, f.alice).await.unwrap();

        let err = f.service.approve(id, f.author).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = f.service.get_by_id(id).await.unwrap();
        assert_eq!(stored.approval_count, 1);
    }

    #[tokio::test]
    async fn test_approve_unknown_review_is_not_found() {
        let f = fixture(1).await;
        let err = f.service.approve(99, f.alice).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Review", 99));
    }

    #[tokio::test]
    async fn test_unknown_approver_checked_before_review() {
        let f = fixture(1).await;
        let err = f.service.approve(99, 500).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("User", 500));
    }

    #[tokio::test]
    async fn test_second_review_by_same_author_rejected() {
        let f = fixture(1).await;
        create_review(&f).await;

        let err = f
            .service
            .upsert(Review::new(f.pos, f.author, "Changed my mind"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(f.service.count().await, 1);
    }

    #[tokio::test]
    async fn test_create_with_unknown_pos_is_not_found() {
        let f = fixture(1).await;
        let err = f
            .service
            .upsert(Review::new(42, f.author, "?"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("POS", 42));
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let f = fixture(1).await;
        let err = f
            .service
            .upsert(Review::new(f.pos, f.author, "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_approval_state() {
        let f = fixture(1).await;
        let id = create_review(&f).await.id.unwrap();
        f.service.approve(id, f.alice).await.unwrap();

        let mut change = Review::new(f.pos, f.author, "Even better now");
        change.id = Some(id);
        let updated = f.service.upsert(change).await.unwrap();

        assert_eq!(updated.review, "Even better now");
        assert_eq!(updated.approval_count, 1);
        assert!(updated.approved);
    }

    #[tokio::test]
    async fn test_update_missing_review_is_not_found() {
        let f = fixture(1).await;
        let mut change = Review::new(f.pos, f.author, "text");
        change.id = Some(7);

        let err = f.service.upsert(change).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Review", 7));
    }

    #[tokio::test]
    async fn test_update_onto_taken_author_pair_rejected() {
        let f = fixture(1).await;
        create_review(&f).await;
        let other = f
            .service
            .upsert(Review::new(f.pos, f.alice, "Alice's take"))
            .await
            .unwrap();

        let mut change = Review::new(f.pos, f.author, "Alice's take");
        change.id = other.id;
        let err = f.service.upsert(change).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_filter_by_approval_status() {
        let f = fixture(1).await;
        let approved_id = create_review(&f).await.id.unwrap();
        f.service
            .upsert(Review::new(f.pos, f.alice, "Pending one"))
            .await
            .unwrap();
        f.service.approve(approved_id, f.bob).await.unwrap();

        let approved = f.service.filter(f.pos, true).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, Some(approved_id));

        let pending = f.service.filter(f.pos, false).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending.iter().all(|r| !r.approved && r.pos_id == f.pos));
    }

    #[tokio::test]
    async fn test_filter_unknown_pos_is_not_found() {
        let f = fixture(1).await;
        let err = f.service.filter(77, true).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("POS", 77));
    }

    #[tokio::test]
    async fn test_details_show_current_author() {
        let f = fixture(1).await;
        let review = create_review(&f).await;

        let author = f.users.get_by_id(f.author).await.unwrap();
        f.users
            .upsert(User {
                login_name: "renamed".to_string(),
                ..author
            })
            .await
            .unwrap();

        let details = f.service.details(review).await.unwrap();
        assert_eq!(details.author.login_name, "renamed");
        assert_eq!(details.pos.name, "Cafe Botanik");
    }

    #[tokio::test]
    async fn test_details_with_missing_author_is_dangling() {
        let f = fixture(1).await;
        let review = create_review(&f).await;
        f.users.delete(f.author).await.unwrap();

        let err = f.service.details(review).await.unwrap_err();
        assert!(matches!(err, DomainError::DanglingReference { resource: "User", .. }));
    }

    #[tokio::test]
    async fn test_racing_approval_is_rejected_not_lost() {
        let f = fixture(2).await;
        let review = create_review(&f).await;

        // A second writer lands between our read and our write.
        let stale = review.clone().with_approval(2).unwrap();
        f.service.approve(review.id.unwrap(), f.alice).await.unwrap();

        let err = f.reviews.upsert(stale).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentModification { .. }));
        assert_eq!(
            f.service
                .get_by_id(review.id.unwrap())
                .await
                .unwrap()
                .approval_count,
            1
        );
    }
}
