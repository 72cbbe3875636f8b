use crate::config::ApprovalConfig;
use crate::domain::{Pos, Review, User};
use crate::error::DomainError;
use crate::service::review::ReviewDetails;
use crate::service::{PosService, ReviewService, UserService};
use crate::storage::InMemoryStore;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<ReviewService>,
    pub pos: Arc<PosService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// Services wired to fresh in-memory stores.
    pub fn in_memory(approval: ApprovalConfig) -> Self {
        let reviews = Arc::new(InMemoryStore::<Review>::new());
        let users = Arc::new(InMemoryStore::<User>::new());
        let pos = Arc::new(InMemoryStore::<Pos>::new());

        Self {
            reviews: Arc::new(ReviewService::new(
                reviews.clone(),
                users.clone(),
                pos.clone(),
                approval,
            )),
            pos: Arc::new(PosService::new(pos, reviews.clone())),
            users: Arc::new(UserService::new(users, reviews)),
        }
    }
}

/// Reference to another resource by id. Extra fields are ignored, so a
/// full object previously returned by the API is accepted too.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EntityRef {
    pub id: u64,
}

/// Body of `POST /api/reviews` and `PUT /api/reviews/{id}`
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub pos: EntityRef,
    pub author: EntityRef,
    pub review: String,
}

impl ReviewRequest {
    pub fn into_domain(self, id: Option<u64>) -> Review {
        Review {
            id,
            ..Review::new(self.pos.id, self.author.id, self.review)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pos: PosDto,
    pub author: UserDto,
    pub review: String,
    pub approval_count: u32,
    pub approved: bool,
}

impl From<ReviewDetails> for ReviewDto {
    fn from(details: ReviewDetails) -> Self {
        let ReviewDetails {
            review,
            pos,
            author,
        } = details;
        Self {
            id: review.id,
            created_at: review.created_at,
            updated_at: review.updated_at,
            pos: pos.into(),
            author: author.into(),
            review: review.review,
            approval_count: review.approval_count,
            approved: review.approved,
        }
    }
}

/// Query of `GET /api/reviews/filter`
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub pos_id: u64,
    pub approved: bool,
}

/// Query of `PUT /api/reviews/{id}`; `user_id` turns the call into an approval.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPutQuery {
    pub user_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub postal_code: u32,
    #[serde(default)]
    pub city: String,
}

impl PosRequest {
    pub fn into_domain(self, id: Option<u64>) -> Pos {
        Pos {
            id,
            name: self.name,
            description: self.description,
            street: self.street,
            house_number: self.house_number,
            postal_code: self.postal_code,
            city: self.city,
            ..Pos::new("", "")
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosDto {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub name: String,
    pub description: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
}

impl From<Pos> for PosDto {
    fn from(pos: Pos) -> Self {
        Self {
            id: pos.id,
            created_at: pos.created_at,
            updated_at: pos.updated_at,
            name: pos.name,
            description: pos.description,
            street: pos.street,
            house_number: pos.house_number,
            postal_code: pos.postal_code,
            city: pos.city,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub login_name: String,
    pub email_address: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserRequest {
    pub fn into_domain(self, id: Option<u64>) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            ..User::new(self.login_name, self.email_address)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub login_name: String,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            login_name: user.login_name,
            email_address: user.email_address,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::ConcurrentModification { .. } => AppError::Conflict(err.to_string()),
            DomainError::DanglingReference { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => {
                warn!("Rejected concurrent write: {}", msg);
                (StatusCode::CONFLICT, msg)
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse {
            error: status.to_string(),
            message,
        }))
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_accepts_full_objects() {
        let request: ReviewRequest = serde_json::from_str(
            r#"{"pos": {"id": 5, "name": "Mensa"}, "author": {"id": 2}, "review": "ok"}"#,
        )
        .unwrap();
        let review = request.into_domain(None);
        assert_eq!(review.pos_id, 5);
        assert_eq!(review.author_id, 2);
        assert_eq!(review.approval_count, 0);
    }

    #[test]
    fn test_review_dto_is_camel_case() {
        let mut review = Review::new(1, 1, "ok");
        review.approval_count = 2;
        let details = ReviewDetails {
            review,
            pos: Pos::new("Mensa", ""),
            author: User::new("jane", "j@x.org"),
        };
        let json = serde_json::to_value(ReviewDto::from(details)).unwrap();

        assert_eq!(json["approvalCount"], 2);
        assert_eq!(json["approved"], false);
        assert_eq!(json["author"]["loginName"], "jane");
        assert_eq!(json["pos"]["name"], "Mensa");
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        let status = |err: DomainError| AppError::from(err).into_response().status();

        assert_eq!(status(DomainError::not_found("Review", 1)), StatusCode::NOT_FOUND);
        assert_eq!(status(DomainError::validation("nope")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(DomainError::ConcurrentModification {
                resource: "Review",
                id: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(DomainError::DanglingReference {
                owner: "Review",
                owner_id: 1,
                resource: "User",
                id: 2
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
