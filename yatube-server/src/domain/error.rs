use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("group already exists: {0}")]
    GroupAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::UserNotFound(_)
                | DomainError::GroupNotFound(_)
                | DomainError::PostNotFound(_)
                | DomainError::NotFound(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound(_)
            | DomainError::GroupNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::UserAlreadyExists(_) | DomainError::GroupAlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // never leak database errors to clients
            DomainError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            DomainError::PostNotFound(id) => Some(json!({ "resource": "post", "id": id })),
            DomainError::GroupNotFound(slug) => Some(json!({ "resource": "group", "slug": slug })),
            DomainError::NotFound(path) => Some(json!({ "path": path })),
            DomainError::UserNotFound(username) => {
                Some(json!({ "resource": "user", "username": username }))
            }
            DomainError::Validation { field, reason } => {
                Some(json!({ "field": field, "reason": reason }))
            }
            DomainError::Forbidden => {
                Some(json!({ "message": "only the author may change this resource" }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            DomainError::validation("text", "empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::GroupNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DomainError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            DomainError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DomainError::GroupAlreadyExists("x".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn not_found_covers_every_missing_reference() {
        assert!(DomainError::PostNotFound(Uuid::nil()).is_not_found());
        assert!(DomainError::UserNotFound("a".into()).is_not_found());
        assert!(DomainError::GroupNotFound("a".into()).is_not_found());
        assert!(DomainError::NotFound("/api/posts/x".into()).is_not_found());
        assert!(!DomainError::Forbidden.is_not_found());
    }
}
