/// Error handling for the API server
///
/// Every failure leaves the server as
///
/// ```json
/// { "message": "Not Found", "error": "Project not found" }
/// ```
///
/// with a `details` array added for validation failures. Handlers return
/// `ApiResult<T>` and let `?` do the mapping.
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiError, ApiResult};
///
/// fn find(found: bool) -> ApiResult<&'static str> {
///     if !found {
///         return Err(ApiError::NotFound("Project not found".to_string()));
///     }
///     Ok("project")
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::password::PasswordError;
use taskboard_shared::auth::AuthError;
use taskboard_shared::error::{ServiceError, StoreError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Reason given when a role or permission check fails
pub const INSUFFICIENT_PERMISSIONS: &str = "Forbidden: Insufficient permissions";

/// Reason given to banned users
pub const BANNED: &str = "You have been banned from this application";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Request failed validation (400)
    Validation(Vec<ValidationErrorDetail>),

    /// Missing or invalid session, or wrong credentials (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Addressed entity does not exist (404)
    NotFound(String),

    /// Unique constraint, e.g. duplicate e-mail (409)
    Conflict(String),

    /// Anything else (500); the cause is logged, never returned
    Internal(String),
}

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Location of the offending value, e.g. `body.name` or `query.limit`
    pub path: String,

    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status title, e.g. "Not Found"
    pub message: String,

    /// What went wrong
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// 401 with the generic reason
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, error, details) = match self {
            ApiError::Validation(mut errors) => {
                errors.sort_by(|a, b| a.path.cmp(&b.path));
                let details = (!errors.is_empty()).then_some(errors);
                ("Validation Error", "Validation error".to_string(), details)
            }
            ApiError::Unauthorized(msg) => ("Unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("Forbidden", msg, None),
            ApiError::NotFound(msg) => ("Not Found", msg, None),
            ApiError::Conflict(msg) => ("Conflict", msg, None),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    "Internal Server Error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            message: message.to_string(),
            error,
            details,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::Store(err) => err.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            StoreError::MissingReference(_) | StoreError::Database(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::Banned => ApiError::Forbidden(BANNED.to_string()),
            AuthError::Password(err) => err.into(),
            AuthError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::error::Resource;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::Validation(vec![ValidationErrorDetail {
            path: "body.name".to_string(),
            message: "Name is required".to_string(),
        }]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let err: ApiError = ServiceError::NotFound(Resource::Project).into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"message": "Not Found", "error": "Project not found"})
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_is_sorted() {
        let err = ApiError::Validation(vec![
            ValidationErrorDetail {
                path: "body.title".to_string(),
                message: "Title is required".to_string(),
            },
            ValidationErrorDetail {
                path: "body.projectId".to_string(),
                message: "Project ID is required".to_string(),
            },
        ]);
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation Error");
        assert_eq!(body["error"], "Validation error");
        assert_eq!(body["details"][0]["path"], "body.projectId");
        assert_eq!(body["details"][1]["path"], "body.title");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let err: ApiError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Internal Server Error",
                "error": "Internal server error"
            })
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::EmailTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::Banned).status(),
            StatusCode::FORBIDDEN
        );
    }
}
