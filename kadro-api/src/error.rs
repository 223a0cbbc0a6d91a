/// Error handling for the API server
///
/// One unified error type covering the workflow failure taxonomy. Every
/// failure is raised at the point of detection and aborts the remaining
/// steps of that call; handlers return `Result<T, ApiError>` and the
/// `IntoResponse` impl maps each kind to an HTTP status plus the uniform
/// envelope shape with `success = false`.
///
/// # Example
///
/// ```
/// use kadro_api::error::{ApiError, ApiResult};
///
/// fn check(verified: bool) -> ApiResult<()> {
///     if !verified {
///         return Err(ApiError::MailNotVerified);
///     }
///     Ok(())
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type: the workflow failure taxonomy
#[derive(Debug)]
pub enum ApiError {
    /// Registration email is already taken (409)
    MailAlreadyExists,

    /// Token signature/format invalid, or unknown to the store (401)
    InvalidToken,

    /// Verification token was already consumed (410)
    TokenAlreadyUsed,

    /// Verification token expired; the record has been retired (410)
    ExpiredToken,

    /// Referenced company no longer exists (404)
    CompanyNotFound,

    /// Referenced user no longer exists (404)
    UserNotFound,

    /// Referenced asset no longer exists (404)
    AssetNotFound,

    /// No principal matches the email/password pair (401)
    InvalidCredentials,

    /// Company credentials are valid but the mail is unverified (403)
    MailNotVerified,

    /// Password-reset requested for an unknown email (404)
    MailNotFound,

    /// New password and confirmation differ (400)
    PasswordsDoNotMatch,

    /// Caller lacks the role or ownership the operation requires (403)
    Unauthorized,

    /// Asset approve/reject outside the pending state (409)
    InvalidStateTransition,

    /// Request payload failed validation (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body, mirroring the success envelope shape
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP-style status code
    pub code: u16,

    /// Always false
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// HTTP status this error maps to at the boundary
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MailAlreadyExists => StatusCode::CONFLICT,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::TokenAlreadyUsed => StatusCode::GONE,
            ApiError::ExpiredToken => StatusCode::GONE,
            ApiError::CompanyNotFound => StatusCode::NOT_FOUND,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::AssetNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MailNotVerified => StatusCode::FORBIDDEN,
            ApiError::MailNotFound => StatusCode::NOT_FOUND,
            ApiError::PasswordsDoNotMatch => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::InvalidStateTransition => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message surfaced to the caller
    pub fn message(&self) -> String {
        match self {
            ApiError::MailAlreadyExists => "Email address is already registered".to_string(),
            ApiError::InvalidToken => "Invalid token".to_string(),
            ApiError::TokenAlreadyUsed => "Verification token was already used".to_string(),
            ApiError::ExpiredToken => "Verification token has expired".to_string(),
            ApiError::CompanyNotFound => "Company not found".to_string(),
            ApiError::UserNotFound => "User not found".to_string(),
            ApiError::AssetNotFound => "Asset not found".to_string(),
            ApiError::InvalidCredentials => "Invalid email or password".to_string(),
            ApiError::MailNotVerified => {
                "Email is not verified; a new verification mail has been sent".to_string()
            }
            ApiError::MailNotFound => "No account with that email address".to_string(),
            ApiError::PasswordsDoNotMatch => "Passwords do not match".to_string(),
            ApiError::Unauthorized => "Not authorized to perform this operation".to_string(),
            ApiError::InvalidStateTransition => {
                "Assignment is not pending; it can no longer be approved or rejected".to_string()
            }
            ApiError::ValidationError(errors) => {
                format!("Request validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(ref msg) = self {
            // Log internal errors but don't expose details to clients
            tracing::error!("Internal error: {}", msg);
        }

        let status = self.status();
        let details = match self {
            ApiError::ValidationError(ref errors) => Some(errors.clone()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            success: false,
            message: self.message(),
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // Unique constraint on email surfaces as the taxonomy kind
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::MailAlreadyExists;
                    }
                }
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert request validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

/// Convert media store errors to API errors
impl From<crate::media::MediaError> for ApiError {
    fn from(err: crate::media::MediaError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

/// Convert token errors to API errors
///
/// Expiry of a purpose token surfaces as `ExpiredToken`; everything else
/// about a bad token is `InvalidToken`.
impl From<kadro_shared::auth::jwt::TokenError> for ApiError {
    fn from(err: kadro_shared::auth::jwt::TokenError) -> Self {
        match err {
            kadro_shared::auth::jwt::TokenError::Expired => ApiError::ExpiredToken,
            _ => ApiError::InvalidToken,
        }
    }
}
