use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, Json};

use super::model::{RefreshToken, User};
use super::schema::ErrorResponse;

pub type Result<T> = std::result::Result<T, AuthError>;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn update(&self, user: &User) -> Result<()>;
}

/// Persistence behind the session store. `save` upserts on the owning user:
/// the schema keeps at most one row per user, so saving an existing user's
/// session overwrites the previous row instead of inserting a second one.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn save(&self, token: &RefreshToken) -> Result<()>;
    async fn find_by_user(&self, user_id: &str) -> Result<Option<RefreshToken>>;
    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn delete_for_user(&self, user_id: &str) -> Result<()>;
}

// =============================================================================
// ERROR TAXONOMY
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account not verified yet. Check your email for the code.")]
    NotVerified,

    #[error("User already verified")]
    AlreadyVerified,

    #[error("Invalid verification code")]
    CodeInvalid,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid refresh token")]
    RefreshInvalid,

    #[error("Refresh token expired. Log in again.")]
    RefreshExpired,

    #[error("Refresh token revoked")]
    RefreshRevoked,

    #[error("Current password is incorrect")]
    PasswordMismatch,

    #[error("New password must differ from the current one")]
    PasswordReuse,

    #[error("Password must be at least 8 characters")]
    WeakPassword,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotVerified => StatusCode::FORBIDDEN,
            Self::AlreadyVerified => StatusCode::BAD_REQUEST,
            Self::CodeInvalid => StatusCode::BAD_REQUEST,
            Self::CodeExpired => StatusCode::GONE,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyExists => StatusCode::CONFLICT,
            Self::RefreshInvalid => StatusCode::UNAUTHORIZED,
            Self::RefreshExpired => StatusCode::UNAUTHORIZED,
            Self::RefreshRevoked => StatusCode::FORBIDDEN,
            Self::PasswordMismatch => StatusCode::BAD_REQUEST,
            Self::PasswordReuse => StatusCode::BAD_REQUEST,
            Self::WeakPassword => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Hashing(_) | Self::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        // Infrastructure detail stays in the logs, not the response body.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "auth request failed");
            ErrorResponse::new("Internal server error")
        } else {
            ErrorResponse::new(self.to_string())
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Hashing(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::Token(err.to_string())
    }
}
