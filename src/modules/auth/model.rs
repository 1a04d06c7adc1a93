use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Verification and reset codes stay valid for this long after issuance.
pub const CODE_TTL: Duration = Duration::minutes(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Dealer,
}

/// Outcome of checking a presented code against a stored one. Expiry is
/// checked before the match so a stale code reports as expired even when the
/// digits are right; the window is closed at exactly the expiry instant.
#[derive(Debug, PartialEq, Eq)]
pub enum CodeCheck {
    Ok,
    Expired,
    Mismatch,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub verification_code: Option<String>,
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            email,
            password_hash,
            role: UserRole::Dealer,
            status: UserStatus::Pending,
            verification_code: None,
            verification_code_expires_at: None,
            reset_code: None,
            reset_code_expires_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Stores a fresh verification code and (re)opens its window. An account
    /// holding an unconsumed verification code is by definition not ACTIVE.
    pub fn set_verification_code(&mut self, code: String, issued_at: DateTime<Utc>) {
        self.verification_code = Some(code);
        self.verification_code_expires_at = Some(issued_at + CODE_TTL);
        self.status = UserStatus::Pending;
    }

    pub fn check_verification_code(&self, presented: &str, at: DateTime<Utc>) -> CodeCheck {
        check_code(
            self.verification_code.as_deref(),
            self.verification_code_expires_at,
            presented,
            at,
        )
    }

    pub fn clear_verification_code(&mut self) {
        self.verification_code = None;
        self.verification_code_expires_at = None;
    }

    pub fn mark_verified(&mut self) {
        self.status = UserStatus::Active;
        self.clear_verification_code();
    }

    pub fn set_reset_code(&mut self, code: String, issued_at: DateTime<Utc>) {
        self.reset_code = Some(code);
        self.reset_code_expires_at = Some(issued_at + CODE_TTL);
    }

    pub fn check_reset_code(&self, presented: &str, at: DateTime<Utc>) -> CodeCheck {
        check_code(
            self.reset_code.as_deref(),
            self.reset_code_expires_at,
            presented,
            at,
        )
    }

    pub fn clear_reset_code(&mut self) {
        self.reset_code = None;
        self.reset_code_expires_at = None;
    }
}

fn check_code(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    presented: &str,
    at: DateTime<Utc>,
) -> CodeCheck {
    let (Some(stored), Some(expires_at)) = (stored, expires_at) else {
        // Consumed or never issued; nothing to replay against.
        return CodeCheck::Mismatch;
    };

    if at >= expires_at {
        return CodeCheck::Expired;
    }

    if !stored.eq_ignore_ascii_case(presented) {
        return CodeCheck::Mismatch;
    }

    CodeCheck::Ok
}

/// Server-side session record: at most one row per user. `token_value` is an
/// opaque lookup key, not itself a signed token.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: String,
    pub user_id: String,
    pub token_value: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at
    }
}
