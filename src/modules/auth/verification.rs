use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::services::email::{self, EmailSender};
use crate::services::hashing;

use super::interface::{AuthError, Result, UserRepository};
use super::model::{CodeCheck, User};

pub const MIN_PASSWORD_LEN: usize = 8;

/// 6-digit zero-padded numeric code, `000000`–`999999`.
pub fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

/// Drives the two short-lived-code flows against the user record. The
/// verification and reset channels are independent: a reset code never grants
/// verification status and vice versa.
#[derive(Clone)]
pub struct IdentityVerifier {
    users: Arc<dyn UserRepository>,
    email: Arc<dyn EmailSender>,
}

impl IdentityVerifier {
    pub fn new(users: Arc<dyn UserRepository>, email: Arc<dyn EmailSender>) -> Self {
        Self { users, email }
    }

    /// Stamps a fresh verification code onto the user and hands the mail off
    /// to the background. The code is persisted before dispatch, so it stays
    /// valid even when delivery fails.
    pub async fn issue_verification_code(&self, user: &mut User) -> Result<()> {
        let code = generate_code();
        user.set_verification_code(code.clone(), Utc::now());
        self.users.update(user).await?;

        email::spawn_verification_email(self.email.clone(), user.email.clone(), code);
        Ok(())
    }

    pub async fn confirm_verification(&self, user_email: &str, code: &str) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(user_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_active() {
            return Err(AuthError::AlreadyVerified);
        }

        match user.check_verification_code(code, Utc::now()) {
            CodeCheck::Expired => {
                // Expired codes are cleared on observation and cannot be
                // replayed.
                user.clear_verification_code();
                self.users.update(&user).await?;
                Err(AuthError::CodeExpired)
            }
            CodeCheck::Mismatch => Err(AuthError::CodeInvalid),
            CodeCheck::Ok => {
                user.mark_verified();
                self.users.update(&user).await?;
                Ok(())
            }
        }
    }

    /// Overwrites any outstanding verification code, restarting its window.
    pub async fn resend_verification_code(&self, user_email: &str) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(user_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_active() {
            return Err(AuthError::AlreadyVerified);
        }

        self.issue_verification_code(&mut user).await
    }

    pub async fn issue_reset_code(&self, user_email: &str) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(user_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let code = generate_code();
        user.set_reset_code(code.clone(), Utc::now());
        self.users.update(&user).await?;

        email::spawn_password_reset_email(self.email.clone(), user.email.clone(), code);
        Ok(())
    }

    pub async fn confirm_reset(
        &self,
        user_email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(user_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        match user.check_reset_code(code, Utc::now()) {
            CodeCheck::Expired => {
                user.clear_reset_code();
                self.users.update(&user).await?;
                Err(AuthError::CodeExpired)
            }
            CodeCheck::Mismatch => Err(AuthError::CodeInvalid),
            CodeCheck::Ok => {
                if new_password.len() < MIN_PASSWORD_LEN {
                    return Err(AuthError::WeakPassword);
                }

                user.password_hash = hashing::hash_password(new_password)?;
                user.clear_reset_code();
                self.users.update(&user).await?;
                Ok(())
            }
        }
    }
}
