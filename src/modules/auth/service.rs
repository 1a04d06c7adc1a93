use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::services::hashing;
use crate::services::jwt::TokenIssuer;

use super::interface::{AuthError, Result, UserRepository};
use super::model::User;
use super::session::SessionStore;
use super::verification::{IdentityVerifier, MIN_PASSWORD_LEN};

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LoginResult {
    pub user: User,
    pub tokens: TokenPair,
}

/// Composes the guard, issuer, verifier and session store into the external
/// auth operations. Password policy lives here, not in the hashing service.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: SessionStore,
    issuer: TokenIssuer,
    verifier: IdentityVerifier,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: SessionStore,
        issuer: TokenIssuer,
        verifier: IdentityVerifier,
    ) -> Self {
        Self {
            users,
            sessions,
            issuer,
            verifier,
        }
    }

    /// Creates a PENDING account and kicks off the verification flow.
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> Result<User> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        if self.users.email_exists(email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hashing::hash_password(password)?;
        let mut user = User::new(full_name.to_string(), email.to_string(), password_hash);

        self.users.create(&user).await?;
        self.verifier.issue_verification_code(&mut user).await?;

        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        // Unknown email and wrong password answer identically.
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !hashing::password_matches(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active() {
            return Err(AuthError::NotVerified);
        }

        let session = self.sessions.issue_or_rotate(&user.id).await?;

        let access_token = self.issuer.issue_access(&user.id, &user.email)?;
        let refresh_token =
            self.issuer
                .issue_refresh(&user.id, &user.email, &session.token_value)?;
        let expires_at = Utc::now() + self.issuer.access_ttl();

        Ok(LoginResult {
            user,
            tokens: TokenPair {
                access_token,
                refresh_token,
                expires_at,
            },
        })
    }

    /// Exchanges a presented refresh token for a fresh access token. The
    /// refresh value itself is not rotated here.
    pub async fn refresh(&self, presented: &str) -> Result<(String, DateTime<Utc>)> {
        let claims = self
            .issuer
            .validate(presented)
            .ok()
            .ok_or(AuthError::RefreshInvalid)?;

        if !claims.is_refresh() {
            return Err(AuthError::RefreshInvalid);
        }

        let access_token = self.sessions.refresh(&claims.jti).await?;
        Ok((access_token, Utc::now() + self.issuer.access_ttl()))
    }

    /// Revokes the session behind the presented refresh token. Absent,
    /// malformed or already-dead tokens are ignored: logout always succeeds.
    pub async fn logout(&self, presented: Option<&str>) -> Result<()> {
        let Some(presented) = presented else {
            return Ok(());
        };

        if let Some(claims) = self.issuer.validate(presented).ok() {
            if claims.is_refresh() {
                self.sessions.revoke(&claims.jti).await?;
            }
        }

        Ok(())
    }

    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !hashing::password_matches(old_password, &user.password_hash)? {
            return Err(AuthError::PasswordMismatch);
        }

        if hashing::password_matches(new_password, &user.password_hash)? {
            return Err(AuthError::PasswordReuse);
        }

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        user.password_hash = hashing::hash_password(new_password)?;
        self.users.update(&user).await?;

        Ok(())
    }

    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }
}
