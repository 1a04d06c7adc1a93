use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::services::jwt::TokenIssuer;

use super::interface::{AuthError, RefreshTokenRepository, Result, UserRepository};
use super::model::RefreshToken;

/// Single source of truth for whether a refresh token is honorable. Keeps at
/// most one live row per user; a signed refresh JWT is only as good as the
/// row its `jti` points at.
#[derive(Clone)]
pub struct SessionStore {
    tokens: Arc<dyn RefreshTokenRepository>,
    users: Arc<dyn UserRepository>,
    issuer: TokenIssuer,
}

impl SessionStore {
    pub fn new(
        tokens: Arc<dyn RefreshTokenRepository>,
        users: Arc<dyn UserRepository>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            tokens,
            users,
            issuer,
        }
    }

    /// Creates the user's session row, or rotates it in place: fresh opaque
    /// value, fresh expiry, revoked cleared. The previous value stops
    /// matching anything. Concurrent calls for one user race last-writer-wins,
    /// which is fine while the model is one session per user.
    pub async fn issue_or_rotate(&self, user_id: &str) -> Result<RefreshToken> {
        let now = Utc::now();

        let session = match self.tokens.find_by_user(user_id).await? {
            Some(mut existing) => {
                existing.token_value = Uuid::new_v4().to_string();
                existing.expires_at = now + self.issuer.refresh_ttl();
                existing.revoked = false;
                existing
            }
            None => RefreshToken {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                token_value: Uuid::new_v4().to_string(),
                expires_at: now + self.issuer.refresh_ttl(),
                revoked: false,
                created_at: now,
            },
        };

        self.tokens.save(&session).await?;
        Ok(session)
    }

    /// Expiry is observed lazily: an expired row is deleted on sight and the
    /// check fails with Expired. Revocation is checked second, so a token
    /// both expired and revoked reports Expired.
    pub async fn check_live(&self, session: &RefreshToken) -> Result<()> {
        if session.is_expired(Utc::now()) {
            self.tokens.delete(&session.id).await?;
            return Err(AuthError::RefreshExpired);
        }

        if session.revoked {
            return Err(AuthError::RefreshRevoked);
        }

        Ok(())
    }

    /// Exchanges a presented opaque value for a fresh access token. The
    /// stored value is NOT rotated here; rotation only happens at
    /// `issue_or_rotate` (login or explicit re-issue).
    pub async fn refresh(&self, presented_value: &str) -> Result<String> {
        let session = self
            .tokens
            .find_by_value(presented_value)
            .await?
            .ok_or(AuthError::RefreshInvalid)?;

        self.check_live(&session).await?;

        let user = self
            .users
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::RefreshInvalid)?;

        Ok(self.issuer.issue_access(&user.id, &user.email)?)
    }

    /// Marks the matching row revoked. Unknown values are a no-op, not an
    /// error: logout must be idempotent.
    pub async fn revoke(&self, presented_value: &str) -> Result<()> {
        if let Some(mut session) = self.tokens.find_by_value(presented_value).await? {
            session.revoked = true;
            self.tokens.save(&session).await?;
        }

        Ok(())
    }

    /// Hard-deletes the user's session row; used when the account goes away.
    pub async fn delete_for_user(&self, user_id: &str) -> Result<()> {
        self.tokens.delete_for_user(user_id).await
    }
}
