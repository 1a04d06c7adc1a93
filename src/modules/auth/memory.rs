//! In-memory repository implementations. Back the integration test harness
//! and local runs that have no MySQL at hand.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::interface::{RefreshTokenRepository, Result, UserRepository};
use super::model::{RefreshToken, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>, // keyed by user id
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| user.email == email))
    }

    async fn update(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>, // keyed by user id: one row per user
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> Result<()> {
        self.tokens
            .write()
            .await
            .insert(token.user_id.clone(), token.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(user_id).cloned())
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|token| token.token_value == value)
            .cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.tokens
            .write()
            .await
            .retain(|_, token| token.id != id);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<()> {
        self.tokens.write().await.remove(user_id);
        Ok(())
    }
}
