use async_trait::async_trait;
use sqlx::{MySql, Pool};

use super::interface::{RefreshTokenRepository, Result, UserRepository};
use super::model::{RefreshToken, User};

pub struct MySqlUserRepository {
    pool: Pool<MySql>,
}

impl MySqlUserRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, full_name, email, password_hash, role, status,
                 verification_code, verification_code_expires_at,
                 reset_code, reset_code_expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.verification_code)
        .bind(user.verification_code_expires_at)
        .bind(&user.reset_code)
        .bind(user.reset_code_expires_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET full_name = ?, email = ?, password_hash = ?, role = ?, status = ?,
                verification_code = ?, verification_code_expires_at = ?,
                reset_code = ?, reset_code_expires_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(&user.verification_code)
        .bind(user.verification_code_expires_at)
        .bind(&user.reset_code)
        .bind(user.reset_code_expires_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub struct MySqlRefreshTokenRepository {
    pool: Pool<MySql>,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn save(&self, token: &RefreshToken) -> Result<()> {
        // user_id is unique: a second session for the same user overwrites
        // the existing row instead of inserting one.
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_value, expires_at, revoked, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                token_value = VALUES(token_value),
                expires_at = VALUES(expires_at),
                revoked = VALUES(revoked)
            "#,
        )
        .bind(&token.id)
        .bind(&token.user_id)
        .bind(&token.token_value)
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<RefreshToken>> {
        let token =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(token)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>> {
        let token =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_value = ?")
                .bind(value)
                .fetch_optional(&self.pool)
                .await?;

        Ok(token)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
