use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected the message: {0}")]
    Rejected(u16),
}

/// Outbound mail collaborator. Delivery is best-effort: callers hand messages
/// off through the `spawn_*` helpers and never await the result.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError>;
    async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), EmailError>;
}

pub fn spawn_verification_email(sender: Arc<dyn EmailSender>, to: String, code: String) {
    tokio::spawn(async move {
        if let Err(err) = sender.send_verification_code(&to, &code).await {
            tracing::warn!(to = %to, error = %err, "failed to deliver verification code");
        }
    });
}

pub fn spawn_password_reset_email(sender: Arc<dyn EmailSender>, to: String, code: String) {
    tokio::spawn(async move {
        if let Err(err) = sender.send_password_reset_code(&to, &code).await {
            tracing::warn!(to = %to, error = %err, "failed to deliver password reset code");
        }
    });
}

/// Transactional-mail HTTP client (Postmark-style JSON API).
pub struct HttpEmailSender {
    client: Client,
    base_url: String,
    from: String,
    server_token: String,
}

const AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: String,
}

impl HttpEmailSender {
    pub fn new(base_url: String, from: String, server_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            from,
            server_token,
        }
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let url = format!("{}/email", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header(AUTH_HEADER, &self.server_token)
            .json(&SendEmailRequest {
                from: &self.from,
                to,
                subject,
                text_body: body,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmailError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        self.send(
            to,
            "Verify your account",
            format!("Your verification code is {code}. It expires in 10 minutes."),
        )
        .await
    }

    async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        self.send(
            to,
            "Password reset",
            format!("Your password reset code is {code}. It expires in 10 minutes."),
        )
        .await
    }
}

/// Stand-in sender for environments without mail credentials. Codes stay
/// valid either way; only delivery is skipped.
#[derive(Default)]
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send_verification_code(&self, to: &str, _code: &str) -> Result<(), EmailError> {
        tracing::info!(to, "mail unconfigured, skipping verification code delivery");
        Ok(())
    }

    async fn send_password_reset_code(&self, to: &str, _code: &str) -> Result<(), EmailError> {
        tracing::info!(to, "mail unconfigured, skipping password reset delivery");
        Ok(())
    }
}
