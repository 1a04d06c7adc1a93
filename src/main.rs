use std::sync::Arc;

use marketplace_auth::config::{init_db, Config};
use marketplace_auth::modules::auth::crud::{MySqlRefreshTokenRepository, MySqlUserRepository};
use marketplace_auth::services::email::{EmailSender, HttpEmailSender, NoopEmailSender};
use marketplace_auth::services::jwt::TokenIssuer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load environment configuration");

    let db = init_db(&config.database_url).await;
    tracing::info!("Connected to MySQL");

    let users = Arc::new(MySqlUserRepository::new(db.clone()));
    let refresh_tokens = Arc::new(MySqlRefreshTokenRepository::new(db));

    let email: Arc<dyn EmailSender> = match config.mail {
        Some(mail) => Arc::new(HttpEmailSender::new(
            mail.api_url,
            mail.from,
            mail.server_token,
        )),
        None => {
            tracing::warn!("mail settings missing, codes will not be delivered");
            Arc::new(NoopEmailSender)
        }
    };

    let token_issuer = TokenIssuer::new(config.jwt_secret);

    let app = marketplace_auth::create_app(users, refresh_tokens, email, token_issuer).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
