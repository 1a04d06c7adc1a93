use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub mail: Option<MailConfig>,
}

/// Transactional-mail API settings. Optional as a block: without them the
/// service runs with delivery disabled.
pub struct MailConfig {
    pub api_url: String,
    pub from: String,
    pub server_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let mail = match (
            env::var("MAIL_API_URL"),
            env::var("MAIL_FROM"),
            env::var("MAIL_SERVER_TOKEN"),
        ) {
            (Ok(api_url), Ok(from), Ok(server_token)) => Some(MailConfig {
                api_url,
                from,
                server_token,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            mail,
        })
    }
}
