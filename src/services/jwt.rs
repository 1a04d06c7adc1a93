use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const REFRESH_TOKEN_TYPE: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // user email
    pub id: String,         // user id
    pub iat: i64,
    pub exp: i64,
    pub jti: String,        // access: random; refresh: opaque session value
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn user_id(&self) -> &str {
        &self.id
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Outcome of token validation. Malformed, forged and expired tokens all
/// collapse into `Invalid` so callers treat them uniformly as
/// "unauthenticated" instead of propagating crypto errors.
#[derive(Debug)]
pub enum TokenVerdict {
    Valid(Claims),
    Invalid,
}

impl TokenVerdict {
    pub fn ok(self) -> Option<Claims> {
        match self {
            TokenVerdict::Valid(claims) => Some(claims),
            TokenVerdict::Invalid => None,
        }
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }

    pub fn with_ttls(secret: String, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_access(&self, user_id: &str, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = Claims {
            sub: email.to_string(),
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: None,
        };

        self.encode_claims(&claims)
    }

    /// Mints a refresh token bound to a session: `session_value` is the opaque
    /// value the session store indexes on, carried as `jti`.
    pub fn issue_refresh(
        &self,
        user_id: &str,
        email: &str,
        session_value: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = Claims {
            sub: email.to_string(),
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            jti: session_value.to_string(),
            token_type: Some(REFRESH_TOKEN_TYPE.to_string()),
        };

        self.encode_claims(&claims)
    }

    pub fn validate(&self, token: &str) -> TokenVerdict {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data,
            Err(_) => return TokenVerdict::Invalid,
        };

        let now = Utc::now().timestamp();
        // Expiry must be strictly in the future, issued-at must not be
        // (clock-skew guard).
        if data.claims.exp <= now || data.claims.iat > now {
            return TokenVerdict::Invalid;
        }

        TokenVerdict::Valid(data.claims)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }
}
