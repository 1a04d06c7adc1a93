use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::AppState;

use super::model::{User, UserRole};
use super::schema::ErrorResponse;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Paths that never require an identity, token or not.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/health",
    "/auth/register",
    "/auth/login",
    "/auth/refresh",
    "/auth/logout",
    "/auth/verify-code",
    "/auth/resend-code",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// The identity resolved for a request, with its role-derived authority.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub role: UserRole,
}

/// Resolves a caller identity once per request: bearer header first, then the
/// access-token cookie. Never rejects; endpoints that need an identity demand
/// the [`CurrentUser`] extractor and get a 401 when resolution came up empty.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = extract_token(&request) else {
        return next.run(request).await;
    };

    let Some(claims) = state.token_issuer.validate(&token).ok() else {
        return next.run(request).await;
    };

    // A refresh token is not an identity; it only buys new access tokens.
    if claims.is_refresh() {
        return next.run(request).await;
    }

    match state.users.find_by_email(claims.subject()).await {
        Ok(Some(user)) => {
            let role = user.role;
            request.extensions_mut().insert(CurrentUser { user, role });
        }
        Ok(None) => {
            // Token subject no longer exists; proceed unauthenticated.
        }
        Err(err) => {
            tracing::warn!(error = %err, "identity lookup failed, proceeding unauthenticated");
        }
    }

    next.run(request).await
}

fn extract_token(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    CookieJar::from_headers(request.headers())
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Not authenticated")),
        ))
    }
}
