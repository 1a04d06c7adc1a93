use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use validator::Validate;

use crate::AppState;

use super::interface::AuthError;
use super::middleware::{CurrentUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::schema::{
    ChangePasswordRequest, ErrorResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RegisterRequest, RegisterResponse, ResendCodeRequest, ResetPasswordRequest, TokenResponse,
    UserResponse, VerifyCodeRequest,
};
use super::service::AuthService;
use super::session::SessionStore;
use super::verification::IdentityVerifier;

fn auth_service(state: &AppState) -> AuthService {
    let sessions = SessionStore::new(
        state.refresh_tokens.clone(),
        state.users.clone(),
        state.token_issuer.clone(),
    );
    let verifier = IdentityVerifier::new(state.users.clone(), state.email.clone());

    AuthService::new(
        state.users.clone(),
        sessions,
        state.token_issuer.clone(),
        verifier,
    )
}

fn access_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

fn refresh_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    req.validate()?;

    let user = auth_service(&state)
        .register(&req.full_name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(user),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let result = auth_service(&state).login(&req.email, &req.password).await?;

    let jar = jar
        .add(access_cookie(
            result.tokens.access_token.clone(),
            state.token_issuer.access_ttl(),
        ))
        .add(refresh_cookie(
            result.tokens.refresh_token.clone(),
            state.token_issuer.refresh_ttl(),
        ));

    Ok((
        jar,
        Json(TokenResponse {
            access_token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            token_type: "Bearer",
            expires_at: result.tokens.expires_at,
        }),
    ))
}

/// Exchanges the refresh-token cookie for a fresh access token. The refresh
/// value comes back unchanged; it only rotates at login.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::RefreshInvalid)?;

    let (access_token, expires_at) = auth_service(&state).refresh(&presented).await?;

    let jar = jar.add(access_cookie(
        access_token.clone(),
        state.token_issuer.access_ttl(),
    ));

    Ok((
        jar,
        Json(TokenResponse {
            access_token,
            refresh_token: presented,
            token_type: "Bearer",
            expires_at,
        }),
    ))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AuthError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());

    auth_service(&state).logout(presented.as_deref()).await?;

    let jar = jar
        .add(removal_cookie(ACCESS_TOKEN_COOKIE))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, Json(MessageResponse::new("Logged out"))))
}

pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    auth_service(&state)
        .verifier()
        .confirm_verification(&req.email, &req.code)
        .await?;

    Ok(Json(MessageResponse::new("User verified")))
}

pub async fn resend_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendCodeRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    auth_service(&state)
        .verifier()
        .resend_verification_code(&req.email)
        .await?;

    Ok(Json(MessageResponse::new("Verification code sent")))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    auth_service(&state)
        .verifier()
        .issue_reset_code(&req.email)
        .await?;

    Ok(Json(MessageResponse::new("Reset code sent to email")))
}

/// Code failures answer 401 here: for this flow the code IS the credential,
/// unlike the 400/410 of the verification endpoint.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Response {
    if let Err(err) = req.validate() {
        return AuthError::from(err).into_response();
    }

    let result = auth_service(&state)
        .verifier()
        .confirm_reset(&req.email, &req.code, &req.new_password)
        .await;

    match result {
        Ok(()) => (StatusCode::OK, Json(MessageResponse::new("Password updated"))).into_response(),
        Err(err @ (AuthError::CodeInvalid | AuthError::CodeExpired)) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    req.validate()?;

    auth_service(&state)
        .change_password(&current.user.email, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed")))
}

pub async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(current.user))
}
