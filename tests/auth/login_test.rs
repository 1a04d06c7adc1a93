use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::common::{response_cookie_header, test_email, test_password, TestContext};

#[tokio::test]
async fn login_before_verification_returns_forbidden() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let response = ctx.login(&email).await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_with_valid_credentials_returns_tokens() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register_and_verify(&email).await;

    let response = ctx.login(&email).await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["tokenType"], "Bearer");
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());

    // Signed compact tokens: three dot-separated segments.
    assert_eq!(body["accessToken"].as_str().unwrap().split('.').count(), 3);
    assert_eq!(body["refreshToken"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn login_expiry_is_about_fifteen_minutes_out() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register_and_verify(&email).await;

    let response = ctx.login(&email).await;
    let body: serde_json::Value = response.json();

    let expires_at: DateTime<Utc> = body["expiresAt"].as_str().unwrap().parse().unwrap();
    let now = Utc::now();
    assert!(expires_at > now + Duration::minutes(14));
    assert!(expires_at < now + Duration::minutes(16));
}

#[tokio::test]
async fn login_sets_both_auth_cookies() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register_and_verify(&email).await;

    let response = ctx.login(&email).await;

    let access = response_cookie_header(&response, "access_token").expect("access cookie set");
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Secure"));
    assert!(access.contains("SameSite=Lax"));
    assert!(access.contains("Path=/"));
    assert!(access.contains("Max-Age=900"));

    let refresh = response_cookie_header(&response, "refresh_token").expect("refresh cookie set");
    assert!(refresh.contains("HttpOnly"));
    assert!(refresh.contains("SameSite=Lax"));
    assert!(refresh.contains("Path=/"));
    assert!(refresh.contains("Max-Age=604800"));
}

#[tokio::test]
async fn login_with_invalid_password_returns_unauthorized() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register_and_verify(&email).await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": "WrongPassword123!" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn login_with_nonexistent_email_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": "nonexistent@example.com", "password": test_password() }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_missing_password_returns_unprocessable() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": test_email() }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_returns_different_tokens_each_time() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register_and_verify(&email).await;

    let (access1, refresh1) = ctx.login_tokens(&email).await;
    let (access2, refresh2) = ctx.login_tokens(&email).await;

    assert_ne!(access1, access2);
    assert_ne!(refresh1, refresh2);
}
