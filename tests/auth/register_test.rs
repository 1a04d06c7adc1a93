use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_email, test_password, SentKind, TestContext};

#[tokio::test]
async fn register_creates_pending_user_and_returns_summary() {
    let ctx = TestContext::new().await;
    let email = test_email();

    let response = ctx.register(&email).await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["fullName"], "Test Dealer");
    assert_eq!(body["user"]["status"], "PENDING");
    assert!(body["user"]["id"].as_str().is_some());

    // Registration must not leak credentials or codes.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("verificationCode").is_none());
}

#[tokio::test]
async fn register_stores_a_six_digit_verification_code() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let code = ctx.verification_code_for(&email).await;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let user = ctx.user(&email).await;
    assert!(user.verification_code_expires_at.is_some());
}

#[tokio::test]
async fn register_dispatches_the_code_by_email() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let sent = ctx.wait_for_outbox(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, email);
    assert_eq!(sent[0].kind, SentKind::Verification);
    assert_eq!(sent[0].code, ctx.verification_code_for(&email).await);
}

#[tokio::test]
async fn register_with_duplicate_email_returns_conflict() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let response = ctx.register(&email).await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn register_with_invalid_email_returns_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "fullName": "Test Dealer",
            "email": "not-an-email",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_short_password_returns_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "fullName": "Test Dealer",
            "email": test_email(),
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_missing_fields_returns_unprocessable() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({ "email": test_email() }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
