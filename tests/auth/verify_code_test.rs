use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_email, TestContext};

#[tokio::test]
async fn verify_with_correct_code_activates_the_account() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let response = ctx.verify(&email).await;
    response.assert_status(StatusCode::OK);

    let user = ctx.user(&email).await;
    assert!(user.is_active());
    assert!(user.verification_code.is_none());
    assert!(user.verification_code_expires_at.is_none());

    ctx.login(&email).await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn verify_with_wrong_code_returns_bad_request() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let stored = ctx.verification_code_for(&email).await;
    let wrong = if stored == "654321" { "123456" } else { "654321" };

    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": wrong }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!ctx.user(&email).await.is_active());
}

#[tokio::test]
async fn verify_after_the_window_returns_gone() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let mut user = ctx.user(&email).await;
    let code = user.verification_code.clone().unwrap();
    user.verification_code_expires_at = Some(Utc::now() - Duration::minutes(1));
    ctx.update_user(&user).await;

    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": code }))
        .await;

    response.assert_status(StatusCode::GONE);
    assert!(!ctx.user(&email).await.is_active());
}

#[tokio::test]
async fn expired_code_is_cleared_and_cannot_be_retried() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let mut user = ctx.user(&email).await;
    let code = user.verification_code.clone().unwrap();
    user.verification_code_expires_at = Some(Utc::now() - Duration::minutes(1));
    ctx.update_user(&user).await;

    ctx.server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": &code }))
        .await
        .assert_status(StatusCode::GONE);

    // The code was consumed by the expiry observation; a second attempt is a
    // plain mismatch, not another expiry.
    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": &code }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_twice_reports_already_verified() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    let code = ctx.verification_code_for(&email).await;
    ctx.verify(&email).await.assert_status(StatusCode::OK);

    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": code }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_unknown_email_returns_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": "ghost@example.com", "code": "123456" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn code_matching_is_case_insensitive() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    // Codes are numeric in practice; the match contract is case-insensitive
    // regardless, so pin a lettered code and present the other case.
    let mut user = ctx.user(&email).await;
    user.verification_code = Some("abc123".to_string());
    ctx.update_user(&user).await;

    let response = ctx
        .server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": "ABC123" }))
        .await;

    response.assert_status(StatusCode::OK);
    assert!(ctx.user(&email).await.is_active());
}

/// End-to-end walk of the registration/verification scenario: wrong code,
/// expired window, fresh window, then a working login.
#[tokio::test]
async fn full_verification_scenario() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.register(&email).await.assert_status(StatusCode::CREATED);

    // Pin the code so the scenario is deterministic.
    let mut user = ctx.user(&email).await;
    user.set_verification_code("123456".to_string(), Utc::now());
    ctx.update_user(&user).await;

    // Wrong digits.
    ctx.server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": "654321" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Right digits, eleven minutes late.
    let mut user = ctx.user(&email).await;
    user.verification_code_expires_at = Some(Utc::now() - Duration::minutes(1));
    ctx.update_user(&user).await;

    ctx.server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": "123456" }))
        .await
        .assert_status(StatusCode::GONE);

    // Fresh code inside the window.
    let mut user = ctx.user(&email).await;
    user.set_verification_code("123456".to_string(), Utc::now());
    ctx.update_user(&user).await;

    ctx.server
        .put("/auth/verify-code")
        .json(&json!({ "email": &email, "code": "123456" }))
        .await
        .assert_status(StatusCode::OK);

    let user = ctx.user(&email).await;
    assert!(user.is_active());
    assert!(user.verification_code.is_none());

    let (access, refresh) = ctx.login_tokens(&email).await;
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
}
