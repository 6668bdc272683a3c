use crate::common::{TestApp, login, login_as_admin, test_app::TEST_JWT_SECRET};
use customer_manager::services::jwt::{Claims, issue_token};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let app = TestApp::new().await;

    let response = login(&app, "admin", "admin123").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["id"], app.admin_id.to_string());
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_rejects_wrong_credentials() {
    let app = TestApp::new().await;

    for (username, password) in [("admin", "wrongpass"), ("nobody", "admin123"), ("ADMIN", "admin123")] {
        let response = login(&app, username, password).await;
        assert_eq!(response.status(), 401, "{}/{}", username, password);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid credentials");
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_login_rejects_inactive_account() {
    let app = TestApp::new().await;
    app.store.set_account_active(app.admin_id, false).await.unwrap();

    let response = login(&app, "admin", "admin123").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({ "username": "admin" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["password"].is_string());
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let response = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "admin");
    assert_eq!(body["isActive"], true);
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_protected_routes_reject_missing_and_malformed_tokens() {
    let app = TestApp::new().await;

    let missing = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(missing.status(), 401);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Not authorized");

    for header in ["Bearer not-a-jwt", "Basic YWRtaW46YWRtaW4xMjM=", "Bearer "] {
        let response = app
            .client
            .get(app.url("/api/customers"))
            .header("Authorization", header)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401, "{}", header);
    }
}

#[tokio::test]
async fn test_foreign_secret_token_is_rejected() {
    let app = TestApp::new().await;
    let forged = issue_token(app.admin_id, "some-other-secret", 24).unwrap();

    let response = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&forged.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: app.admin_id.to_string(),
        exp: (now - chrono::Duration::minutes(5)).timestamp(),
        iat: (now - chrono::Duration::hours(25)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_token_for_unknown_or_inactive_account_is_rejected() {
    let app = TestApp::new().await;

    let unknown = issue_token(Uuid::now_v7(), TEST_JWT_SECRET, 24).unwrap();
    let response = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&unknown.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let token = login_as_admin(&app).await;
    app.store.set_account_active(app.admin_id, false).await.unwrap();
    let response = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let wrong = app
        .client
        .put(app.url("/api/auth/change-password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "currentPassword": "not-it",
            "newPassword": "newsecret"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 400);
    let body: Value = wrong.json().await.unwrap();
    assert!(body["fields"]["currentPassword"].is_string());

    let too_short = app
        .client
        .put(app.url("/api/auth/change-password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "currentPassword": "admin123",
            "newPassword": "abc"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_short.status(), 400);

    let ok = app
        .client
        .put(app.url("/api/auth/change-password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "currentPassword": "admin123",
            "newPassword": "newsecret"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["message"], "Password updated successfully");

    assert_eq!(login(&app, "admin", "admin123").await.status(), 401);
    assert_eq!(login(&app, "admin", "newsecret").await.status(), 200);
}
