use crate::common::TestApp;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_endpoint_needs_no_token() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("Authorization", "Bearer garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_cors_preflight_allows_client_origin() {
    let app = TestApp::new().await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, app.url("/api/customers"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}
