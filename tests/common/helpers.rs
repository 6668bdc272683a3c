//! Shared test helper functions

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::common::{TestApp, test_app::{ADMIN_PASSWORD, ADMIN_USERNAME}};

/// Generates a unique test email using nanosecond timestamp
pub fn generate_test_email() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let random: u32 = rand::random();
    format!("test_{}_{}@example.com", timestamp, random)
}

/// Logs in with the given credentials and returns the raw response
pub async fn login(app: &TestApp, username: &str, password: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .unwrap()
}

/// Logs in as the seeded admin and returns the bearer token
pub async fn login_as_admin(app: &TestApp) -> String {
    let response = login(app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Multipart body with every customer field filled in
pub fn customer_form(full_name: &str, email: &str) -> Form {
    Form::new()
        .text("fullName", full_name.to_string())
        .text("email", email.to_string())
        .text("contactNumber", "+14155550100")
        .text("dateOfBirth", "1990-04-12")
        .text("state", "California")
        .text("city", "San Francisco")
}

/// File part of `size` bytes with the given MIME type
pub fn image_part(file_name: &str, mime: &str, size: usize) -> Part {
    Part::bytes(vec![0u8; size])
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

/// Posts a customer form and returns the raw response
pub async fn post_customer(app: &TestApp, token: &str, form: Form) -> reqwest::Response {
    app.client
        .post(app.url("/api/customers"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap()
}

/// Creates a customer and returns the response body, asserting 201
pub async fn create_customer(app: &TestApp, token: &str, full_name: &str, email: &str) -> Value {
    let response = post_customer(app, token, customer_form(full_name, email)).await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

/// GET with a bearer token, returning the raw response
pub async fn get_authed(app: &TestApp, token: &str, path: &str) -> reqwest::Response {
    app.client
        .get(app.url(path))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}
