use crate::common::{
    TestApp, create_customer, customer_form, get_authed, image_part, login_as_admin, post_customer,
};
use serde_json::Value;

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn test_create_with_image_stores_and_serves_it() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("me.png", "image/png", 2048));
    let response = post_customer(&app, &token, form).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    let path = body["profilePicture"].as_str().unwrap();
    assert!(path.starts_with("/uploads/profiles/profile-"));
    assert!(path.ends_with(".png"));
    assert_eq!(app.stored_image_count(), 1);

    let served = app.client.get(app.url(path)).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().len(), 2048);
}

#[tokio::test]
async fn test_oversized_image_is_rejected_before_anything_is_written() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("big.jpg", "image/jpeg", 6 * MIB));
    let response = post_customer(&app, &token, form).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["profilePicture"].is_string());

    assert_eq!(app.stored_image_count(), 0);
    let listing: Value = get_authed(&app, &token, "/api/customers").await.json().await.unwrap();
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_non_image_is_rejected() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("notes.txt", "text/plain", 64));
    let response = post_customer(&app, &token, form).await;
    assert_eq!(response.status(), 400);

    assert_eq!(app.stored_image_count(), 0);
    let listing: Value = get_authed(&app, &token, "/api/customers").await.json().await.unwrap();
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_second_image_field_is_rejected() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("a.png", "image/png", 16))
        .part("profilePicture", image_part("b.png", "image/png", 16));
    let response = post_customer(&app, &token, form).await;
    assert_eq!(response.status(), 400);
    assert_eq!(app.stored_image_count(), 0);
}

#[tokio::test]
async fn test_duplicate_email_removes_uploaded_image() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;
    create_customer(&app, &token, "Jane Doe", "jane@example.com").await;

    let form = customer_form("Janet Doe", "jane@example.com")
        .part("profilePicture", image_part("me.gif", "image/gif", 512));
    let response = post_customer(&app, &token, form).await;
    assert_eq!(response.status(), 400);

    assert_eq!(app.wait_for_image_count(0).await, 0);
}

#[tokio::test]
async fn test_update_with_new_image_removes_previous_one() {
    let app = TestApp::new().await;
    let token = login_as_admin(&app).await;

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("one.png", "image/png", 100));
    let created: Value = post_customer(&app, &token, form).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();
    let old_path = created["profilePicture"].as_str().unwrap().to_string();

    // Without a file the current image is kept
    let kept: Value = app
        .client
        .put(app.url(&format!("/api/customers/{}", id)))
        .bearer_auth(&token)
        .multipart(customer_form("Jane Doe", "jane@example.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(kept["profilePicture"], old_path.as_str());

    let form = customer_form("Jane Doe", "jane@example.com")
        .part("profilePicture", image_part("two.jpg", "image/jpeg", 200));
    let response = app
        .client
        .put(app.url(&format!("/api/customers/{}", id)))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let updated: Value = response.json().await.unwrap();
    let new_path = updated["profilePicture"].as_str().unwrap();
    assert_ne!(new_path, old_path);
    assert!(new_path.ends_with(".jpg"));

    assert_eq!(app.wait_for_image_count(1).await, 1);
    let old = app.client.get(app.url(&old_path)).send().await.unwrap();
    assert_eq!(old.status(), 404);
}
