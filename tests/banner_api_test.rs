mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{json_body, TestApp};

#[tokio::test]
async fn storefront_lists_only_visible_banners_in_priority_order() {
    let app = TestApp::new().await;

    let create = |title: &str, placement: &str, priority: i32, body_extra: serde_json::Value| {
        let mut body = json!({
            "title": title,
            "image_url": format!("https://cdn.example.com/{}.png", title),
            "placement": placement,
            "priority": priority,
        });
        body.as_object_mut()
            .unwrap()
            .extend(body_extra.as_object().unwrap().clone());
        body
    };

    for body in [
        create("second", "home.hero", 1, json!({})),
        create("first", "home.hero", 0, json!({})),
        create("hidden", "home.hero", 0, json!({"is_active": false})),
        create("sidebar", "home.sidebar", 0, json!({})),
        create(
            "future",
            "home.hero",
            0,
            json!({"starts_at": (Utc::now() + Duration::days(1)).to_rfc3339()}),
        ),
        create(
            "expired",
            "home.hero",
            0,
            json!({"ends_at": (Utc::now() - Duration::days(1)).to_rfc3339()}),
        ),
    ] {
        let response = app
            .admin_request(Method::POST, "/admin/banners", Some(body))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .store_request(Method::GET, "/store/banners?placement=home.hero", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let banners = json_body(response).await;
    let titles: Vec<&str> = banners
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    // No placement filter returns every visible placement.
    let response = app.store_request(Method::GET, "/store/banners", None).await;
    let banners = json_body(response).await;
    let titles: Vec<&str> = banners
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"sidebar"));
    assert_eq!(titles.len(), 3);
}

#[tokio::test]
async fn soft_deleted_banner_disappears_everywhere() {
    let app = TestApp::new().await;

    let response = app
        .admin_request(
            Method::POST,
            "/admin/banners",
            Some(json!({
                "title": "Spring sale",
                "image_url": "https://cdn.example.com/spring.png",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let banner = json_body(response).await;
    let id = banner["id"].as_str().unwrap().to_string();

    let response = app
        .admin_request(Method::DELETE, &format!("/admin/banners/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .admin_request(Method::GET, &format!("/admin/banners/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.store_request(Method::GET, "/store/banners", None).await;
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);

    // Updating a soft-deleted banner is a 404, not a resurrection.
    let response = app
        .admin_request(
            Method::PUT,
            &format!("/admin/banners/{}", id),
            Some(json!({"title": "Back from the dead"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .admin_request(Method::GET, "/admin/banners", None)
        .await;
    let listing = json_body(response).await;
    assert_eq!(listing["pagination"]["total"].as_u64(), Some(0));
}

#[tokio::test]
async fn banner_create_validates_payload() {
    let app = TestApp::new().await;

    // Empty title
    let response = app
        .admin_request(
            Method::POST,
            "/admin/banners",
            Some(json!({"title": "", "image_url": "https://cdn.example.com/x.png"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Inverted scheduling window
    let starts = Utc::now();
    let response = app
        .admin_request(
            Method::POST,
            "/admin/banners",
            Some(json!({
                "title": "Backwards",
                "image_url": "https://cdn.example.com/x.png",
                "starts_at": starts.to_rfc3339(),
                "ends_at": (starts - Duration::hours(1)).to_rfc3339(),
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn banner_update_changes_fields() {
    let app = TestApp::new().await;

    let response = app
        .admin_request(
            Method::POST,
            "/admin/banners",
            Some(json!({
                "title": "Original",
                "image_url": "https://cdn.example.com/a.png",
                "priority": 5,
            })),
        )
        .await;
    let banner = json_body(response).await;
    let id = banner["id"].as_str().unwrap().to_string();

    let response = app
        .admin_request(
            Method::PUT,
            &format!("/admin/banners/{}", id),
            Some(json!({"title": "Renamed", "priority": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["priority"], 1);
    assert_eq!(updated["image_url"], "https://cdn.example.com/a.png");
}
