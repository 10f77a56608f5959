mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{json_body, TestApp};

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = TestApp::new().await;

    // No credentials
    let response = app
        .request(Method::GET, "/admin/banners", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A customer token authenticates but is not authorized.
    let response = app
        .request(
            Method::GET,
            "/admin/banners",
            None,
            Some(app.customer_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Garbage bearer token
    let response = app
        .request(Method::GET, "/admin/banners", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Admin bearer token
    let response = app
        .request(
            Method::GET,
            "/admin/banners",
            None,
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn operator_api_key_grants_admin_access() {
    let app = TestApp::new().await;

    let response = app
        .api_key_request(
            Method::POST,
            "/admin/banners",
            Some(json!({
                "title": "Keyed in",
                "image_url": "https://cdn.example.com/k.png",
            })),
            common::TEST_API_KEY,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A wrong key is rejected outright.
    let response = app
        .api_key_request(Method::GET, "/admin/banners", None, "wrong-key")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn storefront_routes_are_public() {
    let app = TestApp::new().await;

    let response = app.store_request(Method::GET, "/store/banners", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .store_request(Method::GET, "/store/search/popular", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_and_status_report_ok() {
    let app = TestApp::new().await;

    let response = app.store_request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    let response = app.store_request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn error_payloads_carry_a_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/admin/banners", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["request_id"].is_string());
    assert!(body["timestamp"].is_string());
}
