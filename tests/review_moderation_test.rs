mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{json_body, TestApp};

fn review_body(product_id: Uuid, rating: i16, comment: &str) -> serde_json::Value {
    json!({
        "product_id": product_id,
        "customer_id": Uuid::new_v4(),
        "rating": rating,
        "comment": comment,
    })
}

async fn submit_review(app: &TestApp, product_id: Uuid, rating: i16) -> String {
    let response = app
        .store_request(
            Method::POST,
            "/store/product-analytics/reviews",
            Some(review_body(product_id, rating, "Solid product")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = json_body(response).await;
    assert_eq!(review["is_approved"], false);
    review["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn rating_outside_bounds_is_rejected_before_any_write() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    for rating in [0, 6, -1] {
        let response = app
            .store_request(
                Method::POST,
                "/store/product-analytics/reviews",
                Some(review_body(product_id, rating, "nope")),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .admin_request(
            Method::GET,
            "/admin/product-analytics/reviews?status=all",
            None,
        )
        .await;
    let listing = json_body(response).await;
    assert_eq!(listing["pagination"]["total"].as_u64(), Some(0));
}

#[tokio::test]
async fn approval_publishes_a_review_and_is_idempotent() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let review_id = submit_review(&app, product_id, 5).await;

    let public_url = format!("/store/product-analytics/products/{}/reviews", product_id);

    // Unapproved reviews are invisible to the storefront.
    let response = app.store_request(Method::GET, &public_url, None).await;
    let listing = json_body(response).await;
    assert_eq!(listing["pagination"]["total"].as_u64(), Some(0));

    let approve_url = format!("/admin/product-analytics/reviews/{}/approve", review_id);
    let response = app.admin_request(Method::POST, &approve_url, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_approved"], true);

    let response = app.store_request(Method::GET, &public_url, None).await;
    let listing = json_body(response).await;
    assert_eq!(listing["pagination"]["total"].as_u64(), Some(1));
    assert_eq!(listing["data"][0]["id"].as_str(), Some(review_id.as_str()));

    // Approving again is a no-op success.
    let response = app.admin_request(Method::POST, &approve_url, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .admin_request(Method::POST, "/admin/product-analytics/reviews/00000000-0000-0000-0000-000000000000/approve", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn helpful_votes_only_count_on_approved_reviews() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let review_id = submit_review(&app, product_id, 4).await;
    let helpful_url = format!("/store/product-analytics/reviews/{}/helpful", review_id);

    // Voting on an unapproved review looks like voting on a missing one.
    let response = app.store_request(Method::POST, &helpful_url, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.admin_request(
        Method::POST,
        &format!("/admin/product-analytics/reviews/{}/approve", review_id),
        None,
    )
    .await;

    let response = app.store_request(Method::POST, &helpful_url, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["helpful_count"], 1);

    let response = app.store_request(Method::POST, &helpful_url, None).await;
    assert_eq!(json_body(response).await["helpful_count"], 2);
}

#[tokio::test]
async fn moderation_queue_filters_by_status() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    let first = submit_review(&app, product_id, 5).await;
    let _second = submit_review(&app, product_id, 3).await;

    app.admin_request(
        Method::POST,
        &format!("/admin/product-analytics/reviews/{}/approve", first),
        None,
    )
    .await;

    let count_for = |status: &str| {
        let url = format!("/admin/product-analytics/reviews?status={}", status);
        let app = &app;
        async move {
            let response = app.admin_request(Method::GET, &url, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            json_body(response).await["pagination"]["total"]
                .as_u64()
                .unwrap()
        }
    };

    assert_eq!(count_for("pending").await, 1);
    assert_eq!(count_for("approved").await, 1);
    assert_eq!(count_for("all").await, 2);
}

#[tokio::test]
async fn rejection_removes_the_review() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let review_id = submit_review(&app, product_id, 2).await;

    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/product-analytics/reviews/{}/reject", review_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .admin_request(
            Method::GET,
            "/admin/product-analytics/reviews?status=all",
            None,
        )
        .await;
    assert_eq!(
        json_body(response).await["pagination"]["total"].as_u64(),
        Some(0)
    );

    // Rejecting twice: the row is already gone.
    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/product-analytics/reviews/{}/reject", review_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
