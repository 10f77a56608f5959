mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

use common::{json_body, TestApp};
use storefront_api::entities::{product_sale, product_view};

async fn insert_view(app: &TestApp, product_id: Uuid, age: Duration) {
    let view = product_view::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        session_id: Set(None),
        customer_id: Set(None),
        viewed_at: Set(Utc::now() - age),
    };
    view.insert(&*app.state.db).await.expect("insert view row");
}

async fn insert_sale(app: &TestApp, product_id: Uuid, quantity: i32, age: Duration) {
    let sale = product_sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        order_id: Set(Uuid::new_v4()),
        quantity: Set(quantity),
        unit_price: Set(dec!(10.00)),
        sold_at: Set(Utc::now() - age),
    };
    sale.insert(&*app.state.db).await.expect("insert sale row");
}

#[tokio::test]
async fn view_ping_is_accepted_and_counted() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    let response = app
        .store_request(
            Method::POST,
            &format!("/store/product-analytics/products/{}/view", product_id),
            Some(json!({"session_id": "sess-1"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // A bodyless ping works too.
    let response = app
        .store_request(
            Method::POST,
            &format!("/store/product-analytics/products/{}/view", product_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .store_request(
            Method::GET,
            &format!("/store/product-analytics/products/{}/stats", product_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = json_body(response).await;
    assert_eq!(stats["current_viewers"].as_u64(), Some(2));
}

#[tokio::test]
async fn current_viewers_window_excludes_old_views() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    insert_view(&app, product_id, Duration::minutes(1)).await;
    insert_view(&app, product_id, Duration::minutes(4)).await;
    insert_view(&app, product_id, Duration::minutes(6)).await;
    insert_view(&app, product_id, Duration::hours(2)).await;
    // Another product's views never leak in.
    insert_view(&app, Uuid::new_v4(), Duration::minutes(1)).await;

    let response = app
        .store_request(
            Method::GET,
            &format!("/store/product-analytics/products/{}/stats", product_id),
            None,
        )
        .await;
    let stats = json_body(response).await;
    assert_eq!(stats["current_viewers"].as_u64(), Some(2));
}

#[tokio::test]
async fn sales_counter_sums_quantity_inside_24_hours() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    insert_sale(&app, product_id, 3, Duration::hours(2)).await;
    insert_sale(&app, product_id, 2, Duration::hours(23)).await;
    insert_sale(&app, product_id, 5, Duration::hours(30)).await;

    let response = app
        .store_request(
            Method::GET,
            &format!("/store/product-analytics/products/{}/stats", product_id),
            None,
        )
        .await;
    let stats = json_body(response).await;
    assert_eq!(stats["sales_last_24h"].as_i64(), Some(5));
}

#[tokio::test]
async fn rating_aggregates_only_approved_reviews() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();

    let mut review_ids = Vec::new();
    for rating in [5, 4, 1] {
        let response = app
            .store_request(
                Method::POST,
                "/store/product-analytics/reviews",
                Some(json!({
                    "product_id": product_id,
                    "customer_id": Uuid::new_v4(),
                    "rating": rating,
                    "comment": "review",
                })),
            )
            .await;
        review_ids.push(json_body(response).await["id"].as_str().unwrap().to_string());
    }

    // Approve the 5 and the 4; the 1 stays pending.
    for review_id in &review_ids[..2] {
        app.admin_request(
            Method::POST,
            &format!("/admin/product-analytics/reviews/{}/approve", review_id),
            None,
        )
        .await;
    }

    let stats_url = format!("/store/product-analytics/products/{}/stats", product_id);
    let stats = json_body(app.store_request(Method::GET, &stats_url, None).await).await;
    assert_eq!(stats["rating"]["count"].as_u64(), Some(2));
    assert!((stats["rating"]["average"].as_f64().unwrap() - 4.5).abs() < 1e-9);
    assert_eq!(stats["helpful_total"].as_i64(), Some(0));

    // Helpful votes roll up into the stats block.
    app.store_request(
        Method::POST,
        &format!("/store/product-analytics/reviews/{}/helpful", review_ids[0]),
        None,
    )
    .await;
    let stats = json_body(app.store_request(Method::GET, &stats_url, None).await).await;
    assert_eq!(stats["helpful_total"].as_i64(), Some(1));
}

#[tokio::test]
async fn stats_for_an_unknown_product_are_all_zero() {
    let app = TestApp::new().await;

    let response = app
        .store_request(
            Method::GET,
            &format!("/store/product-analytics/products/{}/stats", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = json_body(response).await;
    assert_eq!(stats["current_viewers"].as_u64(), Some(0));
    assert_eq!(stats["sales_last_24h"].as_i64(), Some(0));
    assert!(stats["rating"]["average"].is_null());
    assert_eq!(stats["rating"]["count"].as_u64(), Some(0));
}

#[tokio::test]
async fn popular_products_rank_by_recent_views() {
    let app = TestApp::new().await;
    let product_a = Uuid::new_v4();
    let product_b = Uuid::new_v4();
    let product_c = Uuid::new_v4();

    for _ in 0..3 {
        insert_view(&app, product_a, Duration::hours(1)).await;
    }
    insert_view(&app, product_b, Duration::hours(1)).await;
    // Views older than the 7-day window do not count.
    for _ in 0..10 {
        insert_view(&app, product_c, Duration::days(8)).await;
    }

    let response = app
        .store_request(Method::GET, "/store/search/popular", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let popular = json_body(response).await;
    let ranked: Vec<String> = popular
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["product_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ranked,
        vec![product_a.to_string(), product_b.to_string()]
    );
    assert_eq!(popular[0]["view_count"].as_i64(), Some(3));

    let response = app
        .store_request(Method::GET, "/store/search/popular?limit=1", None)
        .await;
    let popular = json_body(response).await;
    assert_eq!(popular.as_array().unwrap().len(), 1);
    assert_eq!(
        popular[0]["product_id"].as_str(),
        Some(product_a.to_string().as_str())
    );
}
