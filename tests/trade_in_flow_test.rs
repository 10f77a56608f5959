mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{dec_field, json_body, TestApp};

const TAC: &str = "35439876";
const IMEI: &str = "354398761234567";

async fn seed_device_map(app: &TestApp) {
    let response = app
        .admin_request(
            Method::POST,
            "/admin/pricing/device-map",
            Some(json!({
                "rows": [{
                    "tac": TAC,
                    "manufacturer": "Acme",
                    "model_code": "ACME-X1",
                    "model_name": "Acme X1 128GB",
                    "storage_gb": 128,
                }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn seed_pricing(app: &TestApp, condition: &str, amount: &str) {
    let response = app
        .admin_request(
            Method::PUT,
            "/admin/pricing",
            Some(json!({
                "rows": [{
                    "model_code": "ACME-X1",
                    "condition": condition,
                    "offer_amount": amount,
                }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn imei_resolution_validates_and_looks_up_the_tac() {
    let app = TestApp::new().await;
    seed_device_map(&app).await;

    let response = app
        .store_request(
            Method::GET,
            &format!("/store/trade-in/resolve?imei={}", IMEI),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let device = json_body(response).await;
    assert_eq!(device["model_code"], "ACME-X1");
    assert_eq!(device["manufacturer"], "Acme");
    assert_eq!(device["storage_gb"].as_i64(), Some(128));

    // Too short
    let response = app
        .store_request(Method::GET, "/store/trade-in/resolve?imei=1234567", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-digits
    let response = app
        .store_request(
            Method::GET,
            "/store/trade-in/resolve?imei=35439x7612345",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown TAC
    let response = app
        .store_request(
            Method::GET,
            "/store/trade-in/resolve?imei=99999999123456",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pricing_matrix_upsert_supersedes_the_cell() {
    let app = TestApp::new().await;
    seed_pricing(&app, "good", "120.00").await;

    let quote_url = "/store/trade-in/quote?model_code=ACME-X1&condition=good";
    let quote = json_body(app.store_request(Method::GET, quote_url, None).await).await;
    assert_eq!(dec_field(&quote["offer_amount"]), dec!(120.00));
    assert_eq!(quote["currency"], "USD");

    // No offer for a different condition.
    let response = app
        .store_request(
            Method::GET,
            "/store/trade-in/quote?model_code=ACME-X1&condition=flawless",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Re-pricing the same cell retires the old row.
    seed_pricing(&app, "good", "150.00").await;
    let quote = json_body(app.store_request(Method::GET, quote_url, None).await).await;
    assert_eq!(dec_field(&quote["offer_amount"]), dec!(150.00));

    let listing = json_body(
        app.admin_request(Method::GET, "/admin/pricing?model_code=ACME-X1", None)
            .await,
    )
    .await;
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(dec_field(&listing[0]["offer_amount"]), dec!(150.00));
}

#[tokio::test]
async fn pricing_upsert_validates_the_batch() {
    let app = TestApp::new().await;

    let response = app
        .admin_request(Method::PUT, "/admin/pricing", Some(json!({"rows": []})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .admin_request(
            Method::PUT,
            "/admin/pricing",
            Some(json!({
                "rows": [{
                    "model_code": "ACME-X1",
                    "condition": "good",
                    "offer_amount": "-5.00",
                }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .admin_request(
            Method::POST,
            "/admin/pricing/device-map",
            Some(json!({
                "rows": [{
                    "tac": "1234",
                    "manufacturer": "Acme",
                    "model_code": "ACME-X1",
                    "model_name": "Acme X1",
                }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_lifecycle_enforces_legal_transitions() {
    let app = TestApp::new().await;
    seed_device_map(&app).await;
    seed_pricing(&app, "good", "120.00").await;

    let response = app
        .store_request(
            Method::POST,
            "/store/trade-in/requests",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "imei": IMEI,
                "model_code": "ACME-X1",
                "condition": "good",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request = json_body(response).await;
    let id = request["id"].as_str().unwrap().to_string();
    assert_eq!(request["status"], "pending");
    // The quote is resolved server-side, never taken from the client.
    assert_eq!(dec_field(&request["quoted_amount"]), dec!(120.00));

    let response = app
        .store_request(Method::GET, &format!("/store/trade-in/requests/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // pending -> completed is illegal
    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/trade-in/requests/{}/complete", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // pending -> accepted -> completed
    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/trade-in/requests/{}/accept", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "accepted");

    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/trade-in/requests/{}/reject", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .admin_request(
            Method::POST,
            &format!("/admin/trade-in/requests/{}/complete", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "completed");
}

#[tokio::test]
async fn request_creation_fails_without_a_matrix_entry() {
    let app = TestApp::new().await;
    seed_pricing(&app, "good", "80.00").await;

    let response = app
        .store_request(
            Method::POST,
            "/store/trade-in/requests",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "model_code": "ACME-X1",
                "condition": "broken",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .store_request(
            Method::POST,
            "/store/trade-in/requests",
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "model_code": "  ",
                "condition": "good",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_request_listing_filters_by_status() {
    let app = TestApp::new().await;
    seed_pricing(&app, "good", "100.00").await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = app
            .store_request(
                Method::POST,
                "/store/trade-in/requests",
                Some(json!({
                    "customer_id": Uuid::new_v4(),
                    "model_code": "ACME-X1",
                    "condition": "good",
                })),
            )
            .await;
        ids.push(json_body(response).await["id"].as_str().unwrap().to_string());
    }

    app.admin_request(
        Method::POST,
        &format!("/admin/trade-in/requests/{}/accept", ids[0]),
        None,
    )
    .await;

    let pending = json_body(
        app.admin_request(Method::GET, "/admin/trade-in/requests?status=pending", None)
            .await,
    )
    .await;
    assert_eq!(pending["pagination"]["total"].as_u64(), Some(2));

    let accepted = json_body(
        app.admin_request(Method::GET, "/admin/trade-in/requests?status=accepted", None)
            .await,
    )
    .await;
    assert_eq!(accepted["pagination"]["total"].as_u64(), Some(1));

    let all = json_body(
        app.admin_request(Method::GET, "/admin/trade-in/requests", None)
            .await,
    )
    .await;
    assert_eq!(all["pagination"]["total"].as_u64(), Some(3));
}
