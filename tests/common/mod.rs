// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use sha2::Digest;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::entities::product_variant;
use storefront_api::{
    auth::{AuthConfig, AuthService, ADMIN_ROLE, CUSTOMER_ROLE},
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventHandler, EventSender},
    handlers::AppServices,
    middleware_helpers::request_id::request_id_middleware,
    services::{
        analytics::{ProductAnalyticsService, SalesAnalyticsHandler},
        loyalty::{LoyaltyEventHandler, LoyaltyService},
        payments::{PaymentAuthorizer, TokenPaymentAuthorizer},
    },
    AppState,
};

/// Plain-text operator API key whose SHA-256 digest is wired into the test
/// configuration.
pub const TEST_API_KEY: &str = "test-operator-key";

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Test harness: full application router over an in-memory SQLite database
/// with migrations applied and the event subscribers running.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    customer_token: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "test".to_string(),
        );
        cfg.admin_api_key_hash = Some(hex::encode(sha2::Sha256::digest(TEST_API_KEY.as_bytes())));

        // A single pooled connection keeps every query on the same
        // in-memory database.
        let db_config = DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);

        let handlers: Vec<Arc<dyn EventHandler>> = vec![
            Arc::new(LoyaltyEventHandler::new(LoyaltyService::new(
                db_arc.clone(),
                Arc::new(event_sender.clone()),
            ))),
            Arc::new(SalesAnalyticsHandler::new(ProductAnalyticsService::new(
                db_arc.clone(),
                Arc::new(event_sender.clone()),
            ))),
        ];
        let event_task = tokio::spawn(events::process_events(event_rx, handlers));

        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration_secs),
            cfg.admin_api_key_hash.clone(),
        )));
        let admin_token = auth_service
            .issue_token("test-admin", ADMIN_ROLE)
            .expect("issue admin token");
        let customer_token = auth_service
            .issue_token("test-customer", CUSTOMER_ROLE)
            .expect("issue customer token");

        let payment: Arc<dyn PaymentAuthorizer> = Arc::new(TokenPaymentAuthorizer);
        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), payment);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .merge(storefront_api::api_routes())
            .layer(axum::middleware::from_fn_with_state(
                auth_service.clone(),
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self {
            router,
            state,
            admin_token,
            customer_token,
            _event_task: event_task,
        }
    }

    /// Bearer token carrying the admin role.
    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    /// Bearer token carrying the customer role (insufficient for /admin).
    #[allow(dead_code)]
    pub fn customer_token(&self) -> &str {
        &self.customer_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Unauthenticated storefront request.
    pub async fn store_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, None).await
    }

    /// Admin request using the admin bearer token.
    pub async fn admin_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(&self.admin_token))
            .await
    }

    /// Admin request authenticated via the X-API-Key header.
    #[allow(dead_code)]
    pub async fn api_key_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        api_key: &str,
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", api_key);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Insert a product variant directly; the catalog admin surface needs
    /// one to attach images to.
    #[allow(dead_code)]
    pub async fn seed_variant(&self, sku: &str, price: Decimal) -> product_variant::Model {
        let now = Utc::now();
        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(Uuid::new_v4()),
            sku: Set(sku.to_string()),
            name: Set(format!("Variant {}", sku)),
            price: Set(price),
            currency: Set("USD".to_string()),
            position: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        variant
            .insert(&*self.state.db)
            .await
            .expect("seed product variant")
    }
}

/// Parse a JSON decimal field (serialized as a string) for numeric
/// comparison; scale is not preserved by every database backend.
pub fn dec_field(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal fields serialize as strings")
        .parse()
        .expect("decimal field parses")
}

/// Deserialize a response body as JSON.
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is valid json")
}
