use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::{trade_in_offer::DeviceCondition, trade_in_request::TradeInStatus};
use crate::handlers::common::{
    created_response, map_service_error, success_response, PaginatedResponse, PaginationParams,
};
use crate::services::trade_in::{
    CreateTradeInRequestInput, DeviceMapRowInput, PricingRowInput,
};
use crate::{errors::ApiError, AppState};

/// Storefront trade-in routes
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/resolve", get(resolve_device))
        .route("/quote", get(quote))
        .route("/requests", post(create_request))
        .route("/requests/:id", get(get_request))
}

/// Admin trade-in request moderation
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/:id/accept", post(accept_request))
        .route("/requests/:id/reject", post(reject_request))
        .route("/requests/:id/complete", post(complete_request))
}

/// Admin pricing-matrix routes, mounted at /admin/pricing
pub fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pricing).put(upsert_pricing))
        .route("/device-map", post(upsert_device_map))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveQuery {
    /// Full IMEI; only the leading TAC digits are used for the lookup
    pub imei: String,
}

/// Resolve an IMEI to a known device model
#[utoipa::path(
    get,
    path = "/store/trade-in/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Mapped device"),
        (status = 400, description = "Malformed IMEI", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown TAC", body = crate::errors::ErrorResponse)
    ),
    tag = "Trade-in"
)]
pub(crate) async fn resolve_device(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let device = state
        .services
        .trade_in
        .resolve_device(&query.imei)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(device))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct QuoteQuery {
    pub model_code: String,
    pub condition: DeviceCondition,
}

/// Pricing-matrix lookup for a model/condition pair
#[utoipa::path(
    get,
    path = "/store/trade-in/quote",
    params(QuoteQuery),
    responses(
        (status = 200, description = "Live offer for the cell"),
        (status = 404, description = "No offer for this model/condition", body = crate::errors::ErrorResponse)
    ),
    tag = "Trade-in"
)]
pub(crate) async fn quote(
    State(state): State<AppState>,
    Query(query): Query<QuoteQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let offer = state
        .services
        .trade_in
        .quote(&query.model_code, query.condition)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(offer))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTradeInRequest {
    pub customer_id: Uuid,
    pub imei: Option<String>,
    pub model_code: String,
    pub condition: DeviceCondition,
}

/// Create a trade-in request; the quote is re-resolved server-side
#[utoipa::path(
    post,
    path = "/store/trade-in/requests",
    request_body = CreateTradeInRequest,
    responses(
        (status = 201, description = "Pending trade-in request with its quote"),
        (status = 404, description = "No offer for this model/condition", body = crate::errors::ErrorResponse)
    ),
    tag = "Trade-in"
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateTradeInRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    if payload.model_code.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "model_code cannot be blank".to_string(),
        ));
    }

    let request = state
        .services
        .trade_in
        .create_request(CreateTradeInRequestInput {
            customer_id: payload.customer_id,
            imei: payload.imei,
            model_code: payload.model_code,
            condition: payload.condition,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(request))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let request = state
        .services
        .trade_in
        .get_request(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestListQuery {
    pub status: Option<TradeInStatus>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}
fn default_per_page() -> u64 {
    20
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let pagination = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (items, total) = state
        .services
        .trade_in
        .list_requests(query.status, pagination.page(), pagination.per_page())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let request = state
        .services
        .trade_in
        .transition_request(id, TradeInStatus::Accepted)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let request = state
        .services
        .trade_in
        .transition_request(id, TradeInStatus::Rejected)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

async fn complete_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let request = state
        .services
        .trade_in
        .transition_request(id, TradeInStatus::Completed)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PricingQuery {
    pub model_code: Option<String>,
}

/// Live pricing-matrix rows
#[utoipa::path(
    get,
    path = "/admin/pricing",
    params(PricingQuery),
    responses((status = 200, description = "Live matrix rows")),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Trade-in"
)]
pub(crate) async fn list_pricing(
    State(state): State<AppState>,
    Query(query): Query<PricingQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let offers = state
        .services
        .trade_in
        .list_pricing(query.model_code.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(offers))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpsertPricingRequest {
    pub rows: Vec<PricingRow>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PricingRow {
    pub model_code: String,
    pub condition: DeviceCondition,
    #[schema(value_type = String, example = "120.00")]
    pub offer_amount: rust_decimal::Decimal,
    pub currency: Option<String>,
    pub priority: Option<i32>,
}

/// Bulk-replace pricing-matrix cells
#[utoipa::path(
    put,
    path = "/admin/pricing",
    request_body = UpsertPricingRequest,
    responses(
        (status = 200, description = "Inserted matrix rows"),
        (status = 400, description = "Empty batch or negative amount", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Trade-in"
)]
pub(crate) async fn upsert_pricing(
    State(state): State<AppState>,
    Json(payload): Json<UpsertPricingRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let rows = payload
        .rows
        .into_iter()
        .map(|row| PricingRowInput {
            model_code: row.model_code,
            condition: row.condition,
            offer_amount: row.offer_amount,
            currency: row.currency,
            priority: row.priority,
        })
        .collect();

    let offers = state
        .services
        .trade_in
        .upsert_pricing(rows)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(offers))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpsertDeviceMapRequest {
    pub rows: Vec<DeviceMapRow>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeviceMapRow {
    /// Exactly eight digits
    pub tac: String,
    pub manufacturer: String,
    pub model_code: String,
    pub model_name: String,
    pub storage_gb: Option<i32>,
}

async fn upsert_device_map(
    State(state): State<AppState>,
    Json(payload): Json<UpsertDeviceMapRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let rows = payload
        .rows
        .into_iter()
        .map(|row| DeviceMapRowInput {
            tac: row.tac,
            manufacturer: row.manufacturer,
            model_code: row.model_code,
            model_name: row.model_name,
            storage_gb: row.storage_gb,
        })
        .collect();

    let devices = state
        .services
        .trade_in
        .upsert_device_map(rows)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(devices))
}
