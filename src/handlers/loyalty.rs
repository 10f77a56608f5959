use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    map_service_error, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{errors::ApiError, AppState};

/// Storefront loyalty routes (reads only; accrual happens via events)
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/:customer_id", get(get_account))
        .route(
            "/accounts/:customer_id/transactions",
            get(list_transactions),
        )
}

/// Admin loyalty routes
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/accounts/:customer_id/adjust", post(adjust_balance))
}

/// Loyalty account summary for a customer
#[utoipa::path(
    get,
    path = "/store/loyalty/accounts/{customer_id}",
    params(("customer_id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Account balances and tier"),
        (status = 404, description = "No account yet (nothing earned)", body = crate::errors::ErrorResponse)
    ),
    tag = "Loyalty"
)]
pub(crate) async fn get_account(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let account = state
        .services
        .loyalty
        .get_account(customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(account))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .loyalty
        .list_transactions(customer_id, pagination.page(), pagination.per_page())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AdjustBalanceRequest {
    /// Signed point delta; negative redeems points
    pub points: i64,
    #[validate(length(min = 1, max = 512))]
    pub description: String,
}

/// Manually adjust a customer's point balance
#[utoipa::path(
    post,
    path = "/admin/loyalty/accounts/{customer_id}/adjust",
    params(("customer_id" = Uuid, Path, description = "Customer id")),
    request_body = AdjustBalanceRequest,
    responses(
        (status = 200, description = "Updated account"),
        (status = 400, description = "Adjustment would drive balance negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown account", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Loyalty"
)]
pub(crate) async fn adjust_balance(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let account = state
        .services
        .loyalty
        .adjust(customer_id, payload.points, payload.description)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(account))
}
