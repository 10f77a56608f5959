use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::carts::{AddCartItemInput, CreateCartInput};
use crate::services::checkout::{Address, FastCheckoutInput, ShippingMethod};
use crate::{errors::ApiError, AppState};

/// Storefront cart routes, including fast checkout
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/:id", get(get_cart))
        .route("/:id/items", post(add_cart_item))
        .route("/:id/fast-checkout", post(fast_checkout))
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCartRequest {
    pub customer_id: Option<Uuid>,
    pub currency: Option<String>,
}

async fn create_cart(
    State(state): State<AppState>,
    payload: Option<Json<CreateCartRequest>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let cart = state
        .services
        .carts
        .create_cart(CreateCartInput {
            customer_id: payload.customer_id,
            currency: payload.currency,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(cart))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .get_cart(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[schema(value_type = String, example = "19.99")]
    pub unit_price: Decimal,
}

async fn add_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .add_item(
            id,
            AddCartItemInput {
                product_id: payload.product_id,
                variant_id: payload.variant_id,
                sku: payload.sku,
                name: payload.name,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct FastCheckoutRequest {
    #[validate(email)]
    pub email: String,
    pub shipping_address: Address,
    pub shipping_method: ShippingMethod,
    pub payment_token: Option<String>,
}

/// One-call checkout: shipping details, payment and order placement
#[utoipa::path(
    post,
    path = "/store/carts/{id}/fast-checkout",
    params(("id" = Uuid, Path, description = "Cart id")),
    request_body = FastCheckoutRequest,
    responses(
        (status = 201, description = "Order placed"),
        (status = 400, description = "Cart empty, inactive or already converted", body = crate::errors::ErrorResponse),
        (status = 402, description = "Payment declined", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown cart", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub(crate) async fn fast_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FastCheckoutRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .checkout
        .fast_checkout(
            id,
            FastCheckoutInput {
                email: payload.email,
                shipping_address: payload.shipping_address,
                shipping_method: payload.shipping_method,
                payment_token: payload.payment_token,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}
