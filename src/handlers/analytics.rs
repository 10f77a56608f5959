use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    accepted_response, created_response, map_service_error, no_content_response, success_response,
    validate_input, PaginatedResponse, PaginationParams,
};
use crate::services::reviews::{ReviewStatusFilter, SubmitReviewInput, MAX_RATING, MIN_RATING};
use crate::{errors::ApiError, AppState};

/// Storefront product-analytics routes: review submission and reads, view
/// pings and the per-product stats block.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(submit_review))
        .route("/reviews/:id/helpful", post(mark_review_helpful))
        .route("/products/:id/reviews", get(list_product_reviews))
        .route("/products/:id/view", post(record_product_view))
        .route("/products/:id/stats", get(product_stats))
}

/// Popular-products ranking, mounted under /store/search.
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/popular", get(popular_products))
}

/// Admin review moderation routes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews_for_moderation))
        .route("/reviews/:id/approve", post(approve_review))
        .route("/reviews/:id/reject", post(reject_review))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SubmitReviewRequest {
    pub product_id: Uuid,
    pub customer_id: Uuid,
    /// Star rating between 1 and 5
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub comment: String,
}

/// Submit a product review (created unapproved)
#[utoipa::path(
    post,
    path = "/store/product-analytics/reviews",
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review accepted for moderation"),
        (status = 400, description = "Rating out of range or malformed payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Analytics"
)]
pub(crate) async fn submit_review(
    State(state): State<AppState>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    if !(MIN_RATING..=MAX_RATING).contains(&payload.rating) {
        return Err(ApiError::ValidationError(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    let review = state
        .services
        .reviews
        .submit(SubmitReviewInput {
            product_id: payload.product_id,
            customer_id: payload.customer_id,
            rating: payload.rating,
            title: payload.title,
            comment: payload.comment,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(review))
}

/// List approved reviews for a product
#[utoipa::path(
    get,
    path = "/store/product-analytics/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Approved reviews, newest first")
    ),
    tag = "Product Analytics"
)]
pub(crate) async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .reviews
        .list_approved(product_id, pagination.page(), pagination.per_page())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HelpfulResponse {
    pub review_id: Uuid,
    pub helpful_count: i32,
}

/// Record a "helpful" vote on an approved review
#[utoipa::path(
    post,
    path = "/store/product-analytics/reviews/{id}/helpful",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "New helpful count", body = HelpfulResponse),
        (status = 404, description = "Unknown or unapproved review", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Analytics"
)]
pub(crate) async fn mark_review_helpful(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let helpful_count = state
        .services
        .reviews
        .mark_helpful(review_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(HelpfulResponse {
        review_id,
        helpful_count,
    }))
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecordViewRequest {
    pub session_id: Option<String>,
    pub customer_id: Option<Uuid>,
}

/// Record a product view event
#[utoipa::path(
    post,
    path = "/store/product-analytics/products/{id}/view",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = RecordViewRequest,
    responses((status = 202, description = "View recorded")),
    tag = "Product Analytics"
)]
pub(crate) async fn record_product_view(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    payload: Option<Json<RecordViewRequest>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    state
        .services
        .analytics
        .record_view(product_id, payload.session_id, payload.customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(accepted_response())
}

/// Stats block for a product page
#[utoipa::path(
    get,
    path = "/store/product-analytics/products/{id}/stats",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Windowed counters and rating aggregate",
         body = crate::services::analytics::ProductStats)
    ),
    tag = "Product Analytics"
)]
pub(crate) async fn product_stats(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let stats = state
        .services
        .analytics
        .product_stats(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PopularQuery {
    /// Maximum products to return (default 10, capped at 50)
    pub limit: Option<u64>,
}

/// Most-viewed products over the trailing week
#[utoipa::path(
    get,
    path = "/store/search/popular",
    params(PopularQuery),
    responses(
        (status = 200, description = "Products ranked by recent views",
         body = [crate::services::analytics::PopularProduct])
    ),
    tag = "Product Analytics"
)]
pub(crate) async fn popular_products(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let popular = state
        .services
        .analytics
        .popular_products(query.limit)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(popular))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ModerationQuery {
    /// pending (default), approved or all
    pub status: Option<ReviewStatusFilter>,
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

async fn list_reviews_for_moderation(
    State(state): State<AppState>,
    Query(query): Query<ModerationQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let pagination = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (items, total) = state
        .services
        .reviews
        .list_for_moderation(
            query.status.unwrap_or_default(),
            pagination.page(),
            pagination.per_page(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

/// Approve a review so it appears on the storefront
#[utoipa::path(
    post,
    path = "/admin/product-analytics/reviews/{id}/approve",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review approved (idempotent)"),
        (status = 404, description = "Unknown review", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Product Analytics"
)]
pub(crate) async fn approve_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let review = state
        .services
        .reviews
        .approve(review_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(review))
}

async fn reject_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .reviews
        .reject(review_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
