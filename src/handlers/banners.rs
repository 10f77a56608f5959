use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::services::banners::{CreateBannerInput, UpdateBannerInput};
use crate::{errors::ApiError, AppState};

/// Storefront banner routes
pub fn store_routes() -> Router<AppState> {
    Router::new().route("/", get(list_active_banners))
}

/// Admin banner routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_banners).post(create_banner))
        .route(
            "/:id",
            get(get_banner).put(update_banner).delete(delete_banner),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BannerPlacementQuery {
    /// Restrict to one placement slot (e.g. "home.hero")
    pub placement: Option<String>,
}

/// List currently visible banners
#[utoipa::path(
    get,
    path = "/store/banners",
    params(BannerPlacementQuery),
    responses(
        (status = 200, description = "Visible banners ordered by priority")
    ),
    tag = "Banners"
)]
pub(crate) async fn list_active_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerPlacementQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let banners = state
        .services
        .banners
        .list_active(query.placement.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(banners))
}

async fn list_banners(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (items, total) = state
        .services
        .banners
        .list_all(pagination.page(), pagination.per_page())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        items,
        pagination.page(),
        pagination.per_page(),
        total,
    )))
}

async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let banner = state
        .services
        .banners
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(banner))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateBannerRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub subtitle: Option<String>,
    #[validate(length(min = 1, max = 1024))]
    pub image_url: String,
    pub link_url: Option<String>,
    /// Placement slot, defaults to the home hero
    pub placement: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Create a banner
#[utoipa::path(
    post,
    path = "/admin/banners",
    request_body = CreateBannerRequest,
    responses(
        (status = 201, description = "Banner created"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Banners"
)]
pub(crate) async fn create_banner(
    State(state): State<AppState>,
    Json(payload): Json<CreateBannerRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    if let (Some(starts_at), Some(ends_at)) = (payload.starts_at, payload.ends_at) {
        if ends_at <= starts_at {
            return Err(ApiError::ValidationError(
                "ends_at must be after starts_at".to_string(),
            ));
        }
    }

    let input = CreateBannerInput {
        title: payload.title,
        subtitle: payload.subtitle,
        image_url: payload.image_url,
        link_url: payload.link_url,
        placement: payload
            .placement
            .unwrap_or_else(|| "home.hero".to_string()),
        priority: payload.priority,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
        is_active: payload.is_active.unwrap_or(true),
    };

    let banner = state
        .services
        .banners
        .create(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(banner))
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub placement: Option<String>,
    pub priority: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBannerRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let input = UpdateBannerInput {
        title: payload.title,
        subtitle: payload.subtitle,
        image_url: payload.image_url,
        link_url: payload.link_url,
        placement: payload.placement,
        priority: payload.priority,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
        is_active: payload.is_active,
    };

    let banner = state
        .services
        .banners
        .update(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(banner))
}

async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .banners
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
