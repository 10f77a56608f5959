use axum::{
    extract::{Json, Path, State},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::catalog::AddVariantImageInput;
use crate::{errors::ApiError, AppState};

/// Admin variant-image routes, mounted at /admin/products
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/variants/:id/images",
            get(list_variant_images).post(add_variant_image),
        )
        .route(
            "/variants/:id/images/:image_id",
            delete(delete_variant_image),
        )
}

/// Images for a variant, in display order
#[utoipa::path(
    get,
    path = "/admin/products/variants/{id}/images",
    params(("id" = Uuid, Path, description = "Variant id")),
    responses(
        (status = 200, description = "Images ordered by position"),
        (status = 404, description = "Unknown variant", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = []), ("ApiKey" = [])),
    tag = "Catalog"
)]
pub(crate) async fn list_variant_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let images = state
        .services
        .catalog
        .list_images(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(images))
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddVariantImageRequest {
    #[validate(length(min = 1, max = 1024))]
    pub url: String,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

async fn add_variant_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddVariantImageRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let image = state
        .services
        .catalog
        .add_image(
            id,
            AddVariantImageInput {
                url: payload.url,
                alt_text: payload.alt_text,
                is_primary: payload.is_primary,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(image))
}

async fn delete_variant_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_image(id, image_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
