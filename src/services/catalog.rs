use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{variant_image, ProductVariant, VariantImage};
use crate::errors::ServiceError;

/// Variant image management for the admin catalog surface
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn ensure_variant_exists(&self, variant_id: Uuid) -> Result<(), ServiceError> {
        ProductVariant::find_by_id(variant_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("Variant {} not found", variant_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_images(
        &self,
        variant_id: Uuid,
    ) -> Result<Vec<variant_image::Model>, ServiceError> {
        self.ensure_variant_exists(variant_id).await?;

        VariantImage::find()
            .filter(variant_image::Column::VariantId.eq(variant_id))
            .order_by_asc(variant_image::Column::Position)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Append an image. The first image for a variant becomes primary;
    /// explicitly setting is_primary demotes the previous one in the same
    /// transaction.
    #[instrument(skip(self, input))]
    pub async fn add_image(
        &self,
        variant_id: Uuid,
        input: AddVariantImageInput,
    ) -> Result<variant_image::Model, ServiceError> {
        self.ensure_variant_exists(variant_id).await?;

        let txn = self.db.begin().await?;

        let existing = VariantImage::find()
            .filter(variant_image::Column::VariantId.eq(variant_id))
            .order_by_asc(variant_image::Column::Position)
            .all(&txn)
            .await?;

        let next_position = existing.iter().map(|img| img.position).max().unwrap_or(-1) + 1;
        let make_primary = input.is_primary || existing.is_empty();

        if make_primary {
            for image in existing.iter().filter(|img| img.is_primary) {
                let mut active: variant_image::ActiveModel = image.clone().into();
                active.is_primary = Set(false);
                active.update(&txn).await?;
            }
        }

        let image = variant_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            variant_id: Set(variant_id),
            url: Set(input.url),
            alt_text: Set(input.alt_text),
            position: Set(next_position),
            is_primary: Set(make_primary),
            created_at: Set(Utc::now()),
        };
        let image = image.insert(&txn).await?;

        txn.commit().await?;

        info!("Added image {} to variant {}", image.id, variant_id);
        Ok(image)
    }

    /// Remove an image. Deleting the primary promotes the lowest-position
    /// survivor.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, variant_id: Uuid, image_id: Uuid) -> Result<(), ServiceError> {
        self.ensure_variant_exists(variant_id).await?;

        let txn = self.db.begin().await?;

        let image = VariantImage::find_by_id(image_id)
            .filter(variant_image::Column::VariantId.eq(variant_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Image {} not found on variant {}",
                    image_id, variant_id
                ))
            })?;

        let was_primary = image.is_primary;
        image.delete(&txn).await?;

        if was_primary {
            let survivor = VariantImage::find()
                .filter(variant_image::Column::VariantId.eq(variant_id))
                .order_by_asc(variant_image::Column::Position)
                .one(&txn)
                .await?;
            if let Some(survivor) = survivor {
                let mut active: variant_image::ActiveModel = survivor.into();
                active.is_primary = Set(true);
                active.update(&txn).await?;
            }
        }

        txn.commit().await?;

        info!("Deleted image {} from variant {}", image_id, variant_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddVariantImageInput {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}
