use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{banner, Banner};
use crate::errors::ServiceError;

/// Banner content service backing storefront placements and admin CRUD
#[derive(Clone)]
pub struct BannerService {
    db: Arc<DatabaseConnection>,
}

impl BannerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Visible banners for the storefront: active, not deleted and inside
    /// their scheduling window, ordered by priority then recency.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        placement: Option<&str>,
    ) -> Result<Vec<banner::Model>, ServiceError> {
        let now = Utc::now();

        let mut condition = Condition::all()
            .add(banner::Column::IsActive.eq(true))
            .add(banner::Column::DeletedAt.is_null())
            .add(
                Condition::any()
                    .add(banner::Column::StartsAt.is_null())
                    .add(banner::Column::StartsAt.lte(now)),
            )
            .add(
                Condition::any()
                    .add(banner::Column::EndsAt.is_null())
                    .add(banner::Column::EndsAt.gt(now)),
            );

        if let Some(placement) = placement {
            condition = condition.add(banner::Column::Placement.eq(placement));
        }

        Banner::find()
            .filter(condition)
            .order_by_asc(banner::Column::Priority)
            .order_by_desc(banner::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Admin listing: everything not soft-deleted, paginated.
    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<banner::Model>, u64), ServiceError> {
        let paginator = Banner::find()
            .filter(banner::Column::DeletedAt.is_null())
            .order_by_asc(banner::Column::Priority)
            .order_by_desc(banner::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, banner_id: Uuid) -> Result<banner::Model, ServiceError> {
        Banner::find_by_id(banner_id)
            .filter(banner::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Banner {} not found", banner_id)))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateBannerInput) -> Result<banner::Model, ServiceError> {
        let now = Utc::now();
        let banner = banner::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            subtitle: Set(input.subtitle),
            image_url: Set(input.image_url),
            link_url: Set(input.link_url),
            placement: Set(input.placement),
            priority: Set(input.priority),
            starts_at: Set(input.starts_at),
            ends_at: Set(input.ends_at),
            is_active: Set(input.is_active),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let banner = banner.insert(&*self.db).await?;
        info!("Created banner: {}", banner.id);
        Ok(banner)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        banner_id: Uuid,
        input: UpdateBannerInput,
    ) -> Result<banner::Model, ServiceError> {
        let banner = self.get(banner_id).await?;
        let mut active: banner::ActiveModel = banner.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(subtitle) = input.subtitle {
            active.subtitle = Set(Some(subtitle));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(link_url) = input.link_url {
            active.link_url = Set(Some(link_url));
        }
        if let Some(placement) = input.placement {
            active.placement = Set(placement);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(Some(starts_at));
        }
        if let Some(ends_at) = input.ends_at {
            active.ends_at = Set(Some(ends_at));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let banner = active.update(&*self.db).await?;
        info!("Updated banner: {}", banner_id);
        Ok(banner)
    }

    /// Soft delete; the banner disappears from every listing but the row
    /// stays for audit.
    #[instrument(skip(self))]
    pub async fn delete(&self, banner_id: Uuid) -> Result<(), ServiceError> {
        let banner = self.get(banner_id).await?;
        let mut active: banner::ActiveModel = banner.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        info!("Soft-deleted banner: {}", banner_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateBannerInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub placement: String,
    pub priority: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateBannerInput {
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
