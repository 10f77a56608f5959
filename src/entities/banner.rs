use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storefront banner content row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub placement: String,
    pub priority: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A banner is visible when active, not soft-deleted and inside its
    /// scheduling window.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.deleted_at.is_some() {
            return false;
        }
        if let Some(starts_at) = self.starts_at {
            if now < starts_at {
                return false;
            }
        }
        if let Some(ends_at) = self.ends_at {
            if now >= ends_at {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn banner() -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            title: "banner".into(),
            subtitle: None,
            image_url: "https://cdn.example.com/b.png".into(),
            link_url: None,
            placement: "home.hero".into(),
            priority: 0,
            starts_at: None,
            ends_at: None,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn visibility_window_is_inclusive_start_exclusive_end() {
        let now = Utc::now();
        let mut b = banner();
        assert!(b.is_visible_at(now));

        b.starts_at = Some(now);
        b.ends_at = Some(now + Duration::hours(1));
        assert!(b.is_visible_at(now));
        assert!(!b.is_visible_at(now + Duration::hours(1)));
        assert!(!b.is_visible_at(now - Duration::seconds(1)));
    }

    #[test]
    fn inactive_or_deleted_banners_are_never_visible() {
        let now = Utc::now();
        let mut b = banner();
        b.is_active = false;
        assert!(!b.is_visible_at(now));

        let mut b = banner();
        b.deleted_at = Some(now);
        assert!(!b.is_visible_at(now));
    }
}
