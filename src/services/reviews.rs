use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{product_review, ProductReview};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Moderated product reviews: storefront submission, admin approval,
/// helpful votes.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatusFilter {
    Pending,
    Approved,
    All,
}

impl Default for ReviewStatusFilter {
    fn default() -> Self {
        ReviewStatusFilter::Pending
    }
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create an unapproved review. Rating bounds are checked here as well
    /// as at the API layer so no write path can bypass them.
    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: SubmitReviewInput) -> Result<product_review::Model, ServiceError> {
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(ServiceError::ValidationError(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let now = Utc::now();
        let review = product_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            customer_id: Set(input.customer_id),
            rating: Set(input.rating),
            title: Set(input.title),
            comment: Set(input.comment),
            is_approved: Set(false),
            helpful_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let review = review.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::ReviewSubmitted(review.id))
            .await;
        crate::metrics::REVIEWS_SUBMITTED.inc();

        info!("Review {} submitted for product {}", review.id, review.product_id);
        Ok(review)
    }

    /// Approved reviews for a product, newest first.
    #[instrument(skip(self))]
    pub async fn list_approved(
        &self,
        product_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product_review::Model>, u64), ServiceError> {
        let paginator = ProductReview::find()
            .filter(product_review::Column::ProductId.eq(product_id))
            .filter(product_review::Column::IsApproved.eq(true))
            .order_by_desc(product_review::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Moderation queue listing.
    #[instrument(skip(self))]
    pub async fn list_for_moderation(
        &self,
        status: ReviewStatusFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product_review::Model>, u64), ServiceError> {
        let mut query = ProductReview::find();
        query = match status {
            ReviewStatusFilter::Pending => {
                query.filter(product_review::Column::IsApproved.eq(false))
            }
            ReviewStatusFilter::Approved => {
                query.filter(product_review::Column::IsApproved.eq(true))
            }
            ReviewStatusFilter::All => query,
        };

        let paginator = query
            .order_by_desc(product_review::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, review_id: Uuid) -> Result<product_review::Model, ServiceError> {
        ProductReview::find_by_id(review_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", review_id)))
    }

    /// Approve a review. Idempotent: approving an approved review is a
    /// no-op success and does not re-emit the event.
    #[instrument(skip(self))]
    pub async fn approve(&self, review_id: Uuid) -> Result<product_review::Model, ServiceError> {
        let review = self.get(review_id).await?;
        if review.is_approved {
            return Ok(review);
        }

        let mut active: product_review::ActiveModel = review.into();
        active.is_approved = Set(true);
        active.updated_at = Set(Utc::now());
        let review = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ReviewApproved(review.id))
            .await;

        info!("Review {} approved", review_id);
        Ok(review)
    }

    /// Reject (delete) a review outright.
    #[instrument(skip(self))]
    pub async fn reject(&self, review_id: Uuid) -> Result<(), ServiceError> {
        let review = self.get(review_id).await?;
        review.delete(&*self.db).await?;

        info!("Review {} rejected and removed", review_id);
        Ok(())
    }

    /// Register a "helpful" vote as a single atomic increment and return
    /// the new count. Only approved reviews are voteable.
    #[instrument(skip(self))]
    pub async fn mark_helpful(&self, review_id: Uuid) -> Result<i32, ServiceError> {
        let result = ProductReview::update_many()
            .col_expr(
                product_review::Column::HelpfulCount,
                Expr::col(product_review::Column::HelpfulCount).add(1),
            )
            .col_expr(
                product_review::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(product_review::Column::Id.eq(review_id))
            .filter(product_review::Column::IsApproved.eq(true))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }

        let review = self.get(review_id).await?;
        Ok(review.helpful_count)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitReviewInput {
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i16,
    pub title: Option<String>,
    pub comment: String,
}
