use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    order_item, product_review, product_sale, product_view, OrderItem, ProductReview, ProductSale,
    ProductView,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventHandler, EventSender};

/// Rolling window for the "customers looking at this right now" counter.
pub const VIEWER_WINDOW_MINS: i64 = 5;
/// Rolling window for the recent-sales counter.
pub const SALES_WINDOW_HOURS: i64 = 24;
/// Window used to rank popular products.
pub const POPULAR_WINDOW_DAYS: i64 = 7;

const DEFAULT_POPULAR_LIMIT: u64 = 10;
const MAX_POPULAR_LIMIT: u64 = 50;

/// Product analytics: append-only view/sale events with windowed reads and
/// review-rating aggregation.
#[derive(Clone)]
pub struct ProductAnalyticsService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductAnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Append a view event.
    #[instrument(skip(self))]
    pub async fn record_view(
        &self,
        product_id: Uuid,
        session_id: Option<String>,
        customer_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let view = product_view::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            session_id: Set(session_id),
            customer_id: Set(customer_id),
            viewed_at: Set(Utc::now()),
        };
        view.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductViewed { product_id })
            .await;
        Ok(())
    }

    /// Append one sale row per line of the given order. Invoked from the
    /// order-placed subscriber, not from a public endpoint.
    #[instrument(skip(self))]
    pub async fn record_sales_for_order(&self, order_id: Uuid) -> Result<usize, ServiceError> {
        let lines = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        let now = Utc::now();
        for line in &lines {
            let sale = product_sale::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(line.product_id),
                order_id: Set(order_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                sold_at: Set(now),
            };
            sale.insert(&*self.db).await?;
        }

        info!(%order_id, lines = lines.len(), "Recorded sale events");
        Ok(lines.len())
    }

    /// View rows inside the viewer window.
    #[instrument(skip(self))]
    pub async fn current_viewers(&self, product_id: Uuid) -> Result<u64, ServiceError> {
        let cutoff = Utc::now() - Duration::minutes(VIEWER_WINDOW_MINS);
        ProductView::find()
            .filter(product_view::Column::ProductId.eq(product_id))
            .filter(product_view::Column::ViewedAt.gt(cutoff))
            .count(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Units sold inside the sales window.
    #[instrument(skip(self))]
    pub async fn sales_last_24h(&self, product_id: Uuid) -> Result<i64, ServiceError> {
        let cutoff = Utc::now() - Duration::hours(SALES_WINDOW_HOURS);
        let sum: Option<Option<i64>> = ProductSale::find()
            .select_only()
            .column_as(Expr::col(product_sale::Column::Quantity).sum(), "total_quantity")
            .filter(product_sale::Column::ProductId.eq(product_id))
            .filter(product_sale::Column::SoldAt.gt(cutoff))
            .into_tuple()
            .one(&*self.db)
            .await?;

        Ok(sum.flatten().unwrap_or(0))
    }

    /// Full stats block for a product page.
    #[instrument(skip(self))]
    pub async fn product_stats(&self, product_id: Uuid) -> Result<ProductStats, ServiceError> {
        let current_viewers = self.current_viewers(product_id).await?;
        let sales_last_24h = self.sales_last_24h(product_id).await?;
        let rating = self.rating_summary(product_id).await?;
        let helpful_total = self.helpful_total(product_id).await?;

        Ok(ProductStats {
            product_id,
            current_viewers,
            sales_last_24h,
            rating,
            helpful_total,
        })
    }

    /// Average and count over approved reviews only.
    #[instrument(skip(self))]
    pub async fn rating_summary(&self, product_id: Uuid) -> Result<RatingSummary, ServiceError> {
        let count = ProductReview::find()
            .filter(product_review::Column::ProductId.eq(product_id))
            .filter(product_review::Column::IsApproved.eq(true))
            .count(&*self.db)
            .await?;

        if count == 0 {
            return Ok(RatingSummary {
                average: None,
                count: 0,
            });
        }

        let sum: Option<Option<i64>> = ProductReview::find()
            .select_only()
            .column_as(Expr::col(product_review::Column::Rating).sum(), "rating_sum")
            .filter(product_review::Column::ProductId.eq(product_id))
            .filter(product_review::Column::IsApproved.eq(true))
            .into_tuple()
            .one(&*self.db)
            .await?;

        let sum = sum.flatten().unwrap_or(0);
        Ok(RatingSummary {
            average: Some(sum as f64 / count as f64),
            count,
        })
    }

    async fn helpful_total(&self, product_id: Uuid) -> Result<i64, ServiceError> {
        let sum: Option<Option<i64>> = ProductReview::find()
            .select_only()
            .column_as(
                Expr::col(product_review::Column::HelpfulCount).sum(),
                "helpful_sum",
            )
            .filter(product_review::Column::ProductId.eq(product_id))
            .filter(product_review::Column::IsApproved.eq(true))
            .into_tuple()
            .one(&*self.db)
            .await?;

        Ok(sum.flatten().unwrap_or(0))
    }

    /// Products ranked by view count over the popular window.
    #[instrument(skip(self))]
    pub async fn popular_products(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<PopularProduct>, ServiceError> {
        let limit = limit
            .unwrap_or(DEFAULT_POPULAR_LIMIT)
            .clamp(1, MAX_POPULAR_LIMIT);
        let cutoff = Utc::now() - Duration::days(POPULAR_WINDOW_DAYS);

        let rows: Vec<(Uuid, i64)> = ProductView::find()
            .select_only()
            .column(product_view::Column::ProductId)
            .column_as(Expr::col(product_view::Column::Id).count(), "view_count")
            .filter(product_view::Column::ViewedAt.gt(cutoff))
            .group_by(product_view::Column::ProductId)
            .order_by_desc(Expr::col(product_view::Column::Id).count())
            .limit(limit)
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product_id, view_count)| PopularProduct {
                product_id,
                view_count,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingSummary {
    /// Mean of approved review ratings; absent when there are none
    pub average: Option<f64>,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductStats {
    pub product_id: Uuid,
    pub current_viewers: u64,
    pub sales_last_24h: i64,
    pub rating: RatingSummary,
    pub helpful_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PopularProduct {
    pub product_id: Uuid,
    pub view_count: i64,
}

/// Subscriber that turns order-placed events into sale rows.
pub struct SalesAnalyticsHandler {
    analytics: ProductAnalyticsService,
}

impl SalesAnalyticsHandler {
    pub fn new(analytics: ProductAnalyticsService) -> Self {
        Self { analytics }
    }
}

#[async_trait]
impl EventHandler for SalesAnalyticsHandler {
    fn name(&self) -> &'static str {
        "sales-analytics"
    }

    async fn handle_event(&self, event: &Event) -> Result<(), String> {
        if let Event::OrderPlaced { order_id, .. } = event {
            self.analytics
                .record_sales_for_order(*order_id)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
