use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{
    loyalty_account, loyalty_transaction, loyalty_account::LoyaltyTier,
    loyalty_transaction::LoyaltyTransactionKind, LoyaltyAccount, LoyaltyTransaction,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventHandler, EventSender};

/// Points earned per whole currency unit of order total.
pub const POINTS_PER_CURRENCY_UNIT: i64 = 1;

/// Loyalty accounts and their append-only ledger, accrued from order-placed
/// events.
#[derive(Clone)]
pub struct LoyaltyService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl LoyaltyService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Points for an order total: floor of the amount, never negative.
    pub fn points_for_total(total: Decimal) -> i64 {
        let points = total.trunc().to_i64().unwrap_or(0) * POINTS_PER_CURRENCY_UNIT;
        points.max(0)
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, customer_id: Uuid) -> Result<loyalty_account::Model, ServiceError> {
        LoyaltyAccount::find()
            .filter(loyalty_account::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Loyalty account for customer {} not found",
                    customer_id
                ))
            })
    }

    /// Ledger for a customer, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        customer_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<loyalty_transaction::Model>, u64), ServiceError> {
        let account = self.get_account(customer_id).await?;

        let paginator = LoyaltyTransaction::find()
            .filter(loyalty_transaction::Column::AccountId.eq(account.id))
            .order_by_desc(loyalty_transaction::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Accrue points for a placed order. Creates the account on first
    /// accrual; balance, lifetime total, tier and the ledger row are
    /// written in one transaction.
    #[instrument(skip(self))]
    pub async fn record_order_points(
        &self,
        customer_id: Uuid,
        order_id: Uuid,
        order_total: Decimal,
    ) -> Result<loyalty_account::Model, ServiceError> {
        let points = Self::points_for_total(order_total);
        if points == 0 {
            return self.get_or_create_account(customer_id).await;
        }

        let txn = self.db.begin().await?;

        let now = Utc::now();
        let account = LoyaltyAccount::find()
            .filter(loyalty_account::Column::CustomerId.eq(customer_id))
            .one(&txn)
            .await?;

        let account = match account {
            Some(existing) => {
                let balance = existing.points_balance + points;
                let lifetime = existing.lifetime_points + points;
                let mut active: loyalty_account::ActiveModel = existing.into();
                active.points_balance = Set(balance);
                active.lifetime_points = Set(lifetime);
                active.tier = Set(LoyaltyTier::for_lifetime_points(lifetime));
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                let account = loyalty_account::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    customer_id: Set(customer_id),
                    points_balance: Set(points),
                    lifetime_points: Set(points),
                    tier: Set(LoyaltyTier::for_lifetime_points(points)),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                account.insert(&txn).await?
            }
        };

        let entry = loyalty_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account.id),
            order_id: Set(Some(order_id)),
            points: Set(points),
            kind: Set(LoyaltyTransactionKind::Earned),
            description: Set(format!("Points earned for order {}", order_id)),
            created_at: Set(now),
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::LoyaltyPointsEarned {
                account_id: account.id,
                points,
            })
            .await;

        info!(
            customer_id = %customer_id,
            order_id = %order_id,
            points,
            tier = ?account.tier,
            "Loyalty points accrued"
        );
        Ok(account)
    }

    /// Manual admin adjustment. Lifetime points (and therefore tier) track
    /// earned points only; adjustments move the spendable balance.
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        customer_id: Uuid,
        points: i64,
        description: String,
    ) -> Result<loyalty_account::Model, ServiceError> {
        if points == 0 {
            return Err(ServiceError::ValidationError(
                "adjustment must be non-zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let account = LoyaltyAccount::find()
            .filter(loyalty_account::Column::CustomerId.eq(customer_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Loyalty account for customer {} not found",
                    customer_id
                ))
            })?;

        let new_balance = account.points_balance + points;
        if new_balance < 0 {
            return Err(ServiceError::ValidationError(format!(
                "adjustment would drive balance negative ({} + {})",
                account.points_balance, points
            )));
        }

        let account_id = account.id;
        let now = Utc::now();
        let mut active: loyalty_account::ActiveModel = account.into();
        active.points_balance = Set(new_balance);
        active.updated_at = Set(now);
        let account = active.update(&txn).await?;

        let entry = loyalty_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            order_id: Set(None),
            points: Set(points),
            kind: Set(LoyaltyTransactionKind::Adjusted),
            description: Set(description),
            created_at: Set(now),
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        info!(customer_id = %customer_id, points, "Loyalty balance adjusted");
        Ok(account)
    }

    async fn get_or_create_account(
        &self,
        customer_id: Uuid,
    ) -> Result<loyalty_account::Model, ServiceError> {
        if let Some(account) = LoyaltyAccount::find()
            .filter(loyalty_account::Column::CustomerId.eq(customer_id))
            .one(&*self.db)
            .await?
        {
            return Ok(account);
        }

        let now = Utc::now();
        let account = loyalty_account::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            points_balance: Set(0),
            lifetime_points: Set(0),
            tier: Set(LoyaltyTier::Bronze),
            created_at: Set(now),
            updated_at: Set(now),
        };
        account.insert(&*self.db).await.map_err(Into::into)
    }
}

/// Subscriber that accrues points when orders are placed.
pub struct LoyaltyEventHandler {
    loyalty: LoyaltyService,
}

impl LoyaltyEventHandler {
    pub fn new(loyalty: LoyaltyService) -> Self {
        Self { loyalty }
    }
}

#[async_trait]
impl EventHandler for LoyaltyEventHandler {
    fn name(&self) -> &'static str {
        "loyalty-accrual"
    }

    async fn handle_event(&self, event: &Event) -> Result<(), String> {
        if let Event::OrderPlaced {
            order_id,
            customer_id: Some(customer_id),
            total,
            ..
        } = event
        {
            self.loyalty
                .record_order_points(*customer_id, *order_id, *total)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
