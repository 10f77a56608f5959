use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::trade_in_offer::DeviceCondition;

/// Customer trade-in request carrying the server-side quote it was created with
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trade_in_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub imei: Option<String>,
    pub model_code: String,
    pub condition: DeviceCondition,
    pub quoted_amount: Decimal,
    pub currency: String,
    pub status: TradeInStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum TradeInStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl TradeInStatus {
    /// Legal transitions: pending -> accepted|rejected, accepted -> completed.
    pub fn can_transition_to(self, next: TradeInStatus) -> bool {
        matches!(
            (self, next),
            (TradeInStatus::Pending, TradeInStatus::Accepted)
                | (TradeInStatus::Pending, TradeInStatus::Rejected)
                | (TradeInStatus::Accepted, TradeInStatus::Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_rules() {
        assert!(TradeInStatus::Pending.can_transition_to(TradeInStatus::Accepted));
        assert!(TradeInStatus::Pending.can_transition_to(TradeInStatus::Rejected));
        assert!(TradeInStatus::Accepted.can_transition_to(TradeInStatus::Completed));
        assert!(!TradeInStatus::Pending.can_transition_to(TradeInStatus::Completed));
        assert!(!TradeInStatus::Rejected.can_transition_to(TradeInStatus::Accepted));
        assert!(!TradeInStatus::Completed.can_transition_to(TradeInStatus::Pending));
    }
}
