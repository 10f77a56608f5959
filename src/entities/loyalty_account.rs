use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One loyalty account per customer with running balances
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub customer_id: Uuid,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub tier: LoyaltyTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loyalty_transaction::Entity")]
    LoyaltyTransactions,
}

impl Related<super::loyalty_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Loyalty tier derived from lifetime points
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTier {
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
}

impl LoyaltyTier {
    /// Tier thresholds on lifetime points: silver at 1,000, gold at 5,000.
    pub fn for_lifetime_points(lifetime_points: i64) -> Self {
        match lifetime_points {
            p if p >= 5_000 => LoyaltyTier::Gold,
            p if p >= 1_000 => LoyaltyTier::Silver,
            _ => LoyaltyTier::Bronze,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(LoyaltyTier::for_lifetime_points(0), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::for_lifetime_points(999), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::for_lifetime_points(1_000), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::for_lifetime_points(4_999), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::for_lifetime_points(5_000), LoyaltyTier::Gold);
    }
}
