pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_banners_table;
mod m20250601_000002_create_product_reviews_table;
mod m20250601_000003_create_product_analytics_tables;
mod m20250601_000004_create_loyalty_tables;
mod m20250601_000005_create_trade_in_tables;
mod m20250608_000006_create_cart_tables;
mod m20250608_000007_create_order_tables;
mod m20250615_000008_create_variant_tables;
mod m20250712_000009_add_helpful_count_to_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_banners_table::Migration),
            Box::new(m20250601_000002_create_product_reviews_table::Migration),
            Box::new(m20250601_000003_create_product_analytics_tables::Migration),
            Box::new(m20250601_000004_create_loyalty_tables::Migration),
            Box::new(m20250601_000005_create_trade_in_tables::Migration),
            Box::new(m20250608_000006_create_cart_tables::Migration),
            Box::new(m20250608_000007_create_order_tables::Migration),
            Box::new(m20250615_000008_create_variant_tables::Migration),
            Box::new(m20250712_000009_add_helpful_count_to_reviews::Migration),
        ]
    }
}
