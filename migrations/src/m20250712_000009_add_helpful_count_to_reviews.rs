use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250712_000009_add_helpful_count_to_reviews"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ProductReviews::Table)
                    .add_column(
                        ColumnDef::new(ProductReviews::HelpfulCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ProductReviews::Table)
                    .drop_column(ProductReviews::HelpfulCount)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ProductReviews {
    Table,
    HelpfulCount,
}
