use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250601_000002_create_product_reviews_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductReviews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductReviews::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProductReviews::CustomerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductReviews::Rating)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductReviews::Title).string_len(255).null())
                    .col(ColumnDef::new(ProductReviews::Comment).text().not_null())
                    .col(
                        ColumnDef::new(ProductReviews::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProductReviews::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProductReviews::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_reviews_product_approved")
                    .table(ProductReviews::Table)
                    .col(ProductReviews::ProductId)
                    .col(ProductReviews::IsApproved)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductReviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProductReviews {
    Table,
    Id,
    ProductId,
    CustomerId,
    Rating,
    Title,
    Comment,
    IsApproved,
    CreatedAt,
    UpdatedAt,
}
