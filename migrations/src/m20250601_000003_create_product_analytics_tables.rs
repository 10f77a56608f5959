use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250601_000003_create_product_analytics_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductViews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductViews::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProductViews::SessionId)
                            .string_len(128)
                            .null(),
                    )
                    .col(ColumnDef::new(ProductViews::CustomerId).uuid().null())
                    .col(
                        ColumnDef::new(ProductViews::ViewedAt)
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
                    .name("idx_product_views_product_viewed_at")
                    .table(ProductViews::Table)
                    .col(ProductViews::ProductId)
                    .col(ProductViews::ViewedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductSales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductSales::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductSales::ProductId).uuid().not_null())
                    .col(ColumnDef::new(ProductSales::OrderId).uuid().not_null())
                    .col(ColumnDef::new(ProductSales::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(ProductSales::UnitPrice)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductSales::SoldAt)
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
                    .name("idx_product_sales_product_sold_at")
                    .table(ProductSales::Table)
                    .col(ProductSales::ProductId)
                    .col(ProductSales::SoldAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductSales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductViews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ProductViews {
    Table,
    Id,
    ProductId,
    SessionId,
    CustomerId,
    ViewedAt,
}

#[derive(DeriveIden)]
pub enum ProductSales {
    Table,
    Id,
    ProductId,
    OrderId,
    Quantity,
    UnitPrice,
    SoldAt,
}
