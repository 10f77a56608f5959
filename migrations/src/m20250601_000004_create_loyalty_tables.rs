use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250601_000004_create_loyalty_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoyaltyAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::CustomerId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::PointsBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::LifetimePoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::Tier)
                            .string_len(20)
                            .not_null()
                            .default("bronze"),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LoyaltyAccounts::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::AccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoyaltyTransactions::OrderId).uuid().null())
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Kind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Description)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::CreatedAt)
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
                    .name("idx_loyalty_transactions_account")
                    .table(LoyaltyTransactions::Table)
                    .col(LoyaltyTransactions::AccountId)
                    .col(LoyaltyTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoyaltyTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoyaltyAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LoyaltyAccounts {
    Table,
    Id,
    CustomerId,
    PointsBalance,
    LifetimePoints,
    Tier,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum LoyaltyTransactions {
    Table,
    Id,
    AccountId,
    OrderId,
    Points,
    Kind,
    Description,
    CreatedAt,
}
