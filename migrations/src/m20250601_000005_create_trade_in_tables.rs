use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250601_000005_create_trade_in_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TradeInDeviceMap::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TradeInDeviceMap::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TradeInDeviceMap::Tac)
                            .string_len(8)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TradeInDeviceMap::Manufacturer)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInDeviceMap::ModelCode)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInDeviceMap::ModelName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TradeInDeviceMap::StorageGb).integer().null())
                    .col(ColumnDef::new(TradeInDeviceMap::DeletedAt).timestamp().null())
                    .col(
                        ColumnDef::new(TradeInDeviceMap::CreatedAt)
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
                    .table(TradeInOffers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TradeInOffers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::ModelCode)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::Condition)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::OfferAmount)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TradeInOffers::DeletedAt).timestamp().null())
                    .col(
                        ColumnDef::new(TradeInOffers::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TradeInOffers::UpdatedAt)
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
                    .name("idx_trade_in_offers_model_condition")
                    .table(TradeInOffers::Table)
                    .col(TradeInOffers::ModelCode)
                    .col(TradeInOffers::Condition)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TradeInRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TradeInRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::CustomerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TradeInRequests::Imei).string_len(20).null())
                    .col(
                        ColumnDef::new(TradeInRequests::ModelCode)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::Condition)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::QuotedAmount)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::Currency)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TradeInRequests::UpdatedAt)
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
                    .name("idx_trade_in_requests_status")
                    .table(TradeInRequests::Table)
                    .col(TradeInRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TradeInRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TradeInOffers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TradeInDeviceMap::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TradeInDeviceMap {
    Table,
    Id,
    Tac,
    Manufacturer,
    ModelCode,
    ModelName,
    StorageGb,
    DeletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TradeInOffers {
    Table,
    Id,
    ModelCode,
    Condition,
    OfferAmount,
    Currency,
    Priority,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TradeInRequests {
    Table,
    Id,
    CustomerId,
    Imei,
    ModelCode,
    Condition,
    QuotedAmount,
    Currency,
    Status,
    CreatedAt,
    UpdatedAt,
}
