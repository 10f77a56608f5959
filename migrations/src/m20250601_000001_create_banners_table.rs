use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250601_000001_create_banners_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Banners::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Banners::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Banners::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Banners::Subtitle).string_len(512).null())
                    .col(
                        ColumnDef::new(Banners::ImageUrl)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Banners::LinkUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Banners::Placement)
                            .string_len(100)
                            .not_null()
                            .default("home.hero"),
                    )
                    .col(
                        ColumnDef::new(Banners::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Banners::StartsAt).timestamp().null())
                    .col(ColumnDef::new(Banners::EndsAt).timestamp().null())
                    .col(
                        ColumnDef::new(Banners::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Banners::DeletedAt).timestamp().null())
                    .col(
                        ColumnDef::new(Banners::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Banners::UpdatedAt)
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
                    .name("idx_banners_placement_priority")
                    .table(Banners::Table)
                    .col(Banners::Placement)
                    .col(Banners::Priority)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Banners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Banners {
    Table,
    Id,
    Title,
    Subtitle,
    ImageUrl,
    LinkUrl,
    Placement,
    Priority,
    StartsAt,
    EndsAt,
    IsActive,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
