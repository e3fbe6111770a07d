use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CleanedFoodPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CleanedFoodPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CleanedFoodPrices::FoodItem)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CleanedFoodPrices::ItemType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CleanedFoodPrices::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CleanedFoodPrices::Price)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CleanedFoodPrices::Date).date().not_null())
                    .col(ColumnDef::new(CleanedFoodPrices::Source).string().not_null())
                    .col(
                        ColumnDef::new(CleanedFoodPrices::VendorType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CleanedFoodPrices::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for source-scoped date range scans
        manager
            .create_index(
                Index::create()
                    .name("idx_cleaned_food_prices_source_date")
                    .table(CleanedFoodPrices::Table)
                    .col(CleanedFoodPrices::Source)
                    .col(CleanedFoodPrices::Date)
                    .to_owned(),
            )
            .await?;

        // Index for item lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_cleaned_food_prices_item")
                    .table(CleanedFoodPrices::Table)
                    .col(CleanedFoodPrices::FoodItem)
                    .col(CleanedFoodPrices::ItemType)
                    .col(CleanedFoodPrices::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CleanedFoodPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CleanedFoodPrices {
    Table,
    Id,
    FoodItem,
    ItemType,
    Category,
    Price,
    Date,
    Source,
    VendorType,
    CreatedAt,
}
