use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Supermarket queries scope on vendor_type with descending date scans
        manager
            .create_index(
                Index::create()
                    .name("idx_cleaned_food_prices_vendor_date")
                    .table(CleanedFoodPrices::Table)
                    .col(CleanedFoodPrices::VendorType)
                    .col((CleanedFoodPrices::Date, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_cleaned_food_prices_vendor_date")
                    .table(CleanedFoodPrices::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum CleanedFoodPrices {
    Table,
    VendorType,
    Date,
}
