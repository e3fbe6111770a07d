pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_cleaned_food_prices;
mod m20250301_000002_create_articles;
mod m20250506_000001_add_vendor_type_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_cleaned_food_prices::Migration),
            Box::new(m20250301_000002_create_articles::Migration),
            Box::new(m20250506_000001_add_vendor_type_index::Migration),
        ]
    }
}
