//! SeaORM Entity for cleaned food price observations

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cleaned_food_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lower-cased item name, e.g. "rice"
    pub food_item: String,
    /// Lower-cased variant, e.g. "local rice"
    pub item_type: String,
    /// Amount-unit label, e.g. "1000 g"
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub date: Date,
    /// Publisher: 'NBS' for statistics-bureau rows
    pub source: String,
    /// Outlet kind: 'Supermarket' for scraped store rows
    pub vendor_type: String,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
