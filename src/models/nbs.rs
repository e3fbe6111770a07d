use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::common::{clean_param, parse_year, MISSING_PARAMETERS};

/// Query parameters for GET /nbs/year/
#[derive(Debug, Clone, Deserialize)]
pub struct YearQuery {
    pub food_item: Option<String>,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub year: Option<String>,
}

impl YearQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.food_item().is_empty()
            || self.item_type().is_empty()
            || self.category().is_empty()
            || clean_param(&self.year).is_empty()
        {
            return Err(MISSING_PARAMETERS.to_string());
        }
        Ok(())
    }

    pub fn food_item(&self) -> String {
        clean_param(&self.food_item)
    }

    pub fn item_type(&self) -> String {
        clean_param(&self.item_type)
    }

    pub fn category(&self) -> String {
        clean_param(&self.category)
    }

    pub fn year(&self) -> Result<i32, String> {
        parse_year(&clean_param(&self.year))
    }
}

/// Query parameters for GET /nbs/average-price/
#[derive(Debug, Clone, Deserialize)]
pub struct AveragePriceQuery {
    pub food_item: Option<String>,
    pub year: Option<String>,
}

impl AveragePriceQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.food_item().is_empty() || clean_param(&self.year).is_empty() {
            return Err(MISSING_PARAMETERS.to_string());
        }
        Ok(())
    }

    pub fn food_item(&self) -> String {
        clean_param(&self.food_item)
    }

    pub fn year(&self) -> Result<i32, String> {
        parse_year(&clean_param(&self.year))
    }
}

/// One raw observation in the year-pair listing.
#[derive(Debug, Clone, Serialize)]
pub struct PriceEntry {
    pub date: NaiveDate,
    pub price: f64,
}

/// Average price for one item type of a food item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeAveragePrice {
    pub item_type: String,
    pub average_price: f64,
}

/// Average price for one observed year.
#[derive(Debug, Clone, Serialize)]
pub struct YearlyAveragePriceEntry {
    pub year: i32,
    pub average_price: f64,
}

/// All-time average over the observed year span.
#[derive(Debug, Clone, Serialize)]
pub struct YearSpanAverage {
    pub years: String,
    pub average_price: f64,
}

/// Percentage change between the earliest and latest yearly averages.
#[derive(Debug, Clone, Serialize)]
pub struct YearSpanPercentage {
    pub years: String,
    pub percentage_change: f64,
}

/// Most recent observation for the slice.
#[derive(Debug, Clone, Serialize)]
pub struct LatestPrice {
    pub date: NaiveDate,
    pub price: f64,
}

/// One year-over-year comparison entry.
#[derive(Debug, Clone, Serialize)]
pub struct YearOnYearEntry {
    pub current_year: i32,
    pub current_year_average_price: f64,
    pub previous_year_avg_price: f64,
    pub percentage_change: f64,
}
