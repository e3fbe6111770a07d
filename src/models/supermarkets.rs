use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::common::{clean_param, MISSING_PARAMETERS};

/// Query parameters for GET /supermarkets/year/
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesQuery {
    pub food_item: Option<String>,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub current_month: Option<String>,
    pub current_week: Option<String>,
}

impl SeriesQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.food_item().is_empty() || self.item_type().is_empty() || self.category().is_empty()
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

    /// The current_month flag, defaulting to false when absent.
    pub fn current_month(&self) -> Result<bool, String> {
        parse_flag(&self.current_month, "current_month")
    }

    /// The current_week flag, defaulting to false when absent.
    pub fn current_week(&self) -> Result<bool, String> {
        parse_flag(&self.current_week, "current_week")
    }
}

fn parse_flag(value: &Option<String>, name: &str) -> Result<bool, String> {
    match clean_param(value).as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        _ => Err(format!("{} must be 'true' or 'false'", name)),
    }
}

/// One day of a (forward-filled) price series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPointEntry {
    pub date: NaiveDate,
    pub average_price: f64,
}

/// Average price for one calendar month bucket.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAveragePriceEntry {
    pub month: i32,
    pub monthly_avg_price: f64,
}

/// One day-over-day comparison entry.
#[derive(Debug, Clone, Serialize)]
pub struct DayOverDayEntry {
    pub current_day: NaiveDate,
    pub current_day_average_price: f64,
    pub previous_day_avg_price: f64,
    pub percentage_change: f64,
}
