use serde::{Deserialize, Serialize};

pub const MISSING_PARAMETERS: &str = "Missing required parameters";
pub const NO_RECORDS: &str = "No records found. Confirm query parameters.";
pub const INVALID_YEAR: &str = "Invalid year. The earliest year is 2016.";

/// No observations exist before this year.
pub const EARLIEST_YEAR: i32 = 2016;

/// Error payload for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Envelope for the news endpoints.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Normalize an incoming parameter: absent becomes empty, present values are
/// trimmed and lower-cased.
pub fn clean_param(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_lowercase()
}

/// Parse a year parameter, enforcing the data floor. Unparsable input gets
/// the same client message as a too-early year.
pub fn parse_year(raw: &str) -> Result<i32, String> {
    match raw.parse::<i32>() {
        Ok(year) if year >= EARLIEST_YEAR => Ok(year),
        _ => Err(INVALID_YEAR.to_string()),
    }
}

/// Query parameters shared by every (food_item, item_type, category) slice
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSliceQuery {
    pub food_item: Option<String>,
    pub item_type: Option<String>,
    pub category: Option<String>,
}

impl ItemSliceQuery {
    /// Checks all three parameters are present and non-empty.
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
}

/// Query parameters for endpoints keyed by food_item alone.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemQuery {
    pub food_item: Option<String>,
}

impl ItemQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.food_item().is_empty() {
            return Err(MISSING_PARAMETERS.to_string());
        }
        Ok(())
    }

    pub fn food_item(&self) -> String {
        clean_param(&self.food_item)
    }
}

/// One month-over-month comparison entry.
#[derive(Debug, Clone, Serialize)]
pub struct MonthOnMonthEntry {
    pub current_month: i32,
    pub current_month_average_price: f64,
    pub previous_month_avg_price: f64,
    pub percentage_change: f64,
}

/// Averaged unit price for one item type, in display units.
#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeUnitPrice {
    pub item_type: String,
    pub average_price: f64,
    pub unit: String,
}
