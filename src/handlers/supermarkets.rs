use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Utc};

use crate::models::common::{
    DataResponse, ErrorResponse, ItemQuery, ItemSliceQuery, ItemTypeUnitPrice, MonthOnMonthEntry,
    NO_RECORDS,
};
use crate::models::supermarkets::{
    DayOverDayEntry, MonthlyAveragePriceEntry, SeriesPointEntry, SeriesQuery,
};
use crate::services::price_math::{decimal_to_money, percentage_change};
use crate::services::prices::{self, SourceFilter};
use crate::services::timeseries::{forward_fill, DailyPoint};
use crate::services::units::{self, UnitPriceObservation};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all-time/", get(all_time))
        .route("/year/", get(year))
        .route("/average-item-types-price/", get(average_item_types_price))
        .route("/monthly-average-price/", get(monthly_average_price))
        .route("/mom-percentage/", get(mom_percentage))
        .route("/dod-percentage/", get(dod_percentage))
}

fn filled_series(rows: Vec<prices::DailyAverageRow>) -> Vec<SeriesPointEntry> {
    let points = rows
        .into_iter()
        .map(|row| DailyPoint::new(row.date, decimal_to_money(row.average_price)))
        .collect();
    forward_fill(points)
        .into_iter()
        .map(|point| SeriesPointEntry {
            date: point.date,
            average_price: point.value,
        })
        .collect()
}

/// Dense daily price series over the full observed range.
pub async fn all_time(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<SeriesPointEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::daily_averages(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &query.item_type(),
        &query.category(),
        None,
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    if rows.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    let data = filled_series(rows);
    tracing::info!(
        "Serving {} forward-filled days for {} all-time",
        data.len(),
        food_item
    );

    Ok(Json(DataResponse { data }))
}

/// Dense daily price series for the current year, optionally narrowed to the
/// current calendar month and/or ISO week.
pub async fn year(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<DataResponse<Vec<SeriesPointEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let current_month = query
        .current_month()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))?;
    let current_week = query
        .current_week()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))?;
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let today = Utc::now().date_naive();
    let (mut start, mut end) = prices::year_bounds(today.year());
    if current_month {
        let (month_start, month_end) = prices::month_bounds(today);
        start = start.max(month_start);
        end = end.min(month_end);
    }
    if current_week {
        let (week_start, week_end) = prices::week_bounds(today);
        start = start.max(week_start);
        end = end.min(week_end);
    }

    let rows = prices::daily_averages(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &query.item_type(),
        &query.category(),
        Some((start, end)),
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    if rows.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    Ok(Json(DataResponse {
        data: filled_series(rows),
    }))
}

/// Unit-normalized average prices per item type over the most recent
/// observation date. Supermarket scrapes land daily, so the bucket is the
/// exact latest date rather than its month.
pub async fn average_item_types_price(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<DataResponse<Vec<ItemTypeUnitPrice>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let latest_date =
        prices::latest_date_for_item(&state.db, SourceFilter::Supermarket, &food_item)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Database error: {}", e),
                    }),
                )
            })?
            .ok_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: NO_RECORDS.to_string(),
                    }),
                )
            })?;

    let pairs = state.catalogs.supermarket_pairs(&food_item);
    let rows = prices::observations_for_pairs(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &pairs,
        latest_date,
        latest_date,
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    let observations: Vec<UnitPriceObservation> = rows
        .into_iter()
        .map(|row| UnitPriceObservation {
            item_type: row.item_type,
            category: row.category,
            price: row.price,
        })
        .collect();

    let averages = units::average_item_type_prices(&observations);
    if averages.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    tracing::info!(
        "Averaged {} item type unit prices for {} on {}",
        averages.len(),
        food_item,
        latest_date
    );

    let data = averages
        .into_iter()
        .map(|average| ItemTypeUnitPrice {
            item_type: average.item_type,
            average_price: average.average_price,
            unit: average.unit,
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// Monthly average prices over the last twelve observed months, oldest
/// first.
pub async fn monthly_average_price(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<MonthlyAveragePriceEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let mut rows = prices::last_monthly_averages(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &query.item_type(),
        &query.category(),
        12,
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    if rows.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    // Buckets arrive newest first; the payload is chronological.
    rows.reverse();
    let data = rows
        .into_iter()
        .map(|row| MonthlyAveragePriceEntry {
            month: row.month,
            monthly_avg_price: decimal_to_money(row.average_price),
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// Month-over-month percentage change between the last two monthly buckets.
pub async fn mom_percentage(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<MonthOnMonthEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::last_monthly_averages(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &query.item_type(),
        &query.category(),
        2,
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    if rows.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    let current = decimal_to_money(rows[0].average_price);
    let previous = rows
        .get(1)
        .map(|row| decimal_to_money(row.average_price))
        .unwrap_or(0.0);

    Ok(Json(DataResponse {
        data: vec![MonthOnMonthEntry {
            current_month: rows[0].month,
            current_month_average_price: current,
            previous_month_avg_price: previous,
            percentage_change: percentage_change(current, previous),
        }],
    }))
}

/// Day-over-day percentage change between the last two observed dates.
pub async fn dod_percentage(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<DayOverDayEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_supermarket_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::last_two_daily_averages(
        &state.db,
        SourceFilter::Supermarket,
        &food_item,
        &query.item_type(),
        &query.category(),
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Database error: {}", e),
            }),
        )
    })?;

    if rows.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        ));
    }

    let current = decimal_to_money(rows[0].average_price);
    let previous = rows
        .get(1)
        .map(|row| decimal_to_money(row.average_price))
        .unwrap_or(0.0);

    Ok(Json(DataResponse {
        data: vec![DayOverDayEntry {
            current_day: rows[0].date,
            current_day_average_price: current,
            previous_day_avg_price: previous,
            percentage_change: percentage_change(current, previous),
        }],
    }))
}
