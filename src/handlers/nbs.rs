use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::models::common::{
    DataResponse, ErrorResponse, ItemQuery, ItemSliceQuery, ItemTypeUnitPrice, MonthOnMonthEntry,
    NO_RECORDS,
};
use crate::models::nbs::{
    AveragePriceQuery, ItemTypeAveragePrice, LatestPrice, PriceEntry, YearOnYearEntry, YearQuery,
    YearSpanAverage, YearSpanPercentage, YearlyAveragePriceEntry,
};
use crate::services::price_math::{decimal_to_money, percentage_change};
use crate::services::prices::{self, SourceFilter};
use crate::services::units::{self, UnitPriceObservation};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/year/", get(filter_by_year))
        .route("/average-price/", get(average_price))
        .route("/yearly-average-price/", get(yearly_average_price))
        .route("/average-price-over-years/", get(average_price_over_years))
        .route("/percentage/", get(percentage))
        .route("/latest-price/", get(latest_price))
        .route("/mom-percentage/", get(mom_percentage))
        .route("/yoy-percentage/", get(yoy_percentage))
        .route("/average-item-types-price/", get(average_item_types_price))
}

/// Raw price observations for the requested year and the year before it.
pub async fn filter_by_year(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<DataResponse<Vec<PriceEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let year = query
        .year()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))?;
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::rows_for_year_pair(
        &state.db,
        SourceFilter::Nbs,
        &food_item,
        &query.item_type(),
        &query.category(),
        year,
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

    tracing::info!(
        "Fetched {} price rows for {} across {}/{}",
        rows.len(),
        food_item,
        year - 1,
        year
    );

    let data = rows
        .into_iter()
        .map(|row| PriceEntry {
            date: row.date,
            price: decimal_to_money(row.price),
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// Average price per item type of a food item within one year.
pub async fn average_price(
    State(state): State<AppState>,
    Query(query): Query<AveragePriceQuery>,
) -> Result<Json<DataResponse<Vec<ItemTypeAveragePrice>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let year = query
        .year()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))?;
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows =
        prices::item_type_averages_for_year(&state.db, SourceFilter::Nbs, &food_item, year)
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

    let data = rows
        .into_iter()
        .map(|row| ItemTypeAveragePrice {
            item_type: row.item_type,
            average_price: decimal_to_money(row.average_price),
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// Average price per observed year, oldest first.
pub async fn yearly_average_price(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<YearlyAveragePriceEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::yearly_averages(
        &state.db,
        SourceFilter::Nbs,
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

    let data = rows
        .into_iter()
        .map(|row| YearlyAveragePriceEntry {
            year: row.year,
            average_price: decimal_to_money(row.average_price),
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// All-time average price over the observed year span.
pub async fn average_price_over_years(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<YearSpanAverage>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let span = prices::year_span_average(
        &state.db,
        SourceFilter::Nbs,
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

    // Aggregating an empty slice yields one row of NULLs.
    let (min_year, max_year, average) = match span {
        Some(row) => match (row.min_year, row.max_year, row.average_price) {
            (Some(min_year), Some(max_year), Some(average)) => (min_year, max_year, average),
            _ => {
                return Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: NO_RECORDS.to_string(),
                    }),
                ));
            }
        },
        None => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: NO_RECORDS.to_string(),
                }),
            ));
        }
    };

    Ok(Json(DataResponse {
        data: YearSpanAverage {
            years: format!("{} to {}", min_year, max_year),
            average_price: decimal_to_money(average),
        },
    }))
}

/// Percentage change between the earliest and latest yearly averages.
pub async fn percentage(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<YearSpanPercentage>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::yearly_averages(
        &state.db,
        SourceFilter::Nbs,
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

    let earliest = &rows[0];
    let latest = &rows[rows.len() - 1];
    let change = percentage_change(
        decimal_to_money(latest.average_price),
        decimal_to_money(earliest.average_price),
    );

    tracing::info!(
        "Computed {} to {} percentage change for {}: {}",
        earliest.year,
        latest.year,
        food_item,
        change
    );

    Ok(Json(DataResponse {
        data: YearSpanPercentage {
            years: format!("{} to {}", earliest.year, latest.year),
            percentage_change: change,
        },
    }))
}

/// The most recent observation for the slice.
pub async fn latest_price(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<LatestPrice>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let row = prices::latest_observation(
        &state.db,
        SourceFilter::Nbs,
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
    })?
    .ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: NO_RECORDS.to_string(),
            }),
        )
    })?;

    Ok(Json(DataResponse {
        data: LatestPrice {
            date: row.date,
            price: decimal_to_money(row.price),
        },
    }))
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
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::last_monthly_averages(
        &state.db,
        SourceFilter::Nbs,
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

/// Year-over-year percentage change between the last two yearly buckets.
pub async fn yoy_percentage(
    State(state): State<AppState>,
    Query(query): Query<ItemSliceQuery>,
) -> Result<Json<DataResponse<Vec<YearOnYearEntry>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rows = prices::last_two_yearly_averages(
        &state.db,
        SourceFilter::Nbs,
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
        data: vec![YearOnYearEntry {
            current_year: rows[0].year,
            current_year_average_price: current,
            previous_year_avg_price: previous,
            percentage_change: percentage_change(current, previous),
        }],
    }))
}

/// Unit-normalized average prices per item type over the latest monthly
/// bucket. NBS publishes monthly, so the bucket is the calendar month of the
/// most recent observation.
pub async fn average_item_types_price(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<DataResponse<Vec<ItemTypeUnitPrice>>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }
    let food_item = query.food_item();
    if let Err(e) = state.catalogs.validate_nbs_item(&food_item) {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let latest_date = prices::latest_date_for_item(&state.db, SourceFilter::Nbs, &food_item)
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

    let (start, end) = prices::month_bounds(latest_date);
    let item_types = state.catalogs.nbs_item_types(&food_item);
    let rows = prices::observations_for_item_types(
        &state.db,
        SourceFilter::Nbs,
        &food_item,
        &item_types,
        start,
        end,
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
        "Averaged {} item type unit prices for {} in the month of {}",
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, Value};
    use tower::ServiceExt;

    use crate::entities::cleaned_food_prices;
    use crate::services::catalog::DashboardCatalogs;
    use crate::services::summarizer::Summarizer;

    struct NoopSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for NoopSummarizer {
        async fn summarize(&self, _news: &str) -> String {
            String::new()
        }
    }

    fn test_catalogs() -> DashboardCatalogs {
        let mut nbs = BTreeMap::new();
        nbs.insert("oil".to_string(), vec!["vegetable".to_string()]);
        nbs.insert(
            "rice".to_string(),
            vec!["local rice".to_string(), "imported rice".to_string()],
        );
        DashboardCatalogs::new(nbs, BTreeMap::new())
    }

    fn setup_test_app(db: DatabaseConnection) -> Router {
        let state = AppState {
            db,
            catalogs: Arc::new(test_catalogs()),
            summarizer: Arc::new(NoopSummarizer),
        };
        Router::new().nest("/nbs", router()).with_state(state)
    }

    fn price_row(
        id: i64,
        item_type: &str,
        category: &str,
        price: Decimal,
        date: NaiveDate,
    ) -> cleaned_food_prices::Model {
        cleaned_food_prices::Model {
            id,
            food_item: "rice".to_string(),
            item_type: item_type.to_string(),
            category: category.to_string(),
            price,
            date,
            source: "NBS".to_string(),
            vendor_type: "Open Market".to_string(),
            created_at: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn get_response(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_filter_by_year_returns_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                price_row(1, "local rice", "1000 g", dec!(780.00), day(2023, 11, 15)),
                price_row(2, "local rice", "1000 g", dec!(850.50), day(2024, 1, 15)),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/year/?food_item=rice&item_type=local%20rice&category=1000%20g&year=2024",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"2023-11-15\""));
        assert!(body.contains("\"2024-01-15\""));
        assert!(body.contains("850.5"));
    }

    #[tokio::test]
    async fn test_filter_by_year_missing_parameters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(app, "/nbs/year/?food_item=rice").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Missing required parameters"));
    }

    #[tokio::test]
    async fn test_filter_by_year_rejects_early_year() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/year/?food_item=rice&item_type=local%20rice&category=1000%20g&year=2015",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("The earliest year is 2016"));
    }

    #[tokio::test]
    async fn test_filter_by_year_unknown_food_item() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/year/?food_item=caviar&item_type=local%20rice&category=1000%20g&year=2024",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid food_item. Valid options are: oil, rice"));
    }

    #[tokio::test]
    async fn test_filter_by_year_empty_slice_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cleaned_food_prices::Model>::new()])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/year/?food_item=rice&item_type=local%20rice&category=1000%20g&year=2024",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("No records found. Confirm query parameters."));
    }

    #[tokio::test]
    async fn test_filter_by_year_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection closed".to_string())])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/year/?food_item=rice&item_type=local%20rice&category=1000%20g&year=2024",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Database error"));
    }

    #[tokio::test]
    async fn test_average_price_groups_item_types() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([
                    ("item_type", Value::from("imported rice")),
                    ("average_price", Value::from(dec!(1240.50))),
                ]),
                BTreeMap::from([
                    ("item_type", Value::from("local rice")),
                    ("average_price", Value::from(dec!(980.25))),
                ]),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) =
            get_response(app, "/nbs/average-price/?food_item=rice&year=2024").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("imported rice"));
        assert!(body.contains("1240.5"));
        assert!(body.contains("local rice"));
        assert!(body.contains("980.25"));
    }

    #[tokio::test]
    async fn test_yearly_average_price_ascending_years() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([
                    ("year", Value::from(2016)),
                    ("average_price", Value::from(dec!(300.00))),
                ]),
                BTreeMap::from([
                    ("year", Value::from(2017)),
                    ("average_price", Value::from(dec!(340.10))),
                ]),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/yearly-average-price/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2016"));
        assert!(body.contains("2017"));
        assert!(body.contains("340.1"));
    }

    #[tokio::test]
    async fn test_average_price_over_years_reports_span() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("min_year", Value::from(2016)),
                ("max_year", Value::from(2024)),
                ("average_price", Value::from(dec!(612.34))),
            ])]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/average-price-over-years/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"2016 to 2024\""));
        assert!(body.contains("612.34"));
    }

    #[tokio::test]
    async fn test_average_price_over_years_null_span_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("min_year", Value::Int(None)),
                ("max_year", Value::Int(None)),
                ("average_price", Value::Decimal(None)),
            ])]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/average-price-over-years/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("No records found"));
    }

    #[tokio::test]
    async fn test_percentage_between_first_and_last_year() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([
                    ("year", Value::from(2016)),
                    ("average_price", Value::from(dec!(100.00))),
                ]),
                BTreeMap::from([
                    ("year", Value::from(2020)),
                    ("average_price", Value::from(dec!(150.00))),
                ]),
                BTreeMap::from([
                    ("year", Value::from(2024)),
                    ("average_price", Value::from(dec!(120.00))),
                ]),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/percentage/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"2016 to 2024\""));
        assert!(body.contains("\"percentage_change\":20.0"));
    }

    #[tokio::test]
    async fn test_latest_price_returns_most_recent_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![price_row(
                7,
                "local rice",
                "1000 g",
                dec!(910.00),
                day(2024, 6, 1),
            )]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/latest-price/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"2024-06-01\""));
        assert!(body.contains("910"));
    }

    #[tokio::test]
    async fn test_mom_percentage_two_buckets() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([
                    ("year", Value::from(2024)),
                    ("month", Value::from(6)),
                    ("average_price", Value::from(dec!(120.00))),
                ]),
                BTreeMap::from([
                    ("year", Value::from(2024)),
                    ("month", Value::from(5)),
                    ("average_price", Value::from(dec!(100.00))),
                ]),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/mom-percentage/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"current_month\":6"));
        assert!(body.contains("\"current_month_average_price\":120.0"));
        assert!(body.contains("\"previous_month_avg_price\":100.0"));
        assert!(body.contains("\"percentage_change\":20.0"));
    }

    #[tokio::test]
    async fn test_mom_percentage_single_bucket_uses_zero_sentinel() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([
                ("year", Value::from(2024)),
                ("month", Value::from(6)),
                ("average_price", Value::from(dec!(120.00))),
            ])]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/mom-percentage/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"previous_month_avg_price\":0.0"));
        assert!(body.contains("\"percentage_change\":0.0"));
    }

    #[tokio::test]
    async fn test_yoy_percentage_two_buckets() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                BTreeMap::from([
                    ("year", Value::from(2024)),
                    ("average_price", Value::from(dec!(90.00))),
                ]),
                BTreeMap::from([
                    ("year", Value::from(2023)),
                    ("average_price", Value::from(dec!(100.00))),
                ]),
            ]])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) = get_response(
            app,
            "/nbs/yoy-percentage/?food_item=rice&item_type=local%20rice&category=1000%20g",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"current_year\":2024"));
        assert!(body.contains("\"percentage_change\":-10.0"));
    }

    #[tokio::test]
    async fn test_average_item_types_price_scales_units() {
        // First query resolves the latest observation date, second fetches
        // the rows for that month.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![price_row(
                    1,
                    "local rice",
                    "2000 g",
                    dec!(1500.00),
                    day(2024, 6, 10),
                )],
                vec![
                    price_row(1, "local rice", "2000 g", dec!(1500.00), day(2024, 6, 10)),
                    price_row(2, "imported rice", "1000 g", dec!(1200.00), day(2024, 6, 3)),
                ],
            ])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) =
            get_response(app, "/nbs/average-item-types-price/?food_item=rice").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"item_type\":\"local rice\""));
        assert!(body.contains("750"));
        assert!(body.contains("\"item_type\":\"imported rice\""));
        assert!(body.contains("1200"));
        assert!(body.contains("\"unit\":\"kg\""));
    }

    #[tokio::test]
    async fn test_average_item_types_price_no_observations() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cleaned_food_prices::Model>::new()])
            .into_connection();
        let app = setup_test_app(db);

        let (status, body) =
            get_response(app, "/nbs/average-item-types-price/?food_item=rice").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("No records found"));
    }
}
