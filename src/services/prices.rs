use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, Order,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::entities::{articles, cleaned_food_prices, prelude::*};

/// Which slice of the observations table a query runs against. Every
/// operation is scoped to exactly one of these; the predicate text is
/// constant and never built from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    Nbs,
    Supermarket,
}

impl SourceFilter {
    fn condition(self) -> SimpleExpr {
        match self {
            SourceFilter::Nbs => cleaned_food_prices::Column::Source.eq("NBS"),
            SourceFilter::Supermarket => {
                cleaned_food_prices::Column::VendorType.eq("Supermarket")
            }
        }
    }

    fn sql_predicate(self) -> &'static str {
        match self {
            SourceFilter::Nbs => "source = 'NBS'",
            SourceFilter::Supermarket => "vendor_type = 'Supermarket'",
        }
    }
}

#[derive(Debug, FromQueryResult)]
pub struct YearlyAverageRow {
    pub year: i32,
    pub average_price: Decimal,
}

#[derive(Debug, FromQueryResult)]
pub struct MonthlyAverageRow {
    pub year: i32,
    pub month: i32,
    pub average_price: Decimal,
}

#[derive(Debug, FromQueryResult)]
pub struct YearSpanRow {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub average_price: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
pub struct DailyAverageRow {
    pub date: NaiveDate,
    pub average_price: Decimal,
}

#[derive(Debug, FromQueryResult)]
pub struct ItemTypeAverageRow {
    pub item_type: String,
    pub average_price: Decimal,
}

/// First and last calendar day of `year`.
pub fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
    (start, end)
}

/// First and last calendar day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|d| d - Duration::days(1))
        .unwrap_or(date);
    (first, last)
}

/// Monday through Sunday of the ISO week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

fn average_price_expr() -> SimpleExpr {
    Func::avg(Expr::col(cleaned_food_prices::Column::Price)).into()
}

fn item_filter(
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Condition {
    Condition::all()
        .add(cleaned_food_prices::Column::FoodItem.eq(food_item))
        .add(cleaned_food_prices::Column::ItemType.eq(item_type))
        .add(cleaned_food_prices::Column::Category.eq(category))
        .add(source.condition())
}

/// Raw observations for `year` and the year before it, oldest first.
pub async fn rows_for_year_pair(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
    year: i32,
) -> Result<Vec<cleaned_food_prices::Model>, DbErr> {
    let (start, _) = year_bounds(year - 1);
    let (_, end) = year_bounds(year);
    CleanedFoodPrices::find()
        .filter(item_filter(source, food_item, item_type, category))
        .filter(cleaned_food_prices::Column::Date.between(start, end))
        .order_by(cleaned_food_prices::Column::Date, Order::Asc)
        .all(db)
        .await
}

/// Average price per item_type of a food item within one calendar year.
pub async fn item_type_averages_for_year(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    year: i32,
) -> Result<Vec<ItemTypeAverageRow>, DbErr> {
    let (start, end) = year_bounds(year);
    CleanedFoodPrices::find()
        .select_only()
        .column(cleaned_food_prices::Column::ItemType)
        .column_as(average_price_expr(), "average_price")
        .filter(cleaned_food_prices::Column::FoodItem.eq(food_item))
        .filter(source.condition())
        .filter(cleaned_food_prices::Column::Date.between(start, end))
        .group_by(cleaned_food_prices::Column::ItemType)
        .order_by(cleaned_food_prices::Column::ItemType, Order::Asc)
        .into_model::<ItemTypeAverageRow>()
        .all(db)
        .await
}

/// Average price per observed year, oldest first.
// Raw SQL for the PostgreSQL EXTRACT year bucketing
pub async fn yearly_averages(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Result<Vec<YearlyAverageRow>, DbErr> {
    YearlyAverageRow::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        format!(
            r#"
            SELECT EXTRACT(YEAR FROM date)::int AS year, AVG(price) AS average_price
            FROM cleaned_food_prices
            WHERE food_item = $1 AND item_type = $2 AND category = $3 AND {}
            GROUP BY EXTRACT(YEAR FROM date)
            ORDER BY EXTRACT(YEAR FROM date)
            "#,
            source.sql_predicate()
        ),
        vec![food_item.into(), item_type.into(), category.into()],
    ))
    .all(db)
    .await
}

/// The two most recent yearly averages, newest first.
pub async fn last_two_yearly_averages(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Result<Vec<YearlyAverageRow>, DbErr> {
    YearlyAverageRow::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        format!(
            r#"
            SELECT EXTRACT(YEAR FROM date)::int AS year, AVG(price) AS average_price
            FROM cleaned_food_prices
            WHERE food_item = $1 AND item_type = $2 AND category = $3 AND {}
            GROUP BY EXTRACT(YEAR FROM date)
            ORDER BY EXTRACT(YEAR FROM date) DESC
            LIMIT 2
            "#,
            source.sql_predicate()
        ),
        vec![food_item.into(), item_type.into(), category.into()],
    ))
    .all(db)
    .await
}

/// Single-row span: earliest year, latest year, and the all-time average.
pub async fn year_span_average(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Result<Option<YearSpanRow>, DbErr> {
    YearSpanRow::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        format!(
            r#"
            SELECT MIN(EXTRACT(YEAR FROM date))::int AS min_year,
                   MAX(EXTRACT(YEAR FROM date))::int AS max_year,
                   AVG(price) AS average_price
            FROM cleaned_food_prices
            WHERE food_item = $1 AND item_type = $2 AND category = $3 AND {}
            "#,
            source.sql_predicate()
        ),
        vec![food_item.into(), item_type.into(), category.into()],
    ))
    .one(db)
    .await
}

/// The most recent (year, month) average buckets, newest first.
pub async fn last_monthly_averages(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
    limit: i64,
) -> Result<Vec<MonthlyAverageRow>, DbErr> {
    MonthlyAverageRow::find_by_statement(sea_orm::Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        format!(
            r#"
            SELECT EXTRACT(YEAR FROM date)::int AS year,
                   EXTRACT(MONTH FROM date)::int AS month,
                   AVG(price) AS average_price
            FROM cleaned_food_prices
            WHERE food_item = $1 AND item_type = $2 AND category = $3 AND {}
            GROUP BY EXTRACT(YEAR FROM date), EXTRACT(MONTH FROM date)
            ORDER BY EXTRACT(YEAR FROM date) DESC, EXTRACT(MONTH FROM date) DESC
            LIMIT $4
            "#,
            source.sql_predicate()
        ),
        vec![
            food_item.into(),
            item_type.into(),
            category.into(),
            limit.into(),
        ],
    ))
    .all(db)
    .await
}

/// The single most recent observation for the slice.
pub async fn latest_observation(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Result<Option<cleaned_food_prices::Model>, DbErr> {
    CleanedFoodPrices::find()
        .filter(item_filter(source, food_item, item_type, category))
        .order_by(cleaned_food_prices::Column::Date, Order::Desc)
        .one(db)
        .await
}

/// Average price per observed date, oldest first, optionally restricted to
/// an inclusive date window.
pub async fn daily_averages(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<DailyAverageRow>, DbErr> {
    let mut query = CleanedFoodPrices::find()
        .select_only()
        .column(cleaned_food_prices::Column::Date)
        .column_as(average_price_expr(), "average_price")
        .filter(item_filter(source, food_item, item_type, category));
    if let Some((start, end)) = window {
        query = query.filter(cleaned_food_prices::Column::Date.between(start, end));
    }
    query
        .group_by(cleaned_food_prices::Column::Date)
        .order_by(cleaned_food_prices::Column::Date, Order::Asc)
        .into_model::<DailyAverageRow>()
        .all(db)
        .await
}

/// The two most recent daily averages, newest first.
pub async fn last_two_daily_averages(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_type: &str,
    category: &str,
) -> Result<Vec<DailyAverageRow>, DbErr> {
    CleanedFoodPrices::find()
        .select_only()
        .column(cleaned_food_prices::Column::Date)
        .column_as(average_price_expr(), "average_price")
        .filter(item_filter(source, food_item, item_type, category))
        .group_by(cleaned_food_prices::Column::Date)
        .order_by(cleaned_food_prices::Column::Date, Order::Desc)
        .limit(2)
        .into_model::<DailyAverageRow>()
        .all(db)
        .await
}

/// Most recent observation date for a food item, ignoring rows with an
/// empty category label since those carry no unit information.
pub async fn latest_date_for_item(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
) -> Result<Option<NaiveDate>, DbErr> {
    let row = CleanedFoodPrices::find()
        .filter(cleaned_food_prices::Column::FoodItem.eq(food_item))
        .filter(source.condition())
        .filter(cleaned_food_prices::Column::Category.ne(""))
        .order_by(cleaned_food_prices::Column::Date, Order::Desc)
        .one(db)
        .await?;
    Ok(row.map(|r| r.date))
}

/// Observations within a date window restricted to the catalog's item types.
pub async fn observations_for_item_types(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    item_types: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<cleaned_food_prices::Model>, DbErr> {
    if item_types.is_empty() {
        return Ok(Vec::new());
    }
    CleanedFoodPrices::find()
        .filter(cleaned_food_prices::Column::FoodItem.eq(food_item))
        .filter(source.condition())
        .filter(cleaned_food_prices::Column::ItemType.is_in(item_types.iter().cloned()))
        .filter(cleaned_food_prices::Column::Date.between(start, end))
        .all(db)
        .await
}

/// Observations within a date window restricted to the catalog's
/// (item_type, category) pairs.
pub async fn observations_for_pairs(
    db: &DatabaseConnection,
    source: SourceFilter,
    food_item: &str,
    pairs: &[(String, String)],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<cleaned_food_prices::Model>, DbErr> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }
    let mut scope = Condition::any();
    for (item_type, category) in pairs {
        scope = scope.add(
            Condition::all()
                .add(cleaned_food_prices::Column::ItemType.eq(item_type.as_str()))
                .add(cleaned_food_prices::Column::Category.eq(category.as_str())),
        );
    }
    CleanedFoodPrices::find()
        .filter(cleaned_food_prices::Column::FoodItem.eq(food_item))
        .filter(source.condition())
        .filter(scope)
        .filter(cleaned_food_prices::Column::Date.between(start, end))
        .all(db)
        .await
}

/// Articles published on or after `since`, oldest first.
pub async fn articles_published_since(
    db: &DatabaseConnection,
    since: NaiveDate,
) -> Result<Vec<articles::Model>, DbErr> {
    Articles::find()
        .filter(articles::Column::PublishedAt.gte(since))
        .order_by(articles::Column::PublishedAt, Order::Asc)
        .all(db)
        .await
}
