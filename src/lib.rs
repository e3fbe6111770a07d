// src/lib.rs

use std::sync::Arc;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use services::catalog::DashboardCatalogs;
use services::summarizer::Summarizer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub catalogs: Arc<DashboardCatalogs>,
    pub summarizer: Arc<dyn Summarizer>,
}

pub mod entities {
    pub mod prelude;
    pub mod articles;
    pub mod cleaned_food_prices;
}

pub mod services {
    pub mod catalog;
    pub mod price_math;
    pub mod prices;
    pub mod summarizer;
    pub mod timeseries;
    pub mod units;
}

pub mod models;
pub mod handlers;

/// Assemble the full application router over the given state.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_food_prices))
        .nest("/nbs", handlers::nbs::router())
        .nest("/supermarkets", handlers::supermarkets::router())
        .nest("/news", handlers::news::router())
        .with_state(state)
}

async fn hello_food_prices() -> &'static str {
    "Food Prices API. Daily, monthly, and yearly food price data."
}
