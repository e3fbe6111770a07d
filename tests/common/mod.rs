use std::path::Path;
use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use food_prices_backend::services::catalog::DashboardCatalogs;
use food_prices_backend::services::summarizer::Summarizer;
use food_prices_backend::{app_router, AppState};

/// Stand-in for the generative backend: always returns the same summary.
pub struct FixedSummarizer(pub &'static str);

#[async_trait::async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _news: &str) -> String {
        self.0.to_string()
    }
}

/// Build the full application router over a mocked database and the catalog
/// documents shipped under dashboard_items/.
pub fn build_test_router(db: DatabaseConnection) -> Router {
    let catalogs = DashboardCatalogs::load(Path::new("dashboard_items"))
        .expect("dashboard catalogs should load");
    let state = AppState {
        db,
        catalogs: Arc::new(catalogs),
        summarizer: Arc::new(FixedSummarizer("summary of recent food price news")),
    };
    app_router(state)
}

/// A mock connection that expects no queries at all.
#[allow(dead_code)]
pub fn empty_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}
