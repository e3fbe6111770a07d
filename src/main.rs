use std::env;
use std::path::Path;
use std::sync::Arc;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_prices_backend::services::catalog::DashboardCatalogs;
use food_prices_backend::services::summarizer::OpenAiSummarizer;
use food_prices_backend::{app_router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,food_prices_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Load the dashboard catalogs
    let dashboard_dir = env::var("DASHBOARD_DIR").unwrap_or_else(|_| "dashboard_items".to_string());
    tracing::info!("Loading dashboard catalogs from {}...", dashboard_dir);
    let catalogs = DashboardCatalogs::load(Path::new(&dashboard_dir))
        .expect("Failed to load dashboard catalogs");

    // Configure the news summarizer
    let api_key = env::var("SUMMARIZER_API_KEY").unwrap_or_else(|_| {
        tracing::warn!("SUMMARIZER_API_KEY is not set; news summaries will be empty");
        String::new()
    });
    let base_url =
        env::var("SUMMARIZER_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let model = env::var("SUMMARIZER_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

    let state = AppState {
        db,
        catalogs: Arc::new(catalogs),
        summarizer: Arc::new(OpenAiSummarizer::new(api_key, base_url, model)),
    };

    // Build router
    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
