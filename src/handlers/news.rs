use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};

use crate::models::common::{ErrorResponse, SummaryResponse};
use crate::services::prices;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/day-level-summary/", get(day_level_summary))
        .route("/week-level-summary/", get(week_level_summary))
        .route("/month-level-summary/", get(month_level_summary))
}

/// Summarize every article published in the last `days` days. An empty
/// window returns an empty summary without calling the backend.
async fn summarize_window(
    state: &AppState,
    days: i64,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let since = Utc::now().date_naive() - Duration::days(days);
    let articles = prices::articles_published_since(&state.db, since)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load articles since {}: {}", since, e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Error processing news summary request".to_string(),
                }),
            )
        })?;

    if articles.is_empty() {
        return Ok(Json(SummaryResponse {
            summary: String::new(),
        }));
    }

    let news = articles
        .iter()
        .map(|article| format!("{}\n{}", article.title, article.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    tracing::info!(
        "Summarizing {} articles published in the last {} day(s)",
        articles.len(),
        days
    );

    let summary = state.summarizer.summarize(&news).await;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn day_level_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    summarize_window(&state, 1).await
}

pub async fn week_level_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    summarize_window(&state, 7).await
}

pub async fn month_level_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    summarize_window(&state, 30).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
    use tower::ServiceExt;

    use crate::entities::articles;
    use crate::services::catalog::DashboardCatalogs;
    use crate::services::summarizer::Summarizer;

    /// Echoes the text it was asked to summarize and counts invocations.
    struct EchoSummarizer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, news: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            news.to_string()
        }
    }

    fn setup_test_app(db: DatabaseConnection, calls: Arc<AtomicUsize>) -> Router {
        let state = AppState {
            db,
            catalogs: Arc::new(DashboardCatalogs::new(BTreeMap::new(), BTreeMap::new())),
            summarizer: Arc::new(EchoSummarizer { calls }),
        };
        Router::new().nest("/news", router()).with_state(state)
    }

    fn article(id: i64, title: &str, content: &str, published_at: NaiveDate) -> articles::Model {
        articles::Model {
            id,
            title: title.to_string(),
            content: content.to_string(),
            published_at,
            created_at: None,
        }
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
    async fn test_day_summary_feeds_articles_to_summarizer() {
        let today = Utc::now().date_naive();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                article(1, "Fuel scarcity hits markets", "Transport costs rose.", today),
                article(2, "Flooding in the north", "Harvests were lost.", today),
            ]])
            .into_connection();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = setup_test_app(db, calls.clone());

        let (status, body) = get_response(app, "/news/day-level-summary/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Fuel scarcity hits markets"));
        assert!(body.contains("Harvests were lost."));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_window_skips_the_summarizer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<articles::Model>::new()])
            .into_connection();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = setup_test_app(db, calls.clone());

        let (status, body) = get_response(app, "/news/week-level-summary/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"summary\":\"\"}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_error_maps_to_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection closed".to_string())])
            .into_connection();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = setup_test_app(db, calls.clone());

        let (status, body) = get_response(app, "/news/month-level-summary/").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Error processing news summary request"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
