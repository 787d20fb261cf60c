//! HTTP surface: the public read endpoint, health, and the admin write path.

use crate::cache::{CacheStats, FaqCache};
use crate::db::Database;
use crate::error::StoreError;
use crate::fill::FillPolicy;
use crate::i18n::Languages;
use crate::metrics::{MetricsReport, ServiceMetrics};
use crate::model::{Faq, FaqPatch, FaqView, NewFaq};
use crate::query::FaqQuery;
use crate::retry::RetryConfig;
use crate::store::ContentStore;
use crate::translation::{Translator, TranslatorGateway};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Services shared by every handler.
pub struct AppState {
    pub store: ContentStore,
    pub query: FaqQuery,
    pub cache: Arc<FaqCache>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Wire the store, fill policy, cache and query façade around `db`.
    pub fn new(
        db: Database,
        translator: Arc<dyn Translator>,
        languages: Languages,
        cache_ttl: Duration,
        translation_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        let metrics = Arc::new(ServiceMetrics::new());
        let languages = Arc::new(languages);

        let gateway = TranslatorGateway::new(
            translator,
            languages.original().clone(),
            translation_timeout,
            metrics.clone(),
        )
        .with_retry(retry);
        let cache = Arc::new(FaqCache::new(cache_ttl, metrics.clone()));
        let store = ContentStore::new(
            db,
            FillPolicy::new(gateway, languages.clone()),
            cache.clone(),
            metrics.clone(),
        );
        let query = FaqQuery::new(store.clone(), cache.clone(), languages);

        Self {
            store,
            query,
            cache,
            metrics,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/faqs", get(list_faqs))
        .route("/health", get(health))
        .route("/admin/faqs", get(admin_list).post(admin_create))
        .route(
            "/admin/faqs/:id",
            get(admin_get).put(admin_update).delete(admin_delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

/// JSON error body: `{"error": code, "message": ...}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let (status, code, message) = match &err {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
            StoreError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", err.to_string())
            }
            StoreError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "storage unavailable".to_string(),
                )
            }
        };
        ApiError {
            status,
            body: ErrorBody {
                error: code,
                message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ==================== Read Path ====================

/// `GET /faqs?lang=<code>`
///
/// The query is read as raw pairs so a repeated or unexpected parameter
/// never rejects the request; the first `lang` wins.
async fn list_faqs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Arc<Vec<FaqView>>>, ApiError> {
    let lang = params
        .iter()
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.as_str());
    let views = state.query.list(lang).await?;
    Ok(Json(views))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStats,
    metrics: MetricsReport,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
        metrics: state.metrics.report(),
    })
}

// ==================== Admin ====================

async fn admin_list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn admin_create(
    State(state): State<Arc<AppState>>,
    Json(new_faq): Json<NewFaq>,
) -> Result<(StatusCode, Json<Faq>), ApiError> {
    let faq = state.store.create(new_faq).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

async fn admin_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Faq>, ApiError> {
    Ok(Json(state.store.get(id).await?))
}

async fn admin_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<FaqPatch>,
) -> Result<Json<Faq>, ApiError> {
    Ok(Json(state.store.update(id, patch).await?))
}

async fn admin_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
