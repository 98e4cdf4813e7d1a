//! HTTP surface over the catalog service and the cached provider reads.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use cloudscope_api::{CatalogError, CatalogService, FilterKind, Trigger};
use cloudscope_core::{CachedProvider, CollectorConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    service: Arc<dyn CatalogService>,
    provider: CachedProvider,
}

#[derive(Debug, Default, Deserialize)]
struct TagQuery {
    key: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        Self(value)
    }
}

fn status_for(error: &CatalogError) -> StatusCode {
    match error {
        CatalogError::Filter
        | CatalogError::InvalidArgument(_)
        | CatalogError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
        .into_response()
}

fn found<T: Serialize>(status: StatusCode, items: Vec<T>) -> Response {
    if items.is_empty() {
        return not_found();
    }
    (status, Json(items)).into_response()
}

/// POST /api/backstage
async fn trigger_sync(
    State(state): State<AppState>,
    Json(trigger): Json<Trigger>,
) -> Result<Response, ApiError> {
    let entities = state.service.trigger_sync(&trigger).await?;
    Ok((StatusCode::ACCEPTED, Json(entities)).into_response())
}

/// GET /api/backstage?name=&kind=&namespace=
async fn get_all(
    State(state): State<AppState>,
    Query(filter): Query<FilterKind>,
) -> Result<Response, ApiError> {
    let entities = state.service.get_all(&filter).await?;
    Ok(found(StatusCode::OK, entities))
}

/// GET /api/backstage/{namespace}/{kind}/{name}
async fn get_kind(
    State(state): State<AppState>,
    Path((namespace, kind, name)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let entities = state.service.get_kind(&namespace, &kind, &name).await?;
    Ok(found(StatusCode::OK, entities))
}

/// GET /api/{provider}
async fn list_resources(State(state): State<AppState>) -> Result<Response, ApiError> {
    let resources = state.provider.list_resources().await?;
    Ok(found(StatusCode::OK, resources))
}

/// GET /api/{provider}/{group}
async fn list_by_resource_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Response, ApiError> {
    let resources = state.provider.list_by_resource_group(&group).await?;
    Ok(found(StatusCode::OK, resources))
}

/// GET /api/{provider}/tags?key=&value=
async fn list_by_tag(
    State(state): State<AppState>,
    Query(tag): Query<TagQuery>,
) -> Result<Response, ApiError> {
    let (Some(key), Some(value)) = (
        tag.key.filter(|k| !k.is_empty()),
        tag.value.filter(|v| !v.is_empty()),
    ) else {
        let missing = CatalogError::InvalidArgument("tag key and value are required".to_string());
        return Err(missing.into());
    };
    let resources = state.provider.list_by_tag(&key, &value).await?;
    Ok(found(StatusCode::OK, resources))
}

/// GET /api/{provider}/subscription/{name}; the segment matches the display name or the id.
async fn get_subscription(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    match state.provider.get_subscription(&name, &name).await? {
        Some(subscription) => Ok((StatusCode::OK, Json(subscription)).into_response()),
        None => Ok(not_found()),
    }
}

pub fn router(service: Arc<dyn CatalogService>, provider: CachedProvider) -> Router {
    let base = format!("/api/{}", provider.provider());
    Router::new()
        .route("/api/backstage", get(get_all).post(trigger_sync))
        .route("/api/backstage/{namespace}/{kind}/{name}", get(get_kind))
        .route(&base, get(list_resources))
        .route(&format!("{base}/tags"), get(list_by_tag))
        .route(&format!("{base}/subscription/{{name}}"), get(get_subscription))
        .route(&format!("{base}/{{group}}"), get(list_by_resource_group))
        .with_state(AppState { service, provider })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}

pub async fn run(
    config: CollectorConfig,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let collector = Arc::new(cloudscope_runtime::build_default_collector(config).await?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("catalog server listening on {}", listener.local_addr()?);

    let app = router(collector.clone(), collector.provider().clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped, draining background work");
    collector.shutdown().await?;
    Ok(())
}
