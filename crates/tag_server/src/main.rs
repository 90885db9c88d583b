use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use shared::{
    error::{ApiError, ApiException, ErrorCode},
    protocol::{FindTagsQuery, FIND_TAGS_PARAM, FIND_TAGS_PATH},
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod tags;

use config::load_settings;
use tags::{render_search_results, TagCatalog};

struct AppState {
    catalog: TagCatalog,
    max_results: usize,
    response_delay: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let catalog = match &settings.tags_file {
        Some(path) => TagCatalog::load(path).map_err(|error| {
            error!(
                path = %path.display(),
                %error,
                "failed to load tag catalogue; check APP__TAGS_FILE"
            );
            error
        })?,
        None => TagCatalog::sample(),
    };
    info!(tags = catalog.len(), "tag catalogue ready");

    let state = AppState {
        catalog,
        max_results: settings.max_results,
        response_delay: Duration::from_millis(settings.response_delay_ms),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "tag server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(FIND_TAGS_PATH, get(find_tags))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn find_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FindTagsQuery>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let name = required_name(query).map_err(|e| (StatusCode::BAD_REQUEST, Json(e.into())))?;

    if !state.response_delay.is_zero() {
        tokio::time::sleep(state.response_delay).await;
    }

    let matches = state.catalog.search(&name, state.max_results);
    debug!(query = %name, matches = matches.len(), "answered tag search");
    Ok(Html(render_search_results(&name, &matches)))
}

fn required_name(query: FindTagsQuery) -> Result<String, ApiException> {
    query.name.ok_or_else(|| {
        ApiException::new(
            ErrorCode::Validation,
            format!("missing '{FIND_TAGS_PARAM}' query parameter"),
        )
    })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
