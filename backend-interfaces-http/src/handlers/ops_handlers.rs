use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

use crate::middleware::authorize;

#[derive(Serialize)]
struct ReadyStatus {
    database: &'static str,
    census: &'static str,
    cached_names: usize,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Database and census reachability; only the database gates readiness.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    let (database, census) = tokio::join!(
        timeout(timeout_duration, state.health.check_database()),
        timeout(timeout_duration, state.health.check_census()),
    );
    let database = check_label("database", database);
    let census = check_label("census", census);
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyStatus {
        database,
        census,
        cached_names: state.resolver.cache_len().await,
    };
    (status, Json(body))
}

fn check_label(
    target: &str,
    result: Result<anyhow::Result<bool>, tokio::time::error::Elapsed>,
) -> &'static str {
    match result {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) => "down",
        Ok(Err(err)) => {
            error!("{} check failed: {}", target, err);
            "error"
        }
        Err(_) => {
            error!("{} check timed out", target);
            "timeout"
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
