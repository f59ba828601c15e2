use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::{error, info};

use backend_application::commands::ingest_commands;
use backend_application::AppState;
use backend_domain::IngestSummary;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_payloads};

pub async fn ingest_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<IngestSummary>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let payloads = parse_payloads(&headers, &body).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let summary = ingest_commands::ingest_payloads(&state, payloads).await;
    info!(
        received = summary.received,
        persisted = summary.persisted,
        filtered = summary.filtered,
        failed = summary.failed,
        "ingest batch processed"
    );
    Ok(Json(summary))
}
