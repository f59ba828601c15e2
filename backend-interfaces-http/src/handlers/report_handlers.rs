use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::report_queries;
use backend_application::AppState;
use backend_domain::{CharacterReportQuery, ReportResponse, TeamReportQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn team_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TeamReportQuery>,
) -> Result<Json<ReportResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let response = report_queries::team_report(&state, query).await?;
    Ok(Json(response))
}

pub async fn character_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CharacterReportQuery>,
) -> Result<Json<ReportResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let response = report_queries::character_report(&state, query).await?;
    Ok(Json(response))
}
