use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::team_commands;
use backend_application::queries::team_queries;
use backend_application::AppState;
use backend_domain::{
    CreateTeamRequest, Team, TeamRoster, TrackCharactersRequest, TrackCharactersResponse,
    TrackOutfitRequest, TrackOutfitResponse, TrackedCharacter, TrackedOutfit,
};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn list_teams(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Team>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let teams = team_queries::list_teams(&state).await?;
    Ok(Json(teams))
}

pub async fn create_team(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let team = team_commands::create_team(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn track_characters(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_tag): Path<String>,
    Json(payload): Json<TrackCharactersRequest>,
) -> Result<Json<TrackCharactersResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let response = team_commands::track_characters(&state, &team_tag, payload).await?;
    Ok(Json(response))
}

pub async fn team_roster(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_tag): Path<String>,
) -> Result<Json<TeamRoster>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let roster = team_queries::team_roster(&state, &team_tag).await?;
    Ok(Json(roster))
}

pub async fn track_outfit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_tag): Path<String>,
    Json(payload): Json<TrackOutfitRequest>,
) -> Result<Json<TrackOutfitResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let response = team_commands::track_outfit(&state, &team_tag, payload).await?;
    Ok(Json(response))
}

pub async fn untrack_character(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((team_tag, name)): Path<(String, String)>,
) -> Result<Json<TrackedCharacter>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let removed = team_commands::untrack_character(&state, &team_tag, &name).await?;
    Ok(Json(removed))
}

pub async fn untrack_outfit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((team_tag, outfit_tag)): Path<(String, String)>,
) -> Result<Json<TrackedOutfit>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let removed = team_commands::untrack_outfit(&state, &team_tag, &outfit_tag).await?;
    Ok(Json(removed))
}
