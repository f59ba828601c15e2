use axum::routing::{delete, get, post, put};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ingest_handlers, ops_handlers, report_handlers, team_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v2/ingest/events", post(ingest_handlers::ingest_events))
        .route("/v2/reports/team", get(report_handlers::team_report))
        .route("/v2/reports/characters", get(report_handlers::character_report))
        .route(
            "/v2/teams",
            get(team_handlers::list_teams).put(team_handlers::create_team),
        )
        .route(
            "/v2/teams/:team_tag/characters",
            put(team_handlers::track_characters),
        )
        .route("/v2/teams/:team_tag", get(team_handlers::team_roster))
        .route(
            "/v2/teams/:team_tag/characters/:name",
            delete(team_handlers::untrack_character),
        )
        .route("/v2/teams/:team_tag/outfits", put(team_handlers::track_outfit))
        .route(
            "/v2/teams/:team_tag/outfits/:outfit_tag",
            delete(team_handlers::untrack_outfit),
        )
        .route("/v2/ops/health/live", get(ops_handlers::health_live))
        .route("/v2/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v2/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
