// Session report generation
// Reads the persisted log for one window and derives the four views.

use backend_domain::services::{
    class_timeline, interaction_graph, interaction_timeline, vehicle_timeline,
};
use backend_domain::{
    expand_faction_variants, CharacterReportQuery, EnrichedEvent, EventKind, ReportResponse,
    ReportScope, ReportWindowQuery, SessionReport, TeamReportQuery, MAX_STORED_EPOCH_SECONDS,
};
use chrono::{DateTime, NaiveDateTime};
use tracing::{error, info};

use crate::commands::team_commands::validate_word;
use crate::{AppError, AppState};

const INPUT_DATE_FORMAT: &str = "%y-%m-%d %H:%M";
const FILE_DATE_FORMAT: &str = "%y%m%d-%H%M";

/// Closed window `[start, end]` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: i64,
    pub end: i64,
}

impl ReportWindow {
    pub fn length_minutes(&self) -> i64 {
        (self.end - self.start) / 60
    }
}

/// Epoch seconds or `YY-MM-DD hh:mm` in UTC.
pub fn parse_start(value: &str) -> Result<i64, AppError> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Ok(seconds);
    }
    NaiveDateTime::parse_from_str(value, INPUT_DATE_FORMAT)
        .map(|naive| naive.and_utc().timestamp())
        .map_err(|_| {
            AppError::BadRequest(format!(
                "start '{}' must be epoch seconds or YY-MM-DD hh:mm",
                value
            ))
        })
}

/// Builds the window from `end` or `length` and caps it at `max_minutes`.
pub fn resolve_window(
    query: &ReportWindowQuery,
    max_minutes: i64,
) -> Result<ReportWindow, AppError> {
    let start = parse_start(&query.start)?;
    let end = match (query.end, query.length) {
        (Some(end), _) => end,
        (None, Some(length)) if length > 0 => length
            .checked_mul(60)
            .and_then(|seconds| start.checked_add(seconds))
            .ok_or_else(|| AppError::BadRequest(format!("length {} is out of range", length)))?,
        (None, Some(_)) => {
            return Err(AppError::BadRequest("length must be positive".to_string()));
        }
        (None, None) => {
            return Err(AppError::BadRequest("either end or length is required".to_string()));
        }
    };
    check_window(ReportWindow { start, end }, max_minutes)
}

fn check_window(window: ReportWindow, max_minutes: i64) -> Result<ReportWindow, AppError> {
    let ReportWindow { start, end } = window;
    if end <= start {
        return Err(AppError::BadRequest("end must be after start".to_string()));
    }
    if start < 0 || end > MAX_STORED_EPOCH_SECONDS {
        return Err(AppError::BadRequest(format!(
            "window must lie between 0 and {}",
            MAX_STORED_EPOCH_SECONDS
        )));
    }
    if end - start > max_minutes.saturating_mul(60) {
        return Err(AppError::BadRequest(format!(
            "report window must not exceed {} minutes",
            max_minutes
        )));
    }
    Ok(window)
}

/// `session-report-<YYMMDD-hhmm>-<length>min-<scope>`
pub fn report_file_stem(window: &ReportWindow, scope: &ReportScope) -> String {
    let started = DateTime::from_timestamp(window.start, 0)
        .map(|at| at.format(FILE_DATE_FORMAT).to_string())
        .unwrap_or_else(|| window.start.to_string());
    format!(
        "session-report-{}-{}min-{}",
        started,
        window.length_minutes(),
        scope.label()
    )
}

async fn fetch(
    state: &AppState,
    kind: EventKind,
    scope: &ReportScope,
    window: &ReportWindow,
) -> anyhow::Result<Vec<EnrichedEvent>> {
    state
        .event_repo
        .query_range(kind, scope, window.start, window.end)
        .await
}

fn merge_by_time(mut left: Vec<EnrichedEvent>, right: Vec<EnrichedEvent>) -> Vec<EnrichedEvent> {
    left.extend(right);
    left.sort_by_key(EnrichedEvent::timestamp);
    left
}

pub async fn reconstruct_session(
    state: &AppState,
    scope: &ReportScope,
    window: ReportWindow,
) -> Result<SessionReport, AppError> {
    let window = check_window(window, state.config.max_report_minutes)?;
    let loaded = futures_util::try_join!(
        fetch(state, EventKind::Experience, scope, &window),
        fetch(state, EventKind::SessionChange, scope, &window),
        fetch(state, EventKind::Death, scope, &window),
        fetch(state, EventKind::VehicleDestroy, scope, &window),
    );
    let (experience, sessions, deaths, vehicle_kills) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            state.metrics.record_report(false);
            error!(scope = %scope.label(), "report query failed: {}", err);
            return Err(AppError::Internal(err));
        }
    };

    let config = &state.config.reconstruction;
    let (start, end) = (window.start, window.end);
    let class_events = merge_by_time(experience.clone(), sessions);
    let combat_events = merge_by_time(deaths, vehicle_kills);

    let report = SessionReport {
        scope: scope.label(),
        start,
        end,
        class_timeline: class_timeline(&class_events, scope, start, end, config),
        vehicle_timeline: vehicle_timeline(&experience, scope, start, end, &state.reference, config),
        interaction_timeline: interaction_timeline(&combat_events, scope, start, end, config),
        interaction_graph: interaction_graph(&experience, scope, start, end, config),
    };
    state.metrics.record_report(true);
    info!(
        scope = %report.scope,
        start,
        end,
        nodes = report.interaction_graph.nodes.len(),
        "session report generated"
    );
    Ok(report)
}

pub async fn generate_report_for_team(
    state: &AppState,
    team_tag: &str,
    window: ReportWindow,
) -> Result<SessionReport, AppError> {
    let scope = team_scope(state, team_tag).await?;
    reconstruct_session(state, &scope, window).await
}

async fn team_scope(state: &AppState, team_tag: &str) -> Result<ReportScope, AppError> {
    let team_tag = validate_word(team_tag, "team_tag")?;
    let team = state
        .team_repo
        .find_team(&team_tag)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("team '{}'", team_tag)))?;
    Ok(ReportScope::Team(team))
}

pub async fn generate_report_for_characters(
    state: &AppState,
    names: &[String],
    window: ReportWindow,
) -> Result<SessionReport, AppError> {
    let scope = character_scope(names)?;
    reconstruct_session(state, &scope, window).await
}

fn character_scope(names: &[String]) -> Result<ReportScope, AppError> {
    let mut validated = Vec::with_capacity(names.len());
    for name in names {
        validated.push(validate_word(name, "character name")?);
    }
    if validated.is_empty() {
        return Err(AppError::BadRequest("names must not be empty".to_string()));
    }
    Ok(ReportScope::characters(expand_faction_variants(validated)))
}

async fn respond(
    state: &AppState,
    report: SessionReport,
    window: &ReportWindow,
    scope: &ReportScope,
    save: bool,
) -> Result<ReportResponse, AppError> {
    let saved_to = if save {
        let stem = report_file_stem(window, scope);
        let path = state.report_sink.save_report(&stem, &report).await.map_err(|err| {
            error!("failed to save report: {}", err);
            AppError::Internal(err)
        })?;
        Some(path)
    } else {
        None
    };
    Ok(ReportResponse { report, saved_to })
}

pub async fn team_report(state: &AppState, query: TeamReportQuery) -> Result<ReportResponse, AppError> {
    let window = resolve_window(&query.window, state.config.max_report_minutes)?;
    let scope = team_scope(state, &query.team_tag).await?;
    let report = reconstruct_session(state, &scope, window).await?;
    respond(state, report, &window, &scope, query.window.save).await
}

pub async fn character_report(
    state: &AppState,
    query: CharacterReportQuery,
) -> Result<ReportResponse, AppError> {
    let window = resolve_window(&query.window, state.config.max_report_minutes)?;
    let names: Vec<String> = query
        .names
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect();
    let scope = character_scope(&names)?;
    let report = reconstruct_session(state, &scope, window).await?;
    respond(state, report, &window, &scope, query.window.save).await
}
