// API request/response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SessionReport, Team, TrackedCharacter, TrackedOutfit};
use crate::utils::{de_lenient_bool, de_opt_lenient_i64};

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub team_tag: String,
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackCharactersRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackCharactersResponse {
    pub team: Team,
    pub tracked: Vec<TrackedCharacter>,
    pub missing: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackOutfitRequest {
    pub outfit_tag: String,
}

#[derive(Debug, Serialize)]
pub struct TrackOutfitResponse {
    pub team: Team,
    pub outfit: TrackedOutfit,
    /// Members whose team attribution now follows the outfit.
    pub members: usize,
}

#[derive(Debug, Serialize)]
pub struct TeamRoster {
    pub team: Team,
    pub characters: Vec<TrackedCharacter>,
    pub outfits: Vec<TrackedOutfit>,
}

/// Report window: `start` is epoch seconds or `YY-MM-DD hh:mm` (UTC); the end is
/// either explicit or `length` minutes after the start.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportWindowQuery {
    pub start: String,
    #[serde(default, deserialize_with = "de_opt_lenient_i64")]
    pub end: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_lenient_i64")]
    pub length: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_bool")]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
pub struct TeamReportQuery {
    pub team_tag: String,
    #[serde(flatten)]
    pub window: ReportWindowQuery,
}

#[derive(Debug, Deserialize)]
pub struct CharacterReportQuery {
    /// Comma separated.
    pub names: String,
    #[serde(flatten)]
    pub window: ReportWindowQuery,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: SessionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IngestPayload {
    Batch(Vec<Value>),
    Envelope { events: Vec<Value> },
}

impl IngestPayload {
    pub fn into_events(self) -> Vec<Value> {
        match self {
            IngestPayload::Batch(events) => events,
            IngestPayload::Envelope { events } => events,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub received: usize,
    pub persisted: usize,
    pub filtered: usize,
    pub ignored: usize,
    pub failed: usize,
}
