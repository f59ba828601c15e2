// Storage row for one enriched event
// Participant columns are denormalised for range scans; the record itself is kept as JSON.

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::EnrichedEvent;
use crate::utils::seconds_to_utc;

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct SessionEventRow {
    #[serde(with = "clickhouse::serde::time::datetime")]
    pub event_time: OffsetDateTime,
    pub event_kind: String,
    pub character_id: String,
    pub character_name: String,
    pub team_id: String,
    pub other_id: String,
    pub other_name: String,
    pub other_team_id: String,
    pub payload: String,
    /// Insert order; breaks ties between events stamped with the same second.
    pub seq: u64,
}

impl SessionEventRow {
    pub fn from_event(event: &EnrichedEvent, seq: u64) -> anyhow::Result<Self> {
        let subject = event.subject();
        let other = event.counterpart();
        Ok(Self {
            event_time: seconds_to_utc(event.timestamp())?,
            event_kind: event.kind().as_str().to_string(),
            character_id: subject.id.clone(),
            character_name: subject.name.clone().unwrap_or_default(),
            team_id: subject.team_id.clone().unwrap_or_default(),
            other_id: other.map(|c| c.id.clone()).unwrap_or_default(),
            other_name: other.and_then(|c| c.name.clone()).unwrap_or_default(),
            other_team_id: other.and_then(|c| c.team_id.clone()).unwrap_or_default(),
            payload: serde_json::to_string(event)?,
            seq,
        })
    }

    pub fn to_event(&self) -> anyhow::Result<EnrichedEvent> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}
