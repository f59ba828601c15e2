use async_trait::async_trait;

use crate::entities::{
    EnrichedEvent, EventKind, ReportScope, Team, TrackedCharacter, TrackedOutfit,
};

/// Append-only enriched event log.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn append(&self, event: &EnrichedEvent) -> anyhow::Result<()>;
    /// Events of `kind` with any participant in `scope` and a timestamp in the
    /// closed window `[start, end]`, ordered by timestamp ascending.
    async fn query_range(
        &self,
        kind: EventKind,
        scope: &ReportScope,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<EnrichedEvent>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Case-insensitive lookup by tag.
    async fn find_team(&self, team_tag: &str) -> anyhow::Result<Option<Team>>;
    async fn list_teams(&self) -> anyhow::Result<Vec<Team>>;
    async fn save_team(&self, team: &Team) -> anyhow::Result<()>;
    async fn tracked_characters(&self) -> anyhow::Result<Vec<TrackedCharacter>>;
    async fn save_tracked_character(&self, character: &TrackedCharacter) -> anyhow::Result<()>;
    async fn remove_tracked_character(&self, character_id: &str) -> anyhow::Result<()>;
    async fn tracked_outfits(&self) -> anyhow::Result<Vec<TrackedOutfit>>;
    /// One row per outfit id; saving again replaces the assignment.
    async fn save_tracked_outfit(&self, outfit: &TrackedOutfit) -> anyhow::Result<()>;
    async fn remove_tracked_outfit(&self, outfit_id: &str) -> anyhow::Result<()>;
}
