// In-process storage for `storage = "memory"`; contents are lost on restart.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::{EventRepository, TeamRepository};
use backend_domain::{
    seconds_to_utc, EnrichedEvent, EventKind, ReportScope, Team, TrackedCharacter, TrackedOutfit,
};

#[derive(Default)]
pub struct MemoryRepo {
    events: RwLock<Vec<EnrichedEvent>>,
    teams: RwLock<Vec<Team>>,
    characters: RwLock<Vec<TrackedCharacter>>,
    outfits: RwLock<Vec<TrackedOutfit>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryRepo {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn append(&self, event: &EnrichedEvent) -> Result<()> {
        seconds_to_utc(event.timestamp())?;
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn query_range(
        &self,
        kind: EventKind,
        scope: &ReportScope,
        start: i64,
        end: i64,
    ) -> Result<Vec<EnrichedEvent>> {
        let events = self.events.read().await;
        let mut matched: Vec<EnrichedEvent> = events
            .iter()
            .filter(|event| event.kind() == kind)
            .filter(|event| (start..=end).contains(&event.timestamp()))
            .filter(|event| event.participants().any(|who| scope.includes(who)))
            .cloned()
            .collect();
        // stable: equal timestamps keep arrival order
        matched.sort_by_key(EnrichedEvent::timestamp);
        Ok(matched)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for MemoryRepo {
    async fn find_team(&self, team_tag: &str) -> Result<Option<Team>> {
        Ok(self
            .teams
            .read()
            .await
            .iter()
            .find(|team| team.team_tag.eq_ignore_ascii_case(team_tag))
            .cloned())
    }

    async fn list_teams(&self) -> Result<Vec<Team>> {
        Ok(self.teams.read().await.clone())
    }

    async fn save_team(&self, team: &Team) -> Result<()> {
        let mut teams = self.teams.write().await;
        teams.retain(|existing| existing.team_id != team.team_id);
        teams.push(team.clone());
        Ok(())
    }

    async fn tracked_characters(&self) -> Result<Vec<TrackedCharacter>> {
        Ok(self.characters.read().await.clone())
    }

    async fn save_tracked_character(&self, character: &TrackedCharacter) -> Result<()> {
        let mut characters = self.characters.write().await;
        characters.retain(|existing| existing.character_id != character.character_id);
        characters.push(character.clone());
        Ok(())
    }

    async fn remove_tracked_character(&self, character_id: &str) -> Result<()> {
        self.characters
            .write()
            .await
            .retain(|existing| existing.character_id != character_id);
        Ok(())
    }

    async fn tracked_outfits(&self) -> Result<Vec<TrackedOutfit>> {
        Ok(self.outfits.read().await.clone())
    }

    async fn save_tracked_outfit(&self, outfit: &TrackedOutfit) -> Result<()> {
        let mut outfits = self.outfits.write().await;
        outfits.retain(|existing| existing.outfit_id != outfit.outfit_id);
        outfits.push(outfit.clone());
        Ok(())
    }

    async fn remove_tracked_outfit(&self, outfit_id: &str) -> Result<()> {
        self.outfits
            .write()
            .await
            .retain(|existing| existing.outfit_id != outfit_id);
        Ok(())
    }
}
