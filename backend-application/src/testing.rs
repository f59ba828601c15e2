// Hand-written port fakes shared by the unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use backend_domain::ports::{
    CharacterDirectory, EventRepository, HealthCheckService, OutfitDetails, OutfitMember,
    PrefetchedCharacter, ReportSink, TeamRepository,
};
use backend_domain::{
    EnrichedEvent, EventKind, IngestFilter, ReconstructionConfig, ReferenceData, ReportScope,
    RuntimeConfig, SessionReport, Team, TrackedCharacter, TrackedOutfit,
};

use crate::{AppState, CharacterNameResolver, Metrics};

#[derive(Default)]
pub struct FakeDirectory {
    names: Mutex<HashMap<String, String>>,
    outfits: Mutex<Vec<(OutfitDetails, Vec<OutfitMember>)>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeDirectory {
    pub fn with_names(names: &[(&str, &str)]) -> Self {
        let directory = Self::default();
        for (id, name) in names {
            directory.insert(id, name);
        }
        directory
    }

    pub fn insert(&self, id: &str, name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
    }

    /// Registers an outfit whose member count is the member list length.
    pub fn with_outfit(self, outfit_id: &str, tag: &str, members: &[(&str, &str)]) -> Self {
        let members: Vec<OutfitMember> = members
            .iter()
            .map(|(id, name)| OutfitMember {
                character_id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        let details = OutfitDetails {
            outfit_id: outfit_id.to_string(),
            outfit_tag: tag.to_string(),
            outfit_name: format!("{} outfit", tag),
            member_count: members.len() as u64,
            faction_id: Some("1".into()),
            world_id: Some("17".into()),
        };
        self.outfits.lock().unwrap().push((details, members));
        self
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CharacterDirectory for FakeDirectory {
    async fn fetch_character_name(&self, character_id: &str) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("census unavailable"));
        }
        Ok(self.names.lock().unwrap().get(character_id).cloned())
    }

    async fn prefetch_character_ids(
        &self,
        names: &[String],
    ) -> anyhow::Result<HashMap<String, PrefetchedCharacter>> {
        let known = self.names.lock().unwrap();
        Ok(names
            .iter()
            .filter_map(|wanted| {
                known
                    .iter()
                    .find(|(_, name)| name.eq_ignore_ascii_case(wanted))
                    .map(|(id, name)| {
                        (
                            name.to_lowercase(),
                            PrefetchedCharacter {
                                character_id: id.clone(),
                                name: name.clone(),
                                faction_id: Some("1".into()),
                                world_id: Some("17".into()),
                            },
                        )
                    })
            })
            .collect())
    }

    async fn fetch_outfit(&self, outfit_tag: &str) -> anyhow::Result<Option<OutfitDetails>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("census unavailable"));
        }
        Ok(self
            .outfits
            .lock()
            .unwrap()
            .iter()
            .find(|(details, _)| details.outfit_tag.eq_ignore_ascii_case(outfit_tag))
            .map(|(details, _)| details.clone()))
    }

    async fn fetch_outfit_members(
        &self,
        outfit_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<OutfitMember>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("census unavailable"));
        }
        Ok(self
            .outfits
            .lock()
            .unwrap()
            .iter()
            .find(|(details, _)| details.outfit_id == outfit_id)
            .map(|(_, members)| members.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeEventRepo {
    pub events: Mutex<Vec<EnrichedEvent>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FakeEventRepo {
    pub fn stored(&self) -> Vec<EnrichedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for FakeEventRepo {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn append(&self, event: &EnrichedEvent) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("disk full"));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn query_range(
        &self,
        kind: EventKind,
        scope: &ReportScope,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<EnrichedEvent>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        let mut rows: Vec<EnrichedEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind() == kind)
            .filter(|event| (start..=end).contains(&event.timestamp()))
            .filter(|event| event.participants().any(|who| scope.includes(who)))
            .cloned()
            .collect();
        rows.sort_by_key(EnrichedEvent::timestamp);
        Ok(rows)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTeamRepo {
    pub teams: Mutex<Vec<Team>>,
    pub characters: Mutex<Vec<TrackedCharacter>>,
    pub outfits: Mutex<Vec<TrackedOutfit>>,
}

#[async_trait]
impl TeamRepository for FakeTeamRepo {
    async fn find_team(&self, team_tag: &str) -> anyhow::Result<Option<Team>> {
        Ok(self
            .teams
            .lock()
            .unwrap()
            .iter()
            .find(|team| team.team_tag.eq_ignore_ascii_case(team_tag))
            .cloned())
    }

    async fn list_teams(&self) -> anyhow::Result<Vec<Team>> {
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn save_team(&self, team: &Team) -> anyhow::Result<()> {
        self.teams.lock().unwrap().push(team.clone());
        Ok(())
    }

    async fn tracked_characters(&self) -> anyhow::Result<Vec<TrackedCharacter>> {
        Ok(self.characters.lock().unwrap().clone())
    }

    async fn save_tracked_character(&self, character: &TrackedCharacter) -> anyhow::Result<()> {
        let mut characters = self.characters.lock().unwrap();
        characters.retain(|existing| existing.character_id != character.character_id);
        characters.push(character.clone());
        Ok(())
    }

    async fn remove_tracked_character(&self, character_id: &str) -> anyhow::Result<()> {
        self.characters
            .lock()
            .unwrap()
            .retain(|existing| existing.character_id != character_id);
        Ok(())
    }

    async fn tracked_outfits(&self) -> anyhow::Result<Vec<TrackedOutfit>> {
        Ok(self.outfits.lock().unwrap().clone())
    }

    async fn save_tracked_outfit(&self, outfit: &TrackedOutfit) -> anyhow::Result<()> {
        let mut outfits = self.outfits.lock().unwrap();
        outfits.retain(|existing| existing.outfit_id != outfit.outfit_id);
        outfits.push(outfit.clone());
        Ok(())
    }

    async fn remove_tracked_outfit(&self, outfit_id: &str) -> anyhow::Result<()> {
        self.outfits
            .lock()
            .unwrap()
            .retain(|existing| existing.outfit_id != outfit_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeReportSink {
    pub saved: Mutex<Vec<String>>,
}

#[async_trait]
impl ReportSink for FakeReportSink {
    async fn save_report(&self, file_stem: &str, _report: &SessionReport) -> anyhow::Result<String> {
        let path = format!("reports/{}.json", file_stem);
        self.saved.lock().unwrap().push(path.clone());
        Ok(path)
    }
}

pub struct FakeHealth;

#[async_trait]
impl HealthCheckService for FakeHealth {
    async fn check_database(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn check_census(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

pub struct Harness {
    pub state: AppState,
    pub directory: Arc<FakeDirectory>,
    pub events: Arc<FakeEventRepo>,
    pub teams: Arc<FakeTeamRepo>,
    pub reports: Arc<FakeReportSink>,
}

pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".into(),
        api_token: None,
        report_dir: "reports".into(),
        census_service_id: "example".into(),
        census_api_base: "https://census.invalid".into(),
        census_stream_url: "wss://push.invalid/streaming".into(),
        stream_enabled: false,
        stream_worlds: vec!["17".into()],
        stream_event_names: vec!["Death".into()],
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 10,
        prefetch_url_budget: 1800,
        prefetch_batch_size: 200,
        max_report_minutes: 1440,
        max_outfit_members: 1000,
        ingest: IngestFilter {
            non_scoring_zone_ids: vec![95, 96, 97, 98, 361, 364],
        },
        reconstruction: ReconstructionConfig::default(),
    }
}

pub fn harness(directory: FakeDirectory, reference: ReferenceData) -> Harness {
    let directory = Arc::new(directory);
    let events = Arc::new(FakeEventRepo::default());
    let teams = Arc::new(FakeTeamRepo::default());
    let reports = Arc::new(FakeReportSink::default());
    let metrics = Arc::new(Metrics::default());
    let resolver = Arc::new(CharacterNameResolver::new(directory.clone(), metrics.clone()));
    let state = AppState {
        config: runtime_config(),
        reference: Arc::new(reference),
        event_repo: events.clone(),
        team_repo: teams.clone(),
        directory: directory.clone(),
        report_sink: reports.clone(),
        health: Arc::new(FakeHealth),
        resolver,
        metrics,
    };
    Harness {
        state,
        directory,
        events,
        teams,
        reports,
    }
}
