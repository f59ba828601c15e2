use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{ReferenceData, SessionReport};

/// Remote character lookups.
#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    /// `Ok(None)` when the id is valid but unknown.
    async fn fetch_character_name(&self, character_id: &str) -> anyhow::Result<Option<String>>;

    /// Bulk name -> id lookup, batched under the configured request budget.
    /// Unknown names are absent from the result; keys are lower-cased names.
    async fn prefetch_character_ids(
        &self,
        names: &[String],
    ) -> anyhow::Result<HashMap<String, PrefetchedCharacter>>;

    /// Outfit lookup by tag, case-insensitive.
    async fn fetch_outfit(&self, outfit_tag: &str) -> anyhow::Result<Option<OutfitDetails>>;

    /// Named members of an outfit, at most `limit` of them.
    async fn fetch_outfit_members(
        &self,
        outfit_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<OutfitMember>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchedCharacter {
    pub character_id: String,
    pub name: String,
    pub faction_id: Option<String>,
    pub world_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitDetails {
    pub outfit_id: String,
    pub outfit_tag: String,
    pub outfit_name: String,
    pub member_count: u64,
    /// Taken from the outfit leader.
    pub faction_id: Option<String>,
    pub world_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitMember {
    pub character_id: String,
    pub name: String,
}

#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn load_reference_data(&self) -> anyhow::Result<ReferenceData>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists a rendered report and returns where it went.
    async fn save_report(&self, file_stem: &str, report: &SessionReport) -> anyhow::Result<String>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
    async fn check_census(&self) -> anyhow::Result<bool>;
}
