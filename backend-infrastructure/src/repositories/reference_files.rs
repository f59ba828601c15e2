// Reference tables loaded from the api-maps directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{info, warn};

use backend_domain::ports::ReferenceSource;
use backend_domain::ReferenceData;

pub struct ReferenceFiles {
    dir: PathBuf,
}

impl ReferenceFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// First existing candidate wins; no candidate means an empty table.
    async fn load_table<T: DeserializeOwned>(&self, candidates: &[&str]) -> Result<HashMap<String, T>> {
        for name in candidates {
            let path = self.dir.join(name);
            if !path.exists() {
                continue;
            }
            return read_map(&path).await;
        }
        warn!(
            dir = %self.dir.display(),
            file = candidates.first().copied().unwrap_or_default(),
            "reference map missing, lookups will return null"
        );
        Ok(HashMap::new())
    }
}

async fn read_map<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let table = serde_json::from_str::<HashMap<String, T>>(&content)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(table)
}

#[async_trait]
impl ReferenceSource for ReferenceFiles {
    async fn load_reference_data(&self) -> Result<ReferenceData> {
        let data = ReferenceData {
            factions: self.load_table(&["faction-map.json"]).await?,
            loadouts: self.load_table(&["loadout-map.json"]).await?,
            vehicles: self.load_table(&["vehicle-map.json"]).await?,
            items: self.load_table(&["item-map.json"]).await?,
            skills: self.load_table(&["skill-map.json"]).await?,
            zones: self.load_table(&["zone-map.json"]).await?,
            facilities: self.load_table(&["region-map.json"]).await?,
            worlds: self.load_table(&["world-map.json"]).await?,
            experiences: self.load_table(&["experience-map.json"]).await?,
            vehicle_activity: self
                .load_table(&["vehicle-activity-map.json", "vehicle-activity-events.json"])
                .await?,
        };
        for (table, size) in data.table_sizes() {
            info!(table, size, "reference table loaded");
        }
        Ok(data)
    }
}
