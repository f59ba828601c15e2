use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::debug;

use backend_domain::ports::{CharacterDirectory, OutfitDetails, OutfitMember, PrefetchedCharacter};
use backend_domain::{de_lenient_i64_or_zero, RuntimeConfig};

const OUTFIT_SHOW: &str = "outfit_id,name,alias,member_count,leader_character_id";
const OUTFIT_JOIN: &str = "character^on:leader_character_id^to:character_id^inject_at:leader\
     ^show:faction_id,characters_world^on:leader_character_id^to:character_id\
     ^inject_at:leaders_world^show:world_id";
const MEMBER_JOIN: &str =
    "character^on:character_id^to:character_id^inject_at:character^show:name.first";

const PREFETCH_SHOW: &str = "&c:show=character_id,name,faction_id\
     &c:join=characters_world^inject_at:characters_world^show:world_id";

/// Census REST client for character lookups.
pub struct CensusClient {
    client: Client,
    base_url: String,
    url_budget: usize,
    batch_size: usize,
}

impl CensusClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            base_url: census_base_url(&config.census_api_base, &config.census_service_id),
            url_budget: config.prefetch_url_budget,
            batch_size: config.prefetch_batch_size.max(1),
        })
    }

    async fn get_characters(&self, request: Request) -> Result<Vec<CensusCharacter>> {
        let response: CharacterList = self.get_json(request).await?;
        if let Some(error) = response.error {
            return Err(anyhow!("census error: {}", error));
        }
        Ok(response.character_list)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, request: Request) -> Result<T> {
        Ok(self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .json::<T>()
            .await?)
    }

    fn prefetch_prefix(&self) -> String {
        format!("{}/character/?name.first_lower=", self.base_url)
    }

    /// Checks the service with a zero-row query.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/character/?c:limit=0", self.base_url);
        self.client.get(&url).send().await?.error_for_status()?;
        Ok(())
    }
}

/// Single-character lookup; the id goes through query encoding.
fn name_lookup_request(
    client: &Client,
    base_url: &str,
    character_id: &str,
) -> reqwest::Result<Request> {
    client
        .get(format!("{}/character/", base_url))
        .query(&[("character_id", character_id), ("c:show", "name.first")])
        .build()
}

fn outfit_request(client: &Client, base_url: &str, outfit_tag: &str) -> reqwest::Result<Request> {
    client
        .get(format!("{}/outfit/", base_url))
        .query(&[
            ("alias_lower", outfit_tag.trim().to_lowercase().as_str()),
            ("c:show", OUTFIT_SHOW),
            ("c:join", OUTFIT_JOIN),
        ])
        .build()
}

fn members_request(
    client: &Client,
    base_url: &str,
    outfit_id: &str,
    limit: usize,
) -> reqwest::Result<Request> {
    client
        .get(format!("{}/outfit_member/", base_url))
        .query(&[
            ("outfit_id", outfit_id.to_string()),
            ("c:limit", limit.to_string()),
            ("c:show", "character_id".to_string()),
            ("c:join", MEMBER_JOIN.to_string()),
        ])
        .build()
}

pub fn census_base_url(api_base: &str, service_id: &str) -> String {
    format!(
        "{}/s:{}/get/ps2:v2",
        api_base.trim_end_matches('/'),
        service_id.trim_start_matches("s:")
    )
}

/// Splits lower-cased names into comma-joined batches whose request url
/// (`prefix` + names + fixed suffix) stays under `budget` bytes.
pub fn batch_names(names: &[String], prefix_len: usize, budget: usize, batch_size: usize) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for name in names {
        let name = name.trim().to_lowercase();
        // batches are spliced into the url unencoded
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        let grown = prefix_len + current.len() + name.len() + 1;
        if count > 0 && (grown > budget || count >= batch_size) {
            batches.push(std::mem::take(&mut current));
            count = 0;
        }
        if count > 0 {
            current.push(',');
        }
        current.push_str(&name);
        count += 1;
    }
    if count > 0 {
        batches.push(current);
    }
    batches
}

#[async_trait]
impl CharacterDirectory for CensusClient {
    async fn fetch_character_name(&self, character_id: &str) -> Result<Option<String>> {
        let request = name_lookup_request(&self.client, &self.base_url, character_id)?;
        let characters = self.get_characters(request).await?;
        Ok(characters
            .into_iter()
            .next()
            .and_then(|character| character.name.first))
    }

    async fn prefetch_character_ids(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, PrefetchedCharacter>> {
        let prefix = self.prefetch_prefix();
        let suffix = format!("&c:limit={}{}", self.batch_size, PREFETCH_SHOW);
        let batches = batch_names(
            names,
            prefix.len() + suffix.len(),
            self.url_budget,
            self.batch_size,
        );
        debug!(names = names.len(), batches = batches.len(), "prefetching character ids");
        let requests = batches.iter().map(|batch| {
            let url = format!("{}{}{}", prefix, batch, suffix);
            async move {
                let request = self.client.get(&url).build()?;
                self.get_characters(request).await
            }
        });
        let responses = try_join_all(requests).await?;
        Ok(index_characters(responses.into_iter().flatten()))
    }

    async fn fetch_outfit(&self, outfit_tag: &str) -> Result<Option<OutfitDetails>> {
        let request = outfit_request(&self.client, &self.base_url, outfit_tag)?;
        let response: OutfitList = self.get_json(request).await?;
        if let Some(error) = response.error {
            return Err(anyhow!("census error: {}", error));
        }
        Ok(response.outfit_list.into_iter().find_map(CensusOutfit::into_details))
    }

    async fn fetch_outfit_members(
        &self,
        outfit_id: &str,
        limit: usize,
    ) -> Result<Vec<OutfitMember>> {
        let request = members_request(&self.client, &self.base_url, outfit_id, limit)?;
        let response: OutfitMemberList = self.get_json(request).await?;
        if let Some(error) = response.error {
            return Err(anyhow!("census error: {}", error));
        }
        let members: Vec<OutfitMember> = response
            .outfit_member_list
            .into_iter()
            .filter_map(CensusOutfitMember::into_member)
            .take(limit)
            .collect();
        debug!(outfit_id, members = members.len(), "outfit members fetched");
        Ok(members)
    }
}

fn index_characters(
    characters: impl Iterator<Item = CensusCharacter>,
) -> HashMap<String, PrefetchedCharacter> {
    characters
        .filter_map(|character| {
            let name = character.name.first?;
            let character_id = character.character_id?;
            Some((
                name.to_lowercase(),
                PrefetchedCharacter {
                    character_id,
                    name,
                    faction_id: character.faction_id,
                    world_id: character.characters_world.and_then(|world| world.world_id),
                },
            ))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CharacterList {
    #[serde(default)]
    character_list: Vec<CensusCharacter>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CensusCharacter {
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    name: CensusName,
    #[serde(default)]
    faction_id: Option<String>,
    #[serde(default)]
    characters_world: Option<CensusWorld>,
}

#[derive(Debug, Default, Deserialize)]
struct CensusName {
    #[serde(default)]
    first: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CensusWorld {
    #[serde(default)]
    world_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutfitList {
    #[serde(default)]
    outfit_list: Vec<CensusOutfit>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CensusOutfit {
    #[serde(default)]
    outfit_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_i64_or_zero")]
    member_count: i64,
    #[serde(default)]
    leader: Option<CensusLeader>,
    #[serde(default)]
    leaders_world: Option<CensusWorld>,
}

#[derive(Debug, Deserialize)]
struct CensusLeader {
    #[serde(default)]
    faction_id: Option<String>,
}

impl CensusOutfit {
    fn into_details(self) -> Option<OutfitDetails> {
        let outfit_id = self.outfit_id?;
        let outfit_tag = self.alias.filter(|alias| !alias.is_empty())?;
        Some(OutfitDetails {
            outfit_id,
            outfit_name: self.name.unwrap_or_else(|| outfit_tag.clone()),
            outfit_tag,
            member_count: u64::try_from(self.member_count).unwrap_or(0),
            faction_id: self.leader.and_then(|leader| leader.faction_id),
            world_id: self.leaders_world.and_then(|world| world.world_id),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OutfitMemberList {
    #[serde(default)]
    outfit_member_list: Vec<CensusOutfitMember>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CensusOutfitMember {
    #[serde(default)]
    character_id: Option<String>,
    #[serde(default)]
    character: Option<CensusMemberCharacter>,
}

#[derive(Debug, Deserialize)]
struct CensusMemberCharacter {
    #[serde(default)]
    name: CensusName,
}

impl CensusOutfitMember {
    /// Deleted characters come back without a name and are skipped.
    fn into_member(self) -> Option<OutfitMember> {
        Some(OutfitMember {
            character_id: self.character_id?,
            name: self.character?.name.first?,
        })
    }
}
