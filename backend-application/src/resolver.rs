// Character name resolver
//
// Cache-aside over the remote character directory. The cache lock is never held
// across the remote call, so two concurrent misses for one id may both fetch;
// the last write wins and both callers see a valid name.
//
// Team membership comes from two sources. Characters tracked by name win over
// outfit membership, so dropping an outfit never detaches a named character.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use backend_domain::ports::{CharacterDirectory, OutfitMember};
use backend_domain::{CharacterId, CharacterRef, TrackedCharacter};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::Metrics;

pub struct CharacterNameResolver {
    directory: Arc<dyn CharacterDirectory>,
    metrics: Arc<Metrics>,
    names: RwLock<HashMap<String, String>>,
    teams: RwLock<HashMap<String, String>>,
    outfits: RwLock<HashMap<String, OutfitTeam>>,
}

struct OutfitTeam {
    team_id: String,
    members: HashSet<String>,
}

impl CharacterNameResolver {
    pub fn new(directory: Arc<dyn CharacterDirectory>, metrics: Arc<Metrics>) -> Self {
        Self {
            directory,
            metrics,
            names: RwLock::new(HashMap::new()),
            teams: RwLock::new(HashMap::new()),
            outfits: RwLock::new(HashMap::new()),
        }
    }

    /// Name for a player id. Non-player ids are rejected without side effects;
    /// failed lookups are not cached.
    pub async fn resolve(&self, character_id: &str) -> Option<String> {
        let id = CharacterId::new(character_id.trim());
        if !id.is_player() {
            return None;
        }
        let cached = self.names.read().await.get(id.as_str()).cloned();
        if let Some(name) = cached {
            self.metrics.record_cache_hit();
            return Some(name);
        }

        match self.directory.fetch_character_name(id.as_str()).await {
            Ok(Some(name)) => {
                self.metrics.record_name_lookup(true);
                self.names
                    .write()
                    .await
                    .insert(id.as_str().to_string(), name.clone());
                Some(name)
            }
            Ok(None) => {
                self.metrics.record_name_lookup(false);
                debug!(character_id = id.as_str(), "character not found");
                None
            }
            Err(err) => {
                self.metrics.record_name_lookup(false);
                warn!(character_id = id.as_str(), "character lookup failed: {}", err);
                None
            }
        }
    }

    /// Team membership as currently known.
    pub async fn team_of(&self, character_id: &str) -> Option<String> {
        let id = character_id.trim();
        if let Some(team_id) = self.teams.read().await.get(id) {
            return Some(team_id.clone());
        }
        self.outfits
            .read()
            .await
            .values()
            .find(|outfit| outfit.members.contains(id))
            .map(|outfit| outfit.team_id.clone())
    }

    /// Resolved participant with a team snapshot taken now.
    pub async fn character_ref(&self, character_id: &str) -> CharacterRef {
        let id = character_id.trim().to_string();
        if !CharacterId::new(id.as_str()).is_player() {
            return CharacterRef {
                id,
                name: None,
                team_id: None,
            };
        }
        let name = self.resolve(&id).await;
        let team_id = self.team_of(&id).await;
        CharacterRef { id, name, team_id }
    }

    /// Seeds names and team membership, returning how many entries were added.
    pub async fn seed(&self, tracked: &[TrackedCharacter]) -> usize {
        let mut names = self.names.write().await;
        let mut teams = self.teams.write().await;
        for character in tracked {
            names.insert(character.character_id.clone(), character.name.clone());
            teams.insert(character.character_id.clone(), character.team_id.clone());
        }
        tracked.len()
    }

    pub async fn track(&self, character: &TrackedCharacter) {
        self.seed(std::slice::from_ref(character)).await;
    }

    /// Drops a named character's team entry; its cached name stays.
    pub async fn untrack(&self, character_id: &str) -> bool {
        self.teams.write().await.remove(character_id.trim()).is_some()
    }

    /// Replaces the member set of one outfit and caches their names.
    pub async fn seed_outfit(
        &self,
        outfit_id: &str,
        team_id: &str,
        members: &[OutfitMember],
    ) -> usize {
        {
            let mut names = self.names.write().await;
            for member in members {
                names.insert(member.character_id.clone(), member.name.clone());
            }
        }
        let entry = OutfitTeam {
            team_id: team_id.to_string(),
            members: members
                .iter()
                .map(|member| member.character_id.clone())
                .collect(),
        };
        let count = entry.members.len();
        self.outfits.write().await.insert(outfit_id.to_string(), entry);
        count
    }

    pub async fn untrack_outfit(&self, outfit_id: &str) -> bool {
        self.outfits.write().await.remove(outfit_id).is_some()
    }

    pub async fn cached_name(&self, character_id: &str) -> Option<String> {
        self.names.read().await.get(character_id).cloned()
    }

    pub async fn cache_len(&self) -> usize {
        self.names.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDirectory;

    fn resolver(directory: Arc<FakeDirectory>) -> CharacterNameResolver {
        CharacterNameResolver::new(directory, Arc::new(Metrics::default()))
    }

    #[tokio::test]
    async fn second_resolution_is_served_from_cache() {
        let directory = Arc::new(FakeDirectory::with_names(&[("100000001", "Alice")]));
        let resolver = resolver(directory.clone());
        assert_eq!(resolver.resolve("100000001").await.as_deref(), Some("Alice"));
        assert_eq!(resolver.resolve("100000001").await.as_deref(), Some("Alice"));
        assert_eq!(directory.calls(), 1);
    }

    #[tokio::test]
    async fn even_ids_never_reach_the_directory() {
        let directory = Arc::new(FakeDirectory::with_names(&[("100000000", "Turret")]));
        let resolver = resolver(directory.clone());
        assert_eq!(resolver.resolve("100000000").await, None);
        assert_eq!(resolver.resolve("0").await, None);
        assert_eq!(directory.calls(), 0);
        assert_eq!(resolver.cache_len().await, 0);
    }

    #[tokio::test]
    async fn misses_and_failures_are_retried() {
        let directory = Arc::new(FakeDirectory::with_names(&[]));
        let resolver = resolver(directory.clone());
        assert_eq!(resolver.resolve("100000003").await, None);
        directory.insert("100000003", "Bob");
        assert_eq!(resolver.resolve("100000003").await.as_deref(), Some("Bob"));
        assert_eq!(directory.calls(), 2);

        directory.fail_all(true);
        assert_eq!(resolver.resolve("100000005").await, None);
        assert_eq!(resolver.cached_name("100000005").await, None);
    }

    #[tokio::test]
    async fn concurrent_misses_settle_on_one_name() {
        let directory = Arc::new(FakeDirectory::with_names(&[("100000007", "Carol")]));
        let resolver = resolver(directory.clone());
        let (a, b) = tokio::join!(resolver.resolve("100000007"), resolver.resolve("100000007"));
        assert_eq!(a.as_deref(), Some("Carol"));
        assert_eq!(b.as_deref(), Some("Carol"));
        assert!((1..=2).contains(&directory.calls()));
        assert_eq!(resolver.cache_len().await, 1);
    }

    #[tokio::test]
    async fn seeded_characters_carry_team_snapshots() {
        let directory = Arc::new(FakeDirectory::with_names(&[]));
        let resolver = resolver(directory.clone());
        resolver
            .seed(&[TrackedCharacter {
                character_id: "100000009".into(),
                name: "Dave".into(),
                team_id: "team-a".into(),
                faction: None,
                server: None,
            }])
            .await;
        let character = resolver.character_ref("100000009").await;
        assert_eq!(character.name.as_deref(), Some("Dave"));
        assert_eq!(character.team_id.as_deref(), Some("team-a"));
        assert_eq!(directory.calls(), 0);

        let npc = resolver.character_ref("100000000").await;
        assert_eq!(npc.name, None);
        assert_eq!(npc.team_id, None);
    }

    fn member(id: &str, name: &str) -> OutfitMember {
        OutfitMember {
            character_id: id.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn outfit_members_follow_the_outfit_until_it_is_dropped() {
        let directory = Arc::new(FakeDirectory::with_names(&[]));
        let resolver = resolver(directory.clone());
        resolver
            .seed(&[TrackedCharacter {
                character_id: "100000011".into(),
                name: "Erin".into(),
                team_id: "team-b".into(),
                faction: None,
                server: None,
            }])
            .await;
        let seeded = resolver
            .seed_outfit(
                "37509488620604883",
                "team-a",
                &[member("100000013", "Frank"), member("100000011", "Erin")],
            )
            .await;
        assert_eq!(seeded, 2);
        assert_eq!(resolver.resolve("100000013").await.as_deref(), Some("Frank"));
        assert_eq!(directory.calls(), 0);
        assert_eq!(resolver.team_of("100000013").await.as_deref(), Some("team-a"));
        // named tracking wins over outfit membership
        assert_eq!(resolver.team_of("100000011").await.as_deref(), Some("team-b"));

        assert!(resolver.untrack_outfit("37509488620604883").await);
        assert_eq!(resolver.team_of("100000013").await, None);
        assert_eq!(resolver.team_of("100000011").await.as_deref(), Some("team-b"));

        assert!(resolver.untrack("100000011").await);
        assert!(!resolver.untrack("100000011").await);
        assert_eq!(resolver.team_of("100000011").await, None);
        assert_eq!(resolver.cached_name("100000011").await.as_deref(), Some("Erin"));
    }
}
