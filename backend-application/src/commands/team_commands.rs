use backend_domain::{
    CreateTeamRequest, Team, TrackCharactersRequest, TrackCharactersResponse, TrackOutfitRequest,
    TrackOutfitResponse, TrackedCharacter, TrackedOutfit,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppError, AppState};

const MAX_TEAM_TAG_LEN: usize = 16;
const MAX_TEAM_NAME_LEN: usize = 64;
const MAX_OUTFIT_TAG_LEN: usize = 4;

/// Names and tags are plain ASCII words.
pub fn validate_word(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!(
            "invalid characters in {} '{}'",
            field, trimmed
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_team_name(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    let allowed = |c: char| c.is_ascii_alphanumeric() || " .,;:'()?!".contains(c);
    if trimmed.is_empty() || trimmed.len() > MAX_TEAM_NAME_LEN || !trimmed.chars().all(allowed) {
        return Err(AppError::BadRequest(format!("invalid team name '{}'", trimmed)));
    }
    Ok(trimmed.to_string())
}

pub async fn create_team(state: &AppState, payload: CreateTeamRequest) -> Result<Team, AppError> {
    let team_tag = validate_word(&payload.team_tag, "team_tag")?;
    if team_tag.len() > MAX_TEAM_TAG_LEN {
        return Err(AppError::BadRequest(format!(
            "team_tag must be at most {} characters",
            MAX_TEAM_TAG_LEN
        )));
    }
    let team_name = validate_team_name(&payload.team_name)?;

    if state.team_repo.find_team(&team_tag).await?.is_some() {
        return Err(AppError::BadRequest(format!("team '{}' already exists", team_tag)));
    }
    let team = Team {
        team_id: Uuid::new_v4().to_string(),
        team_tag,
        team_name,
    };
    state.team_repo.save_team(&team).await.map_err(|err| {
        error!("failed to save team: {}", err);
        AppError::Internal(err)
    })?;
    info!(team_tag = %team.team_tag, "team created");
    Ok(team)
}

pub(crate) async fn require_team(state: &AppState, team_tag: &str) -> Result<Team, AppError> {
    let team_tag = team_tag.trim();
    state
        .team_repo
        .find_team(team_tag)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("team '{}'", team_tag)))
}

/// Resolves names in bulk and assigns them to the team. Later events carry the
/// new attribution; stored events keep theirs.
pub async fn track_characters(
    state: &AppState,
    team_tag: &str,
    payload: TrackCharactersRequest,
) -> Result<TrackCharactersResponse, AppError> {
    let team = require_team(state, team_tag).await?;

    let mut names = Vec::with_capacity(payload.names.len());
    for name in &payload.names {
        let name = validate_word(name, "character name")?;
        if !names.iter().any(|existing: &String| existing.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    if names.is_empty() {
        return Err(AppError::BadRequest("names must not be empty".to_string()));
    }

    let found = state
        .directory
        .prefetch_character_ids(&names)
        .await
        .map_err(|err| {
            error!("character prefetch failed: {}", err);
            AppError::Internal(err)
        })?;

    let mut tracked = Vec::new();
    let mut missing = Vec::new();
    for name in names {
        let Some(character) = found.get(&name.to_lowercase()) else {
            missing.push(name);
            continue;
        };
        let row = TrackedCharacter {
            character_id: character.character_id.clone(),
            name: character.name.clone(),
            team_id: team.team_id.clone(),
            faction: character
                .faction_id
                .as_deref()
                .and_then(|id| state.reference.faction(id)),
            server: character
                .world_id
                .as_deref()
                .and_then(|id| state.reference.world(id)),
        };
        state.team_repo.save_tracked_character(&row).await?;
        state.resolver.track(&row).await;
        tracked.push(row);
    }
    info!(
        team_tag = %team.team_tag,
        tracked = tracked.len(),
        missing = missing.len(),
        "characters tracked"
    );
    Ok(TrackCharactersResponse {
        team,
        tracked,
        missing,
    })
}

/// Assigns an outfit to a team. Every current member is attributed to the
/// team from now on; outfits above the member limit are refused.
pub async fn track_outfit(
    state: &AppState,
    team_tag: &str,
    payload: TrackOutfitRequest,
) -> Result<TrackOutfitResponse, AppError> {
    let team = require_team(state, team_tag).await?;
    let outfit_tag = validate_word(&payload.outfit_tag, "outfit_tag")?;
    if outfit_tag.len() > MAX_OUTFIT_TAG_LEN {
        return Err(AppError::BadRequest(format!(
            "outfit_tag must be at most {} characters",
            MAX_OUTFIT_TAG_LEN
        )));
    }

    let details = state
        .directory
        .fetch_outfit(&outfit_tag)
        .await
        .map_err(|err| {
            error!(outfit_tag = %outfit_tag, "outfit lookup failed: {}", err);
            AppError::Internal(err)
        })?
        .ok_or_else(|| AppError::NotFound(format!("outfit '{}'", outfit_tag)))?;

    let limit = state.config.max_outfit_members;
    if details.member_count > limit as u64 {
        return Err(AppError::BadRequest(format!(
            "outfit '{}' has {} members, more than the {} that can be tracked",
            details.outfit_tag, details.member_count, limit
        )));
    }
    let existing = state.team_repo.tracked_outfits().await?;
    let taken = existing
        .iter()
        .find(|tracked| tracked.outfit_id == details.outfit_id && tracked.team_id != team.team_id);
    if let Some(other) = taken {
        return Err(AppError::BadRequest(format!(
            "outfit '{}' is already assigned to a team",
            other.outfit_tag
        )));
    }

    let members = state
        .directory
        .fetch_outfit_members(&details.outfit_id, limit)
        .await
        .map_err(|err| {
            error!(outfit_tag = %details.outfit_tag, "outfit member lookup failed: {}", err);
            AppError::Internal(err)
        })?;

    let outfit = TrackedOutfit {
        outfit_id: details.outfit_id.clone(),
        outfit_tag: details.outfit_tag.clone(),
        outfit_name: details.outfit_name.clone(),
        team_id: team.team_id.clone(),
        member_count: details.member_count,
        faction: details
            .faction_id
            .as_deref()
            .and_then(|id| state.reference.faction(id)),
        server: details
            .world_id
            .as_deref()
            .and_then(|id| state.reference.world(id)),
    };
    state.team_repo.save_tracked_outfit(&outfit).await?;
    let seeded = state
        .resolver
        .seed_outfit(&outfit.outfit_id, &team.team_id, &members)
        .await;
    info!(
        team_tag = %team.team_tag,
        outfit_tag = %outfit.outfit_tag,
        members = seeded,
        "outfit tracked"
    );
    Ok(TrackOutfitResponse {
        team,
        outfit,
        members: seeded,
    })
}

/// Removes a named character from a team. Stored events keep the team they
/// were written with.
pub async fn untrack_character(
    state: &AppState,
    team_tag: &str,
    name: &str,
) -> Result<TrackedCharacter, AppError> {
    let team = require_team(state, team_tag).await?;
    let name = validate_word(name, "character name")?;
    let removed = state
        .team_repo
        .tracked_characters()
        .await?
        .into_iter()
        .find(|tracked| {
            tracked.team_id == team.team_id && tracked.name.eq_ignore_ascii_case(&name)
        })
        .ok_or_else(|| {
            AppError::NotFound(format!("character '{}' in team '{}'", name, team.team_tag))
        })?;
    state
        .team_repo
        .remove_tracked_character(&removed.character_id)
        .await?;
    state.resolver.untrack(&removed.character_id).await;
    info!(team_tag = %team.team_tag, character = %removed.name, "character untracked");
    Ok(removed)
}

pub async fn untrack_outfit(
    state: &AppState,
    team_tag: &str,
    outfit_tag: &str,
) -> Result<TrackedOutfit, AppError> {
    let team = require_team(state, team_tag).await?;
    let outfit_tag = validate_word(outfit_tag, "outfit_tag")?;
    let removed = state
        .team_repo
        .tracked_outfits()
        .await?
        .into_iter()
        .find(|tracked| {
            tracked.team_id == team.team_id && tracked.outfit_tag.eq_ignore_ascii_case(&outfit_tag)
        })
        .ok_or_else(|| {
            AppError::NotFound(format!("outfit '{}' in team '{}'", outfit_tag, team.team_tag))
        })?;
    state.team_repo.remove_tracked_outfit(&removed.outfit_id).await?;
    state.resolver.untrack_outfit(&removed.outfit_id).await;
    info!(team_tag = %team.team_tag, outfit_tag = %removed.outfit_tag, "outfit untracked");
    Ok(removed)
}

/// Loads tracked characters and current outfit members into the resolver.
/// An outfit whose members cannot be fetched is skipped with a warning.
pub async fn seed_resolver(state: &AppState) -> Result<usize, AppError> {
    let tracked = state.team_repo.tracked_characters().await?;
    let mut seeded = state.resolver.seed(&tracked).await;
    let limit = state.config.max_outfit_members;
    for outfit in state.team_repo.tracked_outfits().await? {
        match state.directory.fetch_outfit_members(&outfit.outfit_id, limit).await {
            Ok(members) => {
                seeded += state
                    .resolver
                    .seed_outfit(&outfit.outfit_id, &outfit.team_id, &members)
                    .await;
            }
            Err(err) => {
                warn!(outfit_tag = %outfit.outfit_tag, "skipping outfit members: {}", err);
            }
        }
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ingest_commands::ingest_payloads;
    use crate::testing::{harness, FakeDirectory};
    use backend_domain::ReferenceData;
    use serde_json::json;

    fn reference() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.factions.insert("1".into(), "VS".into());
        data.worlds.insert("17".into(), "Emerald".into());
        data
    }

    #[tokio::test]
    async fn team_tags_are_unique_case_insensitively() {
        let h = harness(FakeDirectory::default(), reference());
        let team = create_team(
            &h.state,
            CreateTeamRequest {
                team_tag: "WFAT".into(),
                team_name: "Wolfpack".into(),
            },
        )
        .await
        .unwrap();
        assert!(Uuid::parse_str(&team.team_id).is_ok());
        let duplicate = create_team(
            &h.state,
            CreateTeamRequest {
                team_tag: "wfat".into(),
                team_name: "Other".into(),
            },
        )
        .await;
        assert!(matches!(duplicate, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn rejects_non_alphanumeric_input() {
        let h = harness(FakeDirectory::default(), reference());
        let result = create_team(
            &h.state,
            CreateTeamRequest {
                team_tag: "W'; DROP".into(),
                team_name: "x".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn tracking_updates_store_and_resolver() {
        let h = harness(
            FakeDirectory::with_names(&[("100000001", "Alice")]),
            reference(),
        );
        create_team(
            &h.state,
            CreateTeamRequest {
                team_tag: "WFAT".into(),
                team_name: "Wolfpack".into(),
            },
        )
        .await
        .unwrap();
        let response = track_characters(
            &h.state,
            "wfat",
            TrackCharactersRequest {
                names: vec!["alice".into(), "Ghost".into(), "ALICE".into()],
            },
        )
        .await
        .unwrap();
        assert_eq!(response.tracked.len(), 1);
        assert_eq!(response.missing, vec!["Ghost".to_string()]);
        assert_eq!(response.tracked[0].faction.as_deref(), Some("VS"));
        assert_eq!(response.tracked[0].server.as_deref(), Some("Emerald"));
        assert_eq!(h.teams.characters.lock().unwrap().len(), 1);
        assert_eq!(
            h.state.resolver.team_of("100000001").await,
            Some(response.team.team_id.clone())
        );
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let h = harness(FakeDirectory::default(), reference());
        let result = track_characters(
            &h.state,
            "NOPE",
            TrackCharactersRequest {
                names: vec!["alice".into()],
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    async fn wolfpack(state: &AppState) -> Team {
        create_team(
            state,
            CreateTeamRequest {
                team_tag: "WFAT".into(),
                team_name: "Wolfpack".into(),
            },
        )
        .await
        .unwrap()
    }

    fn outfit_directory() -> FakeDirectory {
        FakeDirectory::with_names(&[("100000001", "Alice")]).with_outfit(
            "37509488620604883",
            "VCBC",
            &[("100000013", "Frank"), ("100000015", "Grace")],
        )
    }

    fn experience(ts: &str, character_id: &str) -> serde_json::Value {
        json!({"event_name": "GainExperience", "timestamp": ts, "character_id": character_id,
               "other_id": "0", "experience_id": "1", "amount": "100", "loadout_id": "4"})
    }

    #[tokio::test]
    async fn tracking_an_outfit_attributes_every_member() {
        let h = harness(outfit_directory(), reference());
        let team = wolfpack(&h.state).await;
        let response = track_outfit(
            &h.state,
            "wfat",
            TrackOutfitRequest {
                outfit_tag: "vcbc".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.members, 2);
        assert_eq!(response.outfit.outfit_tag, "VCBC");
        assert_eq!(response.outfit.faction.as_deref(), Some("VS"));
        assert_eq!(response.outfit.server.as_deref(), Some("Emerald"));
        assert_eq!(h.teams.outfits.lock().unwrap().len(), 1);
        for member in ["100000013", "100000015"] {
            assert_eq!(h.state.resolver.team_of(member).await, Some(team.team_id.clone()));
        }
        assert_eq!(
            h.state.resolver.cached_name("100000015").await.as_deref(),
            Some("Grace")
        );
    }

    #[tokio::test]
    async fn oversized_unknown_and_taken_outfits_are_refused() {
        let mut h = harness(outfit_directory(), reference());
        wolfpack(&h.state).await;
        create_team(
            &h.state,
            CreateTeamRequest {
                team_tag: "BLUE".into(),
                team_name: "Blue".into(),
            },
        )
        .await
        .unwrap();
        let request = |tag: &str| TrackOutfitRequest {
            outfit_tag: tag.into(),
        };

        let unknown = track_outfit(&h.state, "WFAT", request("NONE")).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        let long_tag = track_outfit(&h.state, "WFAT", request("TOOLONG")).await;
        assert!(matches!(long_tag, Err(AppError::BadRequest(_))));

        track_outfit(&h.state, "WFAT", request("VCBC")).await.unwrap();
        let taken = track_outfit(&h.state, "BLUE", request("VCBC")).await;
        assert!(matches!(taken, Err(AppError::BadRequest(_))));
        // re-tracking for the same team refreshes the assignment
        track_outfit(&h.state, "WFAT", request("VCBC")).await.unwrap();
        assert_eq!(h.teams.outfits.lock().unwrap().len(), 1);

        h.teams.outfits.lock().unwrap().clear();
        h.state.config.max_outfit_members = 1;
        let zerg = track_outfit(&h.state, "WFAT", request("VCBC")).await;
        assert!(matches!(zerg, Err(AppError::BadRequest(_))));
        assert!(h.teams.outfits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn untracking_an_outfit_keeps_written_attribution() {
        let h = harness(outfit_directory(), reference());
        let team = wolfpack(&h.state).await;
        track_outfit(
            &h.state,
            "WFAT",
            TrackOutfitRequest {
                outfit_tag: "VCBC".into(),
            },
        )
        .await
        .unwrap();
        ingest_payloads(&h.state, vec![experience("100", "100000013")]).await;

        let removed = untrack_outfit(&h.state, "wfat", "vcbc").await.unwrap();
        assert_eq!(removed.outfit_id, "37509488620604883");
        assert!(h.teams.outfits.lock().unwrap().is_empty());
        ingest_payloads(&h.state, vec![experience("200", "100000013")]).await;

        let stored = h.events.stored();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].subject().team_id, Some(team.team_id.clone()));
        assert_eq!(stored[1].subject().team_id, None);

        let again = untrack_outfit(&h.state, "WFAT", "VCBC").await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn untracking_a_character_detaches_it_from_the_team() {
        let h = harness(outfit_directory(), reference());
        wolfpack(&h.state).await;
        track_characters(
            &h.state,
            "WFAT",
            TrackCharactersRequest {
                names: vec!["Alice".into()],
            },
        )
        .await
        .unwrap();

        let removed = untrack_character(&h.state, "WFAT", "ALICE").await.unwrap();
        assert_eq!(removed.character_id, "100000001");
        assert!(h.teams.characters.lock().unwrap().is_empty());
        assert_eq!(h.state.resolver.team_of("100000001").await, None);

        let again = untrack_character(&h.state, "WFAT", "Alice").await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn startup_seeding_refetches_outfit_members() {
        let h = harness(outfit_directory(), reference());
        h.teams.characters.lock().unwrap().push(TrackedCharacter {
            character_id: "100000001".into(),
            name: "Alice".into(),
            team_id: "t-1".into(),
            faction: None,
            server: None,
        });
        h.teams.outfits.lock().unwrap().push(TrackedOutfit {
            outfit_id: "37509488620604883".into(),
            outfit_tag: "VCBC".into(),
            outfit_name: "VCBC outfit".into(),
            team_id: "t-1".into(),
            member_count: 2,
            faction: None,
            server: None,
        });
        assert_eq!(seed_resolver(&h.state).await.unwrap(), 3);
        assert_eq!(h.state.resolver.team_of("100000015").await.as_deref(), Some("t-1"));

        let h = harness(outfit_directory(), reference());
        h.teams.outfits.lock().unwrap().push(TrackedOutfit {
            outfit_id: "37509488620604883".into(),
            outfit_tag: "VCBC".into(),
            outfit_name: "VCBC outfit".into(),
            team_id: "t-1".into(),
            member_count: 2,
            faction: None,
            server: None,
        });
        h.directory.fail_all(true);
        assert_eq!(seed_resolver(&h.state).await.unwrap(), 0);
    }
}
