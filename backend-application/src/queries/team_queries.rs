use backend_domain::{Team, TeamRoster};
use tracing::error;

use crate::commands::team_commands::require_team;
use crate::{AppError, AppState};

pub async fn list_teams(state: &AppState) -> Result<Vec<Team>, AppError> {
    let mut teams = state.team_repo.list_teams().await.map_err(|err| {
        error!("failed to list teams: {}", err);
        AppError::Internal(err)
    })?;
    teams.sort_by_key(|team| team.team_tag.to_lowercase());
    Ok(teams)
}

/// Characters and outfits assigned to one team, sorted by name and tag.
pub async fn team_roster(state: &AppState, team_tag: &str) -> Result<TeamRoster, AppError> {
    let team = require_team(state, team_tag).await?;
    let mut characters: Vec<_> = state
        .team_repo
        .tracked_characters()
        .await?
        .into_iter()
        .filter(|character| character.team_id == team.team_id)
        .collect();
    characters.sort_by_key(|character| character.name.to_lowercase());
    let mut outfits: Vec<_> = state
        .team_repo
        .tracked_outfits()
        .await?
        .into_iter()
        .filter(|outfit| outfit.team_id == team.team_id)
        .collect();
    outfits.sort_by_key(|outfit| outfit.outfit_tag.to_lowercase());
    Ok(TeamRoster {
        team,
        characters,
        outfits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{harness, FakeDirectory};
    use backend_domain::{ReferenceData, TrackedCharacter, TrackedOutfit};

    fn team(id: &str, tag: &str) -> Team {
        Team {
            team_id: id.into(),
            team_tag: tag.into(),
            team_name: format!("{} team", tag),
        }
    }

    fn character(id: &str, name: &str, team_id: &str) -> TrackedCharacter {
        TrackedCharacter {
            character_id: id.into(),
            name: name.into(),
            team_id: team_id.into(),
            faction: None,
            server: None,
        }
    }

    #[tokio::test]
    async fn roster_lists_only_the_teams_own_assignments() {
        let h = harness(FakeDirectory::default(), ReferenceData::default());
        h.teams
            .teams
            .lock()
            .unwrap()
            .extend([team("t-1", "WFAT"), team("t-2", "BLUE")]);
        h.teams.characters.lock().unwrap().extend([
            character("100000003", "bob", "t-1"),
            character("100000001", "Alice", "t-1"),
            character("100000005", "Carol", "t-2"),
        ]);
        h.teams.outfits.lock().unwrap().push(TrackedOutfit {
            outfit_id: "37509488620604883".into(),
            outfit_tag: "VCBC".into(),
            outfit_name: "Vanu Corp".into(),
            team_id: "t-1".into(),
            member_count: 40,
            faction: None,
            server: None,
        });

        let roster = team_roster(&h.state, "wfat").await.unwrap();
        assert_eq!(roster.team.team_tag, "WFAT");
        let names: Vec<&str> = roster.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob"]);
        assert_eq!(roster.outfits.len(), 1);

        let other = team_roster(&h.state, "BLUE").await.unwrap();
        assert_eq!(other.characters.len(), 1);
        assert!(other.outfits.is_empty());

        let missing = team_roster(&h.state, "NOPE").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
