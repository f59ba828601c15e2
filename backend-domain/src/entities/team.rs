// Team, tracked-character and tracked-outfit entities

use clickhouse::Row;
use serde::{Deserialize, Serialize};

use super::CharacterRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Row)]
pub struct Team {
    pub team_id: String,
    pub team_tag: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Row)]
pub struct TrackedCharacter {
    pub character_id: String,
    pub name: String,
    pub team_id: String,
    pub faction: Option<String>,
    pub server: Option<String>,
}

/// An outfit assigned to a team; its members are resolved at tracking time
/// and again on every start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Row)]
pub struct TrackedOutfit {
    pub outfit_id: String,
    pub outfit_tag: String,
    pub outfit_name: String,
    pub team_id: String,
    pub member_count: u64,
    pub faction: Option<String>,
    pub server: Option<String>,
}

/// Who a report is about.
#[derive(Debug, Clone)]
pub enum ReportScope {
    Team(Team),
    /// Lower-cased character names.
    Characters(Vec<String>),
}

impl ReportScope {
    pub fn characters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        out.sort();
        out.dedup();
        ReportScope::Characters(out)
    }

    pub fn includes(&self, character: &CharacterRef) -> bool {
        match self {
            ReportScope::Team(team) => character.team_id.as_deref() == Some(team.team_id.as_str()),
            ReportScope::Characters(names) => character
                .name
                .as_deref()
                .map(|name| names.iter().any(|candidate| candidate == &name.to_lowercase()))
                .unwrap_or(false),
        }
    }

    pub fn label(&self) -> String {
        const NAME_LIMIT: usize = 6;
        match self {
            ReportScope::Team(team) => team.team_tag.clone(),
            ReportScope::Characters(names) if names.len() > NAME_LIMIT => format!(
                "{}-and-{}-more",
                names[..NAME_LIMIT].join("-"),
                names.len() - NAME_LIMIT
            ),
            ReportScope::Characters(names) => names.join("-"),
        }
    }
}

/// Expands console-style names (`<1-4 chars>x<rest>(TR|NC|VS)`) into all three
/// faction variants; other names pass through.
pub fn expand_faction_variants<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !out.contains(&name) {
            out.push(name);
        }
    };
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        match console_name_stem(name) {
            Some(stem) => {
                for tag in ["TR", "NC", "VS"] {
                    push(format!("{}{}", stem, tag));
                }
            }
            None => push(name.to_string()),
        }
    }
    out
}

fn console_name_stem(name: &str) -> Option<&str> {
    let stem = ["TR", "NC", "VS"]
        .iter()
        .find_map(|tag| name.strip_suffix(tag))?;
    if !stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    // prefix of 1-4 word chars, an 'x', then at least one more word char
    let bytes = stem.as_bytes();
    let has_marker = (1..=4).any(|idx| idx + 1 < bytes.len() && bytes[idx] == b'x');
    if has_marker {
        Some(stem)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Team {
        Team {
            team_id: "t-1".into(),
            team_tag: "WFAT".into(),
            team_name: "Wolfpack".into(),
        }
    }

    #[test]
    fn team_scope_matches_attribution_snapshot() {
        let scope = ReportScope::Team(team());
        let member = CharacterRef {
            id: "1".into(),
            name: Some("Alice".into()),
            team_id: Some("t-1".into()),
        };
        let outsider = CharacterRef {
            team_id: None,
            ..member.clone()
        };
        assert!(scope.includes(&member));
        assert!(!scope.includes(&outsider));
    }

    #[test]
    fn character_scope_is_case_insensitive() {
        let scope = ReportScope::characters(["Alice", " BOB ", "alice"]);
        let bob = CharacterRef {
            id: "3".into(),
            name: Some("Bob".into()),
            team_id: None,
        };
        assert!(scope.includes(&bob));
        assert_eq!(scope.label(), "alice-bob");
        let unnamed = CharacterRef {
            id: "5".into(),
            name: None,
            team_id: None,
        };
        assert!(!scope.includes(&unnamed));
    }

    #[test]
    fn long_character_lists_are_abbreviated() {
        let scope = ReportScope::characters(["a", "b", "c", "d", "e", "f", "g", "h"]);
        assert_eq!(scope.label(), "a-b-c-d-e-f-and-2-more");
    }

    #[test]
    fn console_names_expand_to_all_factions() {
        let names = expand_faction_variants(["DIGTxWolfVS", "Alice", "TRex"]);
        assert_eq!(
            names,
            vec!["DIGTxWolfTR", "DIGTxWolfNC", "DIGTxWolfVS", "Alice", "TRex"]
        );
    }
}
