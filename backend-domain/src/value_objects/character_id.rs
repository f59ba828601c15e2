// Character identifier value object
//
// Census ids for player characters are odd; even ids (and "0") belong to
// NPCs, turrets, vehicles and other environment actors.

use serde::{Deserialize, Serialize};

/// Sentinel used by the stream for "no attacker" (tutorial and system events).
pub const NO_ATTACKER_ID: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_player(&self) -> bool {
        is_player_id(&self.0)
    }
}

fn last_digit(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.chars().last().and_then(|c| c.to_digit(10))
}

/// Returns true for all-digit ids whose last digit is odd.
pub fn is_player_id(value: &str) -> bool {
    last_digit(value).map_or(false, |digit| digit % 2 == 1)
}

/// Even, non-zero ids reference vehicles and other non-player actors.
pub fn is_actor_id(value: &str) -> bool {
    if value.trim().chars().all(|c| c == '0') {
        return false;
    }
    last_digit(value).map_or(false, |digit| digit % 2 == 0)
}
