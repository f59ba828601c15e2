// Raw stream payloads
// One variant per census event_name; anything else decodes to Unknown

use serde::Deserialize;

use crate::utils::{de_lenient_i64, de_lenient_i64_or_zero, de_lenient_string};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event_name")]
pub enum RawEvent {
    Death(RawDeath),
    VehicleDestroy(RawVehicleDestroy),
    GainExperience(RawExperience),
    PlayerFacilityCapture(RawFacility),
    PlayerFacilityDefend(RawFacility),
    SkillAdded(RawSkillAdded),
    ItemAdded(RawItemAdded),
    PlayerLogin(RawSession),
    PlayerLogout(RawSession),
    #[serde(other)]
    Unknown,
}

impl RawEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            RawEvent::Death(_) => "Death",
            RawEvent::VehicleDestroy(_) => "VehicleDestroy",
            RawEvent::GainExperience(_) => "GainExperience",
            RawEvent::PlayerFacilityCapture(_) => "PlayerFacilityCapture",
            RawEvent::PlayerFacilityDefend(_) => "PlayerFacilityDefend",
            RawEvent::SkillAdded(_) => "SkillAdded",
            RawEvent::ItemAdded(_) => "ItemAdded",
            RawEvent::PlayerLogin(_) => "PlayerLogin",
            RawEvent::PlayerLogout(_) => "PlayerLogout",
            RawEvent::Unknown => "Unknown",
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            RawEvent::Death(p) => Some(p.timestamp),
            RawEvent::VehicleDestroy(p) => Some(p.timestamp),
            RawEvent::GainExperience(p) => Some(p.timestamp),
            RawEvent::PlayerFacilityCapture(p) | RawEvent::PlayerFacilityDefend(p) => {
                Some(p.timestamp)
            }
            RawEvent::SkillAdded(p) => Some(p.timestamp),
            RawEvent::ItemAdded(p) => Some(p.timestamp),
            RawEvent::PlayerLogin(p) | RawEvent::PlayerLogout(p) => Some(p.timestamp),
            RawEvent::Unknown => None,
        }
    }

    /// Only combat payloads carry an attacker.
    pub fn attacker_id(&self) -> Option<&str> {
        match self {
            RawEvent::Death(p) => Some(p.attacker_character_id.as_str()),
            RawEvent::VehicleDestroy(p) => Some(p.attacker_character_id.as_str()),
            _ => None,
        }
    }

    /// Session payloads are world-wide and carry no zone.
    pub fn zone_id(&self) -> Option<&str> {
        let zone = match self {
            RawEvent::Death(p) => &p.zone_id,
            RawEvent::VehicleDestroy(p) => &p.zone_id,
            RawEvent::GainExperience(p) => &p.zone_id,
            RawEvent::PlayerFacilityCapture(p) | RawEvent::PlayerFacilityDefend(p) => &p.zone_id,
            RawEvent::SkillAdded(p) => &p.zone_id,
            RawEvent::ItemAdded(p) => &p.zone_id,
            RawEvent::PlayerLogin(_) | RawEvent::PlayerLogout(_) | RawEvent::Unknown => {
                return None
            }
        };
        Some(zone.as_str()).filter(|zone| !zone.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeath {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_loadout_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub team_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub vehicle_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_loadout_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_team_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_vehicle_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_weapon_id: String,
    #[serde(default, deserialize_with = "de_lenient_i64_or_zero")]
    pub is_headshot: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVehicleDestroy {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub faction_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub vehicle_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_loadout_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_vehicle_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub attacker_weapon_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub facility_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExperience {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub loadout_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub other_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub experience_id: String,
    #[serde(default, deserialize_with = "de_lenient_i64_or_zero")]
    pub amount: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFacility {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub facility_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSkillAdded {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub skill_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItemAdded {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub item_id: String,
    #[serde(default, deserialize_with = "de_lenient_i64_or_zero")]
    pub item_count: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub context: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSession {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub character_id: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub world_id: String,
}
