// Static reference tables
// Loaded once per process; every lookup returns None for unknown ids.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::utils::de_opt_lenient_string;
use crate::value_objects::{vehicle_family, VehicleStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutInfo {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "de_opt_lenient_string")]
    pub faction_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skill_set: Option<String>,
    #[serde(default)]
    pub parent_items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skill_line: Option<String>,
    #[serde(default, deserialize_with = "de_opt_lenient_string")]
    pub skill_points: Option<String>,
    #[serde(default, deserialize_with = "de_opt_lenient_string")]
    pub grant_item_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceInfo {
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_lenient_string")]
    pub xp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleActivity {
    pub vehicle: String,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub factions: HashMap<String, String>,
    pub loadouts: HashMap<String, LoadoutInfo>,
    pub vehicles: HashMap<String, String>,
    pub items: HashMap<String, ItemInfo>,
    pub skills: HashMap<String, SkillInfo>,
    pub zones: HashMap<String, String>,
    pub facilities: HashMap<String, String>,
    pub worlds: HashMap<String, String>,
    pub experiences: HashMap<String, ExperienceInfo>,
    pub vehicle_activity: HashMap<String, VehicleActivity>,
}

impl ReferenceData {
    pub fn faction(&self, faction_id: &str) -> Option<String> {
        self.factions.get(faction_id).cloned()
    }

    pub fn class_of(&self, loadout_id: &str) -> Option<String> {
        self.loadouts
            .get(loadout_id)
            .and_then(|loadout| loadout.class.clone())
    }

    /// Faction tag via loadout -> faction id -> faction table.
    pub fn loadout_faction(&self, loadout_id: &str) -> Option<String> {
        self.loadouts
            .get(loadout_id)
            .and_then(|loadout| loadout.faction_id.as_deref())
            .and_then(|faction_id| self.faction(faction_id))
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Option<String> {
        self.vehicles.get(vehicle_id).cloned()
    }

    pub fn item(&self, item_id: &str) -> Option<&ItemInfo> {
        self.items.get(item_id)
    }

    pub fn item_name(&self, item_id: &str) -> Option<String> {
        self.item(item_id).and_then(|item| item.name.clone())
    }

    pub fn skill(&self, skill_id: &str) -> Option<&SkillInfo> {
        self.skills.get(skill_id)
    }

    /// Instanced zones carry the instance in the upper bits; look up the definition.
    pub fn zone(&self, zone_id: &str) -> Option<String> {
        self.zones
            .get(zone_id)
            .or_else(|| zone_definition_id(zone_id).and_then(|id| self.zones.get(&id.to_string())))
            .cloned()
    }

    pub fn facility(&self, facility_id: &str) -> Option<String> {
        self.facilities.get(facility_id).cloned()
    }

    pub fn world(&self, world_id: &str) -> Option<String> {
        self.worlds.get(world_id).cloned()
    }

    pub fn experience_description(&self, experience_id: &str) -> Option<String> {
        self.experiences
            .get(experience_id)
            .and_then(|experience| experience.description.clone())
    }

    pub fn vehicle_activity(&self, experience_id: &str) -> Option<&VehicleActivity> {
        self.vehicle_activity.get(experience_id)
    }

    /// Distinct vehicle families tracked by the activity table, sorted.
    pub fn tracked_vehicles(&self) -> Vec<String> {
        self.vehicle_activity
            .values()
            .map(|activity| vehicle_family(&activity.vehicle).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn table_sizes(&self) -> [(&'static str, usize); 10] {
        [
            ("factions", self.factions.len()),
            ("loadouts", self.loadouts.len()),
            ("vehicles", self.vehicles.len()),
            ("items", self.items.len()),
            ("skills", self.skills.len()),
            ("zones", self.zones.len()),
            ("facilities", self.facilities.len()),
            ("worlds", self.worlds.len()),
            ("experiences", self.experiences.len()),
            ("vehicle_activity", self.vehicle_activity.len()),
        ]
    }
}

pub fn zone_definition_id(zone_id: &str) -> Option<u64> {
    zone_id.trim().parse::<u64>().ok().map(|id| id & 0xFFFF)
}
