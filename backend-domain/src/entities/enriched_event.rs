// Enriched event entity
// Persisted, human-readable normalisation of one raw payload. Written once, never mutated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Death,
    VehicleDestroy,
    Experience,
    FacilityControl,
    SkillUnlock,
    ItemUnlock,
    SessionChange,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Death => "Death",
            EventKind::VehicleDestroy => "VehicleDestroy",
            EventKind::Experience => "Experience",
            EventKind::FacilityControl => "FacilityControl",
            EventKind::SkillUnlock => "SkillUnlock",
            EventKind::ItemUnlock => "ItemUnlock",
            EventKind::SessionChange => "SessionChange",
        }
    }
}

/// A participant as known at write time: raw id, resolved name and team snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub id: String,
    pub name: Option<String>,
    pub team_id: Option<String>,
}

impl CharacterRef {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub timestamp: i64,
    pub attacker: CharacterRef,
    pub attacker_class: Option<String>,
    pub attacker_faction: Option<String>,
    pub attacker_vehicle: Option<String>,
    pub attacker_weapon_id: String,
    pub attacker_weapon: Option<String>,
    pub character: CharacterRef,
    pub class: Option<String>,
    pub faction: Option<String>,
    pub vehicle: Option<String>,
    pub is_headshot: bool,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDestroyRecord {
    pub timestamp: i64,
    pub attacker: CharacterRef,
    pub attacker_class: Option<String>,
    pub attacker_faction: Option<String>,
    pub attacker_vehicle: Option<String>,
    pub attacker_weapon_id: String,
    pub attacker_weapon: Option<String>,
    pub character: CharacterRef,
    pub faction: Option<String>,
    pub vehicle: Option<String>,
    pub facility_id: String,
    pub facility: Option<String>,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub timestamp: i64,
    pub character: CharacterRef,
    pub class: Option<String>,
    pub faction: Option<String>,
    pub other: CharacterRef,
    pub experience_id: String,
    pub description: Option<String>,
    pub amount: i64,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityAction {
    Capture,
    Defend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityControlRecord {
    pub timestamp: i64,
    pub character: CharacterRef,
    pub action: FacilityAction,
    pub facility_id: String,
    pub facility: Option<String>,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillUnlockRecord {
    pub timestamp: i64,
    pub character: CharacterRef,
    pub skill_id: String,
    pub name: Option<String>,
    pub skill_line: Option<String>,
    pub skill_points: Option<String>,
    pub grant_item_id: Option<String>,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUnlockRecord {
    pub timestamp: i64,
    pub character: CharacterRef,
    pub item_id: String,
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub skill_set: Option<String>,
    pub item_count: i64,
    pub context: Option<String>,
    pub continent: Option<String>,
    pub server: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    Login,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionChangeRecord {
    pub timestamp: i64,
    pub character: CharacterRef,
    pub action: SessionAction,
    pub server: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EnrichedEvent {
    Death(DeathRecord),
    VehicleDestroy(VehicleDestroyRecord),
    Experience(ExperienceRecord),
    FacilityControl(FacilityControlRecord),
    SkillUnlock(SkillUnlockRecord),
    ItemUnlock(ItemUnlockRecord),
    SessionChange(SessionChangeRecord),
}

impl EnrichedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EnrichedEvent::Death(_) => EventKind::Death,
            EnrichedEvent::VehicleDestroy(_) => EventKind::VehicleDestroy,
            EnrichedEvent::Experience(_) => EventKind::Experience,
            EnrichedEvent::FacilityControl(_) => EventKind::FacilityControl,
            EnrichedEvent::SkillUnlock(_) => EventKind::SkillUnlock,
            EnrichedEvent::ItemUnlock(_) => EventKind::ItemUnlock,
            EnrichedEvent::SessionChange(_) => EventKind::SessionChange,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            EnrichedEvent::Death(e) => e.timestamp,
            EnrichedEvent::VehicleDestroy(e) => e.timestamp,
            EnrichedEvent::Experience(e) => e.timestamp,
            EnrichedEvent::FacilityControl(e) => e.timestamp,
            EnrichedEvent::SkillUnlock(e) => e.timestamp,
            EnrichedEvent::ItemUnlock(e) => e.timestamp,
            EnrichedEvent::SessionChange(e) => e.timestamp,
        }
    }

    /// The character the event is about (the victim for combat events).
    pub fn subject(&self) -> &CharacterRef {
        match self {
            EnrichedEvent::Death(e) => &e.character,
            EnrichedEvent::VehicleDestroy(e) => &e.character,
            EnrichedEvent::Experience(e) => &e.character,
            EnrichedEvent::FacilityControl(e) => &e.character,
            EnrichedEvent::SkillUnlock(e) => &e.character,
            EnrichedEvent::ItemUnlock(e) => &e.character,
            EnrichedEvent::SessionChange(e) => &e.character,
        }
    }

    /// Attacker for combat events, the "other" participant for experience.
    pub fn counterpart(&self) -> Option<&CharacterRef> {
        match self {
            EnrichedEvent::Death(e) => Some(&e.attacker),
            EnrichedEvent::VehicleDestroy(e) => Some(&e.attacker),
            EnrichedEvent::Experience(e) => Some(&e.other),
            _ => None,
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = &CharacterRef> {
        std::iter::once(self.subject()).chain(self.counterpart())
    }
}
