// Combat interaction classification

use serde::{Deserialize, Serialize};

use super::vehicle_family;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombatRole {
    Infantry,
    GroundVehicle,
    Aircraft,
}

impl CombatRole {
    pub fn label(&self) -> &'static str {
        match self {
            CombatRole::Infantry => "Infantry",
            CombatRole::GroundVehicle => "Ground Vehicle",
            CombatRole::Aircraft => "Aircraft",
        }
    }

    /// Classifies an (already resolved) vehicle name. No vehicle means infantry.
    pub fn from_vehicle(vehicle: Option<&str>) -> Self {
        let Some(name) = vehicle.map(str::trim).filter(|name| !name.is_empty()) else {
            return CombatRole::Infantry;
        };
        match vehicle_family(name) {
            "Flash" | "Harasser" | "Sunderer" | "Lightning" | "MBT" | "ANT" | "Javelin"
            | "Chimera" | "Colossus" => CombatRole::GroundVehicle,
            "ESF" | "Liberator" | "Galaxy" | "Valkyrie" | "Dervish" => CombatRole::Aircraft,
            _ => CombatRole::Infantry,
        }
    }
}

/// Unordered pair of combat roles, canonicalised so the lower role comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractionKind {
    pub low: CombatRole,
    pub high: CombatRole,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 6] = [
        InteractionKind::new(CombatRole::Infantry, CombatRole::Infantry),
        InteractionKind::new(CombatRole::Infantry, CombatRole::GroundVehicle),
        InteractionKind::new(CombatRole::Infantry, CombatRole::Aircraft),
        InteractionKind::new(CombatRole::GroundVehicle, CombatRole::GroundVehicle),
        InteractionKind::new(CombatRole::GroundVehicle, CombatRole::Aircraft),
        InteractionKind::new(CombatRole::Aircraft, CombatRole::Aircraft),
    ];

    const fn new(low: CombatRole, high: CombatRole) -> Self {
        Self { low, high }
    }

    pub fn between(attacker: CombatRole, victim: CombatRole) -> Self {
        if attacker <= victim {
            Self::new(attacker, victim)
        } else {
            Self::new(victim, attacker)
        }
    }

    pub fn from_vehicles(attacker_vehicle: Option<&str>, victim_vehicle: Option<&str>) -> Self {
        Self::between(
            CombatRole::from_vehicle(attacker_vehicle),
            CombatRole::from_vehicle(victim_vehicle),
        )
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.low.label(), self.high.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empire_specific_tanks_share_a_role() {
        assert_eq!(CombatRole::from_vehicle(Some("Prowler")), CombatRole::GroundVehicle);
        assert_eq!(CombatRole::from_vehicle(Some("Vanguard")), CombatRole::GroundVehicle);
        assert_eq!(CombatRole::from_vehicle(Some("Reaver")), CombatRole::Aircraft);
        assert_eq!(CombatRole::from_vehicle(None), CombatRole::Infantry);
        assert_eq!(CombatRole::from_vehicle(Some("  ")), CombatRole::Infantry);
    }

    #[test]
    fn pair_is_canonicalised_by_priority() {
        let kind = InteractionKind::from_vehicles(Some("Mosquito"), None);
        assert_eq!(kind.label(), "Infantry vs Aircraft");
        let reversed = InteractionKind::from_vehicles(None, Some("Scythe"));
        assert_eq!(kind, reversed);
        assert_eq!(
            InteractionKind::from_vehicles(Some("Galaxy"), Some("Magrider")).label(),
            "Ground Vehicle vs Aircraft"
        );
    }

    #[test]
    fn six_buckets_are_fixed() {
        let labels: Vec<String> = InteractionKind::ALL.iter().map(|kind| kind.label()).collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], "Infantry vs Infantry");
        assert_eq!(labels[5], "Aircraft vs Aircraft");
    }
}
