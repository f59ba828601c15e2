// Vehicle activity value objects

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Destroyed,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Destroyed => "destroyed",
        }
    }
}

/// Collapses empire-specific vehicle names into one family name.
pub fn vehicle_family(name: &str) -> &str {
    match name {
        "Scythe" | "Mosquito" | "Reaver" => "ESF",
        "Magrider" | "Prowler" | "Vanguard" => "MBT",
        other => other,
    }
}
