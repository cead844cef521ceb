//! Per-vehicle battle records and the global vehicle catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One vehicle a player has battled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Remote vehicle id
    pub vehicle_id: u64,

    /// Vehicle tier (1..=10)
    pub tier: u8,

    /// Battles fought in this vehicle
    pub battle_count: u64,
}

impl VehicleRecord {
    pub fn new(vehicle_id: u64, tier: u8, battle_count: u64) -> Self {
        Self {
            vehicle_id,
            tier,
            battle_count,
        }
    }
}

/// Catalog entry: display name and tier for one known vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVehicle {
    pub name: String,
    pub tier: u8,
}

/// The global vehicle id → tier/name mapping.
///
/// Fetched at most once per run and immutable thereafter. The BTreeMap keeps
/// vehicle ids in sorted order, which fixes the column order for per-vehicle
/// report columns and for catalog-only output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCatalog {
    vehicles: BTreeMap<u64, CatalogVehicle>,
}

impl TierCatalog {
    pub fn new(vehicles: BTreeMap<u64, CatalogVehicle>) -> Self {
        Self { vehicles }
    }

    /// Tier of a vehicle, if the catalog knows it.
    pub fn tier_of(&self, vehicle_id: u64) -> Option<u8> {
        self.vehicles.get(&vehicle_id).map(|v| v.tier)
    }

    /// Display name of a vehicle, if the catalog knows it.
    pub fn name_of(&self, vehicle_id: u64) -> Option<&str> {
        self.vehicles.get(&vehicle_id).map(|v| v.name.as_str())
    }

    /// All known vehicle ids in ascending order.
    pub fn sorted_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.vehicles.keys().copied()
    }

    /// Iterate entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &CatalogVehicle)> + '_ {
        self.vehicles.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl FromIterator<(u64, CatalogVehicle)> for TierCatalog {
    fn from_iter<I: IntoIterator<Item = (u64, CatalogVehicle)>>(iter: I) -> Self {
        Self {
            vehicles: iter.into_iter().collect(),
        }
    }
}
