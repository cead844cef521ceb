//! Derived tier metrics, recomputed per player.

use serde::{Deserialize, Serialize};

/// Low-tier activity over one window of size `k`.
///
/// Covers the `k` most-battled vehicles of tier 3 and below (fewer when the
/// player has fewer low-tier vehicles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowTierWindow {
    /// Requested window size
    pub k: usize,

    /// Battle counts summed over the window
    pub battles_summed: u64,

    /// Tiers summed over the window
    pub tier_summed: u64,

    /// Battle-weighted tier sum, scaled by this window's own `k`:
    /// `sum(tier * battles) * k / battles_summed`
    pub weighted_tier: f64,
}

/// Tier summary derived from a player's vehicle records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    /// Sum of per-vehicle battle counts
    pub total_vehicle_battles: u64,

    /// Battles-weighted tier, normalized against the player's overall
    /// battle total (not the vehicle-battle total)
    pub average_tier: f64,

    /// One entry per configured window size, in configuration order
    pub low_tier_windows: Vec<LowTierWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serialization() {
        let summary = TierSummary {
            total_vehicle_battles: 100,
            average_tier: 5.5,
            low_tier_windows: vec![LowTierWindow {
                k: 3,
                battles_summed: 40,
                tier_summed: 5,
                weighted_tier: 6.0,
            }],
        };

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: TierSummary = serde_json::from_str(&json).unwrap();

        assert_eq!(summary, parsed);
    }
}
