//! Player identity and aggregate battle statistics.

use serde::{Deserialize, Serialize};

/// A resolved player: the remote system's canonical name and stable
/// numeric account id.
///
/// Resolution is case-insensitive, but the name stored here is always the
/// casing the remote system reports, not what the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub name: String,
    pub id: u64,
}

impl PlayerIdentity {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Raw per-account aggregate counters as reported by the remote API.
///
/// All counts are non-negative. `battles` is the divisor for every derived
/// average; callers must check it against zero before dividing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Total battles fought
    pub battles: u64,

    /// Total experience earned
    pub experience: u64,

    /// Enemies spotted
    pub spots: u64,

    /// Enemies destroyed
    pub kills: u64,

    /// Damage dealt
    pub damage: u64,

    /// Battles won
    pub wins: u64,

    /// Battles lost
    pub losses: u64,

    /// Battles drawn
    pub draws: u64,

    /// Base capture points earned
    pub capture_points: u64,

    /// Base capture points denied to the enemy
    pub dropped_capture_points: u64,
}

impl PlayerStats {
    /// Whether any derived average is definable for this player.
    pub fn has_battles(&self) -> bool {
        self.battles > 0
    }
}
