//! Tier aggregation engine.
//!
//! Pure computation over a player's per-vehicle battle records:
//! - total vehicle battles and battles-weighted average tier
//! - the "weighted low-tier activity" metric over configurable windows
//!
//! No I/O. Everything here is deterministic given its inputs.

use thiserror::Error;

use crate::models::{LowTierWindow, TierSummary, VehicleRecord};

/// Vehicles of this tier or below count as low-tier activity.
const LOW_TIER_CEILING: u8 = 3;

/// Errors from derived-metric computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("division by zero: {0}")]
    DivisionByZero(String),
}

/// Compute the tier summary for one player.
///
/// `total_battles` is the player's overall battle total from their account
/// stats, not the vehicle-battle sum. The average tier divides by it on
/// purpose: vehicles the remote system does not track still dilute the
/// average. Fails when `total_battles` is zero.
pub fn compute_tier_summary(
    vehicles: &[VehicleRecord],
    total_battles: u64,
    window_sizes: &[usize],
) -> Result<TierSummary, CalcError> {
    if total_battles == 0 {
        return Err(CalcError::DivisionByZero(
            "player has 0 total battles".to_string(),
        ));
    }

    let total_vehicle_battles = vehicles.iter().map(|v| v.battle_count).sum();

    let average_tier = vehicles
        .iter()
        .map(|v| (f64::from(v.tier) / total_battles as f64) * v.battle_count as f64)
        .sum();

    let pool = low_tier_pool(vehicles);
    let low_tier_windows = window_sizes
        .iter()
        .map(|&k| compute_window(&pool, k))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TierSummary {
        total_vehicle_battles,
        average_tier,
        low_tier_windows,
    })
}

/// Mean battle count over the player's `k` most-battled low-tier vehicles.
///
/// This is the legacy base-schema metric. It divides by the constant `k`,
/// never by the pool sum, so a player with no low-tier vehicles gets `0.0`
/// rather than an error. `k` must be positive (enforced by config
/// validation).
pub fn top_low_tier_mean(vehicles: &[VehicleRecord], k: usize) -> f64 {
    let pool = low_tier_pool(vehicles);
    let summed: u64 = pool.iter().take(k).map(|(battles, _)| battles).sum();
    summed as f64 / k as f64
}

/// Collect `(battle_count, tier)` for every low-tier vehicle, sorted
/// descending by battle count. The sort is stable: vehicles with equal
/// battle counts keep their input order.
fn low_tier_pool(vehicles: &[VehicleRecord]) -> Vec<(u64, u8)> {
    let mut pool: Vec<(u64, u8)> = vehicles
        .iter()
        .filter(|v| v.tier <= LOW_TIER_CEILING)
        .map(|v| (v.battle_count, v.tier))
        .collect();
    pool.sort_by_key(|&(battles, _)| std::cmp::Reverse(battles));
    pool
}

/// Compute one low-tier window over the sorted pool.
///
/// Takes the first `k` entries (fewer if the pool is smaller). The weighted
/// value scales by this window's own `k`. Fails when the window holds no
/// battles at all, since the weighted value divides by the battle sum.
fn compute_window(pool: &[(u64, u8)], k: usize) -> Result<LowTierWindow, CalcError> {
    let taken = &pool[..k.min(pool.len())];

    let battles_summed: u64 = taken.iter().map(|(battles, _)| battles).sum();
    let tier_summed: u64 = taken.iter().map(|&(_, tier)| u64::from(tier)).sum();

    if battles_summed == 0 {
        return Err(CalcError::DivisionByZero(format!(
            "no low-tier battles in window of size {}",
            k
        )));
    }

    let weighted_raw: f64 = taken
        .iter()
        .map(|&(battles, tier)| f64::from(tier) * battles as f64)
        .sum();
    let weighted_tier = weighted_raw * k as f64 / battles_summed as f64;

    Ok(LowTierWindow {
        k,
        battles_summed,
        tier_summed,
        weighted_tier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vehicle(tier: u8, battles: u64) -> VehicleRecord {
        VehicleRecord::new(u64::from(tier) * 100 + battles, tier, battles)
    }

    #[test]
    fn test_total_vehicle_battles_is_exact_sum() {
        let vehicles = vec![vehicle(1, 10), vehicle(2, 30), vehicle(8, 60)];

        let summary = compute_tier_summary(&vehicles, 100, &[]).unwrap();

        assert_eq!(summary.total_vehicle_battles, 100);
    }

    #[test]
    fn test_average_tier_divides_by_overall_battles() {
        // avg_tier = (1/100)*10 + (2/100)*30 + (8/100)*60 = 5.5
        let vehicles = vec![vehicle(1, 10), vehicle(2, 30), vehicle(8, 60)];

        let summary = compute_tier_summary(&vehicles, 100, &[]).unwrap();

        assert!((summary.average_tier - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_tier_dilutes_against_untracked_battles() {
        // 200 overall battles, only 100 tracked per-vehicle: the divisor is
        // the overall total, so the average halves.
        let vehicles = vec![vehicle(1, 10), vehicle(2, 30), vehicle(8, 60)];

        let summary = compute_tier_summary(&vehicles, 200, &[]).unwrap();

        assert!((summary.average_tier - 2.75).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_battles_fails() {
        let vehicles = vec![vehicle(1, 10)];

        let err = compute_tier_summary(&vehicles, 0, &[]).unwrap_err();
        assert!(matches!(err, CalcError::DivisionByZero(_)));

        // Regardless of vehicle content.
        let err = compute_tier_summary(&[], 0, &[]).unwrap_err();
        assert!(matches!(err, CalcError::DivisionByZero(_)));
    }

    #[test]
    fn test_window_takes_top_k_by_battle_count() {
        let vehicles = vec![
            vehicle(1, 5),
            vehicle(2, 50),
            vehicle(3, 20),
            vehicle(1, 40),
            vehicle(9, 1000), // not low-tier, ignored
        ];

        let summary = compute_tier_summary(&vehicles, 1115, &[3]).unwrap();
        let window = &summary.low_tier_windows[0];

        // Top 3 by battles: 50 (t2), 40 (t1), 20 (t3)
        assert_eq!(window.k, 3);
        assert_eq!(window.battles_summed, 110);
        assert_eq!(window.tier_summed, 6);
    }

    #[test]
    fn test_weighted_window_scales_by_its_own_k() {
        // Policy: every window's weighted value scales by the size of that
        // window, not by a fixed first-window constant.
        let vehicles = vec![
            vehicle(1, 40),
            vehicle(2, 30),
            vehicle(3, 20),
            vehicle(1, 10),
            vehicle(2, 5),
        ];

        let summary = compute_tier_summary(&vehicles, 105, &[3, 5]).unwrap();

        let w3 = &summary.low_tier_windows[0];
        // raw = 1*40 + 2*30 + 3*20 = 160; battles = 90
        assert!((w3.weighted_tier - 160.0 * 3.0 / 90.0).abs() < 1e-9);

        let w5 = &summary.low_tier_windows[1];
        // raw = 160 + 1*10 + 2*5 = 180; battles = 105
        assert!((w5.weighted_tier - 180.0 * 5.0 / 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_with_fewer_vehicles_than_k() {
        let vehicles = vec![vehicle(2, 8)];

        let summary = compute_tier_summary(&vehicles, 8, &[5]).unwrap();
        let window = &summary.low_tier_windows[0];

        assert_eq!(window.battles_summed, 8);
        assert_eq!(window.tier_summed, 2);
        // raw = 16, scaled by k=5: 16 * 5 / 8 = 10
        assert!((window.weighted_tier - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_with_no_low_tier_battles_fails() {
        // No low-tier vehicles at all
        let vehicles = vec![vehicle(8, 100)];
        let err = compute_tier_summary(&vehicles, 100, &[3]).unwrap_err();
        assert!(matches!(err, CalcError::DivisionByZero(_)));

        // Low-tier vehicles exist but carry zero battles
        let vehicles = vec![vehicle(1, 0), vehicle(2, 0)];
        let err = compute_tier_summary(&vehicles, 100, &[3]).unwrap_err();
        assert!(matches!(err, CalcError::DivisionByZero(_)));
    }

    #[test]
    fn test_window_invariant_under_input_reorder() {
        let a = vec![vehicle(1, 5), vehicle(2, 50), vehicle(3, 20), vehicle(1, 40)];
        let b = vec![vehicle(1, 40), vehicle(3, 20), vehicle(1, 5), vehicle(2, 50)];

        let wa = compute_tier_summary(&a, 115, &[2]).unwrap().low_tier_windows;
        let wb = compute_tier_summary(&b, 115, &[2]).unwrap().low_tier_windows;

        assert_eq!(wa, wb);
    }

    #[test]
    fn test_sort_tie_break_is_stable() {
        // Two vehicles tied at 30 battles: input order decides which one a
        // size-1 window sees.
        let vehicles = vec![vehicle(3, 30), vehicle(1, 30)];

        let summary = compute_tier_summary(&vehicles, 60, &[1]).unwrap();
        let window = &summary.low_tier_windows[0];

        assert_eq!(window.tier_summed, 3);
    }

    #[test]
    fn test_top_low_tier_mean() {
        let vehicles = vec![
            vehicle(1, 10),
            vehicle(2, 30),
            vehicle(3, 50),
            vehicle(8, 60),
        ];

        // Top 3 low-tier battle counts: 50 + 30 + 10 = 90; mean over 3.
        assert!((top_low_tier_mean(&vehicles, 3) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_low_tier_mean_empty_pool_is_zero() {
        let vehicles = vec![vehicle(8, 60)];

        assert_eq!(top_low_tier_mean(&vehicles, 3), 0.0);
        assert_eq!(top_low_tier_mean(&[], 3), 0.0);
    }

    #[test]
    fn test_no_windows_requested() {
        let vehicles = vec![vehicle(1, 10)];

        let summary = compute_tier_summary(&vehicles, 10, &[]).unwrap();

        assert!(summary.low_tier_windows.is_empty());
    }
}
