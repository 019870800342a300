use crate::pipeline::oracle::{self, MAX_TIER, REJECTED_TIER};
use alloy::primitives::U256;

/// Tier payout, bounded by the reserve observed at decision time. All
/// arithmetic is integer smallest units with multipliers in hundredths;
/// division truncates toward zero.
///
/// The reserve is read once and not locked, so concurrent settlements can
/// race past the aggregate cap; only a single settlement's exposure is
/// bounded here.
pub fn compute(tier: u8, offering: U256, reserve: U256) -> U256 {
    if tier == REJECTED_TIER || tier > MAX_TIER {
        return U256::ZERO;
    }

    let spec = oracle::tier_spec(tier);
    let unbounded = offering * U256::from(spec.multiplier_hundredths) / U256::from(100u64);

    match tier {
        5 => unbounded.min(reserve / U256::from(4u64)),
        6 => unbounded.min(reserve / U256::from(2u64)),
        _ => unbounded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn rejected_and_lowest_tiers_pay_nothing() {
        assert_eq!(compute(0, wei(100), wei(1_000)), U256::ZERO);
        assert_eq!(compute(1, wei(100), wei(1_000)), U256::ZERO);
    }

    #[test]
    fn middle_tiers_scale_the_offering() {
        assert_eq!(compute(2, wei(100), wei(1_000)), wei(100));
        assert_eq!(compute(3, wei(100), wei(1_000)), wei(150));
        assert_eq!(compute(4, wei(100), wei(1_000)), wei(300));
    }

    #[test]
    fn fixed_point_truncates_toward_zero() {
        // 1.5x of 33 = 49.5 -> 49
        assert_eq!(compute(3, wei(33), wei(1_000_000)), wei(49));
    }

    #[test]
    fn jackpot_capped_at_quarter_reserve() {
        // 8x 100 = 800, reserve/4 = 250
        assert_eq!(compute(5, wei(100), wei(1_000)), wei(250));
        // Uncapped when small enough
        assert_eq!(compute(5, wei(10), wei(1_000)), wei(80));
    }

    #[test]
    fn super_jackpot_capped_at_half_reserve() {
        // 88x 100 = 8800, reserve/2 = 500
        assert_eq!(compute(6, wei(100), wei(1_000)), wei(500));
    }

    #[test]
    fn empty_reserve_pays_nothing_on_bounded_tiers() {
        assert_eq!(compute(5, wei(100), U256::ZERO), U256::ZERO);
        assert_eq!(compute(6, wei(100), U256::ZERO), U256::ZERO);
        assert_eq!(compute(6, wei(100), wei(1)), U256::ZERO);
    }
}
