use crate::judge::blessings;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAX_TIER: u8 = 6;
/// Rerolls can never buy the rarest top tier.
pub const BOOST_TIER_CAP: u8 = 5;
/// Sentinel tier for entries rejected before any randomness.
pub const REJECTED_TIER: u8 = 0;

pub const BELOW_MINIMUM_LABEL: &str = "Offering Too Small";
pub const MISSING_EIGHT_LABEL: &str = "No Lucky Eight";

/// Canonical reward tier table (tier 1..6). Residual probability mass falls
/// to tier 1 through the default rule in `select_tier`.
pub struct TierSpec {
    pub label: &'static str,
    pub emoji: &'static str,
    pub probability: f64,
    /// Payout multiplier in hundredths of the offering
    pub multiplier_hundredths: u64,
}

pub const TIERS: [TierSpec; 6] = [
    TierSpec { label: "IOU Dumplings", emoji: "\u{1F95F}", probability: 0.50, multiplier_hundredths: 0 },
    TierSpec { label: "Luck Recycled", emoji: "\u{1F504}", probability: 0.249, multiplier_hundredths: 100 },
    TierSpec { label: "Small Win", emoji: "\u{1F4B0}", probability: 0.16, multiplier_hundredths: 150 },
    TierSpec { label: "Golden Pig", emoji: "\u{1F437}", probability: 0.08, multiplier_hundredths: 300 },
    TierSpec { label: "JACKPOT", emoji: "\u{1F3B0}", probability: 0.008, multiplier_hundredths: 800 },
    TierSpec { label: "SUPER JACKPOT", emoji: "\u{1F386}", probability: 0.0008, multiplier_hundredths: 8800 },
];

/// Spec for a reward tier in 1..=6.
pub fn tier_spec(tier: u8) -> &'static TierSpec {
    debug_assert!((1..=MAX_TIER).contains(&tier));
    &TIERS[(tier.clamp(1, MAX_TIER) - 1) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct TierDecision {
    /// Final tier after the boost cap
    pub tier: u8,
    /// Tier before the boost cap, kept for the audit trail
    pub base_tier: u8,
    pub source: TierSource,
    pub blessing: String,
}

/// First 4 bytes of SHA-256 over `lowercase(hash) ‖ wish [‖ ":" ‖ attempt]`.
/// The raw wish text goes in unsanitized so the draw is reproducible from
/// exactly what the caller submitted.
fn draw_seed(tx_hash: &str, wish: &str, attempt: u8) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(tx_hash.to_lowercase().as_bytes());
    hasher.update(wish.as_bytes());
    if attempt > 0 {
        hasher.update(format!(":{attempt}").as_bytes());
    }
    let digest = hasher.finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn seed_entropy(seed: u32) -> f64 {
    f64::from(seed) / f64::from(u32::MAX)
}

/// Walk the tier table accumulating probability mass; the first tier whose
/// cumulative mass covers the adjusted entropy wins. Entropy past the table
/// (rounding, or the unpublished residual) lands on the lowest tier.
pub fn select_tier(entropy: f64) -> u8 {
    let mut cumulative = 0.0;
    for (idx, spec) in TIERS.iter().enumerate() {
        cumulative += spec.probability;
        if cumulative >= entropy {
            return (idx + 1) as u8;
        }
    }
    1
}

/// Deterministic fallback tier decision: best of `1 + rerolls` penalty-scaled
/// draws, capped at tier 5 when any reroll was in play. Reproducible and
/// auditable from `(hash, wish, multiplier, rerolls)` alone.
pub fn fallback_decision(
    tx_hash: &str,
    wish: &str,
    penalty_multiplier: f64,
    rerolls: u8,
) -> TierDecision {
    let mut base_tier = 1;
    for attempt in 0..=rerolls {
        let entropy = seed_entropy(draw_seed(tx_hash, wish, attempt));
        let tier = select_tier(entropy * penalty_multiplier);
        base_tier = base_tier.max(tier);
    }

    let tier = if rerolls > 0 {
        base_tier.min(BOOST_TIER_CAP)
    } else {
        base_tier
    };

    let blessing = blessings::fallback_blessing(tier, draw_seed(tx_hash, wish, 0) as usize);

    TierDecision {
        tier,
        base_tier,
        source: TierSource::Fallback,
        blessing,
    }
}

/// Wrap a judge verdict, applying the boost cap when rerolls were granted.
pub fn from_judge(tier: u8, blessing: String, boosted: bool) -> TierDecision {
    let base_tier = tier;
    let tier = if boosted { tier.min(BOOST_TIER_CAP) } else { tier };
    TierDecision {
        tier,
        base_tier,
        source: TierSource::Ai,
        blessing,
    }
}
