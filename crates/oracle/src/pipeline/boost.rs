use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Reward-token decimals; thresholds below compare whole tokens.
const TOKEN_DECIMALS: u32 = 18;

/// Descending {min whole tokens, rerolls, label} table; the highest
/// threshold met wins.
const BOOST_TIERS: [(u64, u8, &str); 4] = [
    (100_000, 4, "Mega Juice"),
    (10_000, 3, "Large Juice"),
    (1_000, 2, "Medium Juice"),
    (100, 1, "Small Juice"),
];

/// Extra reroll attempts granted by a verified reward-token transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostGrant {
    pub rerolls: u8,
    pub label: String,
    /// Whole tokens transferred, decimal string
    pub token_amount: String,
    /// Boost transaction hash, lower-cased
    pub tx_hash: String,
}

/// Look a verified token amount up against the threshold table. Transfers
/// below every threshold grant nothing.
pub fn evaluate(token_amount_wei: U256, tx_hash: &str) -> Option<BoostGrant> {
    let whole_tokens = token_amount_wei / U256::from(10u64).pow(U256::from(TOKEN_DECIMALS));

    BOOST_TIERS
        .iter()
        .find(|(min, _, _)| whole_tokens >= U256::from(*min))
        .map(|(_, rerolls, label)| BoostGrant {
            rerolls: *rerolls,
            label: (*label).to_string(),
            token_amount: whole_tokens.to_string(),
            tx_hash: tx_hash.to_lowercase(),
        })
}
