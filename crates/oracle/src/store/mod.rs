pub mod redis;

use crate::{
    Result,
    pipeline::{boost::BoostGrant, disburse::PayoutStatus, oracle::TierSource},
};
use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Durable audit row, written exactly once per accepted request and never
/// mutated afterwards. A correction would be a fresh record, not an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Offering sender, lower-cased 0x address
    pub sender: String,
    /// Offering transaction hash, lower-cased
    pub tx_hash: String,
    pub network: String,
    /// Offering amount in smallest units, decimal string
    pub amount_wei: String,
    /// Human-readable offering amount
    pub amount: String,
    /// Outcome label ("IOU Dumplings", "Offering Too Small", ...)
    pub outcome: String,
    /// 0 = rejected entry, 1..6 = reward tiers
    pub tier: u8,
    pub tier_source: TierSource,
    pub blessing: String,
    /// Payout in smallest units, decimal string
    pub payout_wei: String,
    pub payout_tx_hash: Option<String>,
    pub payout_status: PayoutStatus,
    pub penalties: Vec<String>,
    pub penalty_multiplier: f64,
    pub boost: Option<BoostGrant>,
    pub explorer_url: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Durable store collaborator.
#[automock]
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Fast-path duplicate check. Not a gate: two concurrent requests can
    /// both observe `false` here.
    async fn is_processed(&self, tx_hash: &str) -> Result<bool>;

    /// Atomic insert-if-absent replay gate. Returns `false` when the hash
    /// was already marked, which is the authoritative `AlreadyProcessed`
    /// signal under concurrency.
    async fn try_mark_processed(&self, tx_hash: &str, network: &str) -> Result<bool>;

    /// Persist one settlement outcome.
    async fn insert_settlement(&self, record: &SettlementRecord) -> Result<()>;

    /// All settlements for a sender, newest first.
    async fn list_by_address(&self, sender: &str) -> Result<Vec<SettlementRecord>>;
}
