pub mod boost;
pub mod disburse;
pub mod oracle;
pub mod payout;
pub mod penalty;
pub mod verifier;

use crate::{
    Error, Result,
    judge::{JudgeClient, JudgeContext, blessings},
    ledger::resolver::{NetworkHandle, Networks},
    store::{SettlementRecord, SettlementStore},
    util::{format_amount, parse_address, parse_tx_hash},
};
use alloy::primitives::{Address, B256};
use boost::BoostGrant;
use chrono::{Local, Utc};
use disburse::PayoutStatus;
use oracle::{REJECTED_TIER, TierSource};
use std::sync::Arc;
use tracing::{error, info, warn};
use verifier::Offering;

/// One inbound settlement request, as accepted by the API surface.
#[derive(Debug, Clone)]
pub struct SettleRequest {
    pub tx_hash: String,
    pub wish: String,
    pub boost_tx_hash: Option<String>,
    pub network: Option<String>,
}

/// The settlement pipeline. Each request is an independent unit of work; the
/// only shared state lives behind the store collaborator.
pub struct Pipeline {
    networks: Networks,
    store: Arc<dyn SettlementStore>,
    judge: JudgeClient,
}

impl Pipeline {
    pub fn new(networks: Networks, store: Arc<dyn SettlementStore>, judge: JudgeClient) -> Self {
        Self {
            networks,
            store,
            judge,
        }
    }

    pub fn networks(&self) -> &Networks {
        &self.networks
    }

    /// Settle one offering end to end: resolve, verify, guard, validate,
    /// penalize, boost, decide, pay out, record. Errors returned here were
    /// raised before any record was due; business rejections come back as
    /// tier-0 records, not errors.
    pub async fn settle(&self, request: SettleRequest) -> Result<SettlementRecord> {
        let tx_hash = parse_tx_hash(&request.tx_hash)?;
        let hash_key = request.tx_hash.to_lowercase();

        // Both hashes are validated before anything is written: a malformed
        // boost hash is an input error and must not consume the offering.
        let boost_input = match &request.boost_tx_hash {
            Some(raw) => Some((parse_tx_hash(raw)?, raw.to_lowercase())),
            None => None,
        };

        // Fast-path duplicate check; the authoritative gate is the atomic
        // mark below.
        if self.store.is_processed(&hash_key).await? {
            return Err(Error::AlreadyProcessed(hash_key));
        }

        let network = self
            .networks
            .resolve(tx_hash, request.network.as_deref())
            .await?;

        let offering = verifier::verify_offering(network, tx_hash).await?;

        if !self
            .store
            .try_mark_processed(&hash_key, network.name())
            .await?
        {
            return Err(Error::AlreadyProcessed(hash_key));
        }

        let amount = format_amount(offering.value);
        info!(
            network = network.name(),
            tx = %hash_key,
            sender = %offering.from,
            amount = %amount,
            "offering verified"
        );

        if offering.value < network.min_offering() {
            return self
                .record_rejection(
                    network,
                    &hash_key,
                    &offering,
                    &amount,
                    oracle::BELOW_MINIMUM_LABEL,
                    blessings::BELOW_MINIMUM_BLESSING,
                )
                .await;
        }

        if !amount.contains('8') {
            return self
                .record_rejection(
                    network,
                    &hash_key,
                    &offering,
                    &amount,
                    oracle::MISSING_EIGHT_LABEL,
                    blessings::MISSING_EIGHT_BLESSING,
                )
                .await;
        }

        let penalties = penalty::assess(&Local::now(), &amount);
        if !penalties.is_clear() {
            info!(tx = %hash_key, penalties = ?penalties.labels, multiplier = penalties.multiplier, "penalties active");
        }

        let boost = match &boost_input {
            Some((hash, key)) => self.evaluate_boost(network, *hash, key, offering.from).await?,
            None => None,
        };
        let rerolls = boost.as_ref().map_or(0, |grant| grant.rerolls);

        let reserve = network.client.get_balance(network.treasury()).await?;
        let reserve_display = format_amount(reserve);

        let context = JudgeContext {
            offering: &amount,
            currency: &network.settings.currency,
            wish: &request.wish,
            penalties: &penalties.labels,
            penalty_multiplier: penalties.multiplier,
            reserve: &reserve_display,
            boost: boost.as_ref(),
        };

        let decision = match self.judge.consult(&context).await {
            Some(verdict) => oracle::from_judge(verdict.tier, verdict.blessing, boost.is_some()),
            None => oracle::fallback_decision(
                &hash_key,
                &request.wish,
                penalties.multiplier,
                rerolls,
            ),
        };

        let payout = payout::compute(decision.tier, offering.value, reserve);
        let disbursement = disburse::run(network, offering.from, payout).await;

        let spec = oracle::tier_spec(decision.tier);
        let record = SettlementRecord {
            sender: format!("{:#x}", offering.from),
            tx_hash: hash_key.clone(),
            network: network.name().to_string(),
            amount_wei: offering.value.to_string(),
            amount,
            outcome: spec.label.to_string(),
            tier: decision.tier,
            tier_source: decision.source,
            blessing: decision.blessing,
            payout_wei: payout.to_string(),
            payout_tx_hash: disbursement.tx_hash.map(|hash| format!("{hash:#x}")),
            payout_status: disbursement.status,
            penalties: penalties.labels,
            penalty_multiplier: penalties.multiplier,
            boost,
            explorer_url: network.explorer_tx_url(&hash_key),
            timestamp: Utc::now().timestamp_millis(),
        };

        info!(
            tx = %hash_key,
            tier = record.tier,
            outcome = %record.outcome,
            payout = %record.payout_wei,
            status = record.payout_status.as_str(),
            "settlement complete"
        );
        metrics::counter!("caishen_settlements", "tier" => record.tier.to_string()).increment(1);

        self.insert_record(&record).await;
        Ok(record)
    }

    /// Settlements for one sender, newest first.
    pub async fn history(&self, sender: &str) -> Result<Vec<SettlementRecord>> {
        parse_address(sender)?;
        self.store.list_by_address(&sender.to_lowercase()).await
    }

    /// Convert a parsed boost transaction into reroll attempts. A boost that
    /// fails verification is logged and dropped; a boost hash that was
    /// already processed kills the whole request.
    async fn evaluate_boost(
        &self,
        network: &NetworkHandle,
        boost_hash: B256,
        boost_key: &str,
        offering_sender: Address,
    ) -> Result<Option<BoostGrant>> {
        if self.store.is_processed(boost_key).await? {
            return Err(Error::AlreadyProcessed(boost_key.to_string()));
        }

        match verifier::verify_boost(network, boost_hash, offering_sender).await {
            Ok(transfer) => {
                if !self
                    .store
                    .try_mark_processed(boost_key, network.name())
                    .await?
                {
                    return Err(Error::AlreadyProcessed(boost_key.to_string()));
                }

                let grant = boost::evaluate(transfer.token_amount, boost_key);
                match &grant {
                    Some(grant) => info!(
                        boost_tx = %boost_key,
                        rerolls = grant.rerolls,
                        label = %grant.label,
                        "boost granted"
                    ),
                    None => info!(boost_tx = %boost_key, "boost below smallest threshold"),
                }
                Ok(grant)
            }
            Err(err) => {
                warn!(boost_tx = %boost_key, ?err, "boost verification failed, proceeding without rerolls");
                Ok(None)
            }
        }
    }

    /// Business rejections are recorded outcomes, not pipeline errors:
    /// tier 0, no payout, no randomness involved.
    async fn record_rejection(
        &self,
        network: &NetworkHandle,
        hash_key: &str,
        offering: &Offering,
        amount: &str,
        label: &str,
        blessing: &str,
    ) -> Result<SettlementRecord> {
        info!(tx = %hash_key, outcome = label, "offering rejected");

        let record = SettlementRecord {
            sender: format!("{:#x}", offering.from),
            tx_hash: hash_key.to_string(),
            network: network.name().to_string(),
            amount_wei: offering.value.to_string(),
            amount: amount.to_string(),
            outcome: label.to_string(),
            tier: REJECTED_TIER,
            tier_source: TierSource::Fallback,
            blessing: blessing.to_string(),
            payout_wei: "0".to_string(),
            payout_tx_hash: None,
            payout_status: PayoutStatus::NoReturn,
            penalties: Vec::new(),
            penalty_multiplier: 1.0,
            boost: None,
            explorer_url: network.explorer_tx_url(hash_key),
            timestamp: Utc::now().timestamp_millis(),
        };

        metrics::counter!("caishen_settlements", "tier" => "0").increment(1);
        self.insert_record(&record).await;
        Ok(record)
    }

    /// Observability must never block returning a result to a participant
    /// who already has money in flight.
    async fn insert_record(&self, record: &SettlementRecord) {
        if let Err(err) = self.store.insert_settlement(record).await {
            error!(tx = %record.tx_hash, ?err, "failed to persist settlement record");
            metrics::counter!("caishen_record_write_failures").increment(1);
        }
    }
}
