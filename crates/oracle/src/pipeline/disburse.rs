use crate::ledger::resolver::NetworkHandle;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Tier paid nothing; no transfer was attempted
    NoReturn,
    /// Payout due but no signer is configured for the network
    NoWallet,
    Confirmed,
    /// Submission or confirmation failed; left for manual reconciliation
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::NoReturn => "no_return",
            PayoutStatus::NoWallet => "no_wallet",
            PayoutStatus::Confirmed => "confirmed",
            PayoutStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Disbursement {
    pub status: PayoutStatus,
    pub tx_hash: Option<B256>,
}

/// Submit the payout and track it to a terminal status. At-most-once and
/// never retried: a recorded failure is preferred over a blind second
/// transfer. Once broadcast, the hash is recorded even when confirmation
/// never resolves.
pub async fn run(network: &NetworkHandle, to: Address, payout: U256) -> Disbursement {
    if payout.is_zero() {
        return Disbursement {
            status: PayoutStatus::NoReturn,
            tx_hash: None,
        };
    }

    if !network.has_signer() {
        info!(network = network.name(), "read-only deployment, skipping payout");
        return Disbursement {
            status: PayoutStatus::NoWallet,
            tx_hash: None,
        };
    }

    let hash = match network.client.send_value(to, payout).await {
        Ok(hash) => hash,
        Err(err) => {
            error!(network = network.name(), %to, %payout, ?err, "payout submission failed");
            metrics::counter!("caishen_payout_failures").increment(1);
            return Disbursement {
                status: PayoutStatus::Failed,
                tx_hash: None,
            };
        }
    };

    match network.client.await_confirmation(hash).await {
        Ok(true) => {
            info!(network = network.name(), %to, %payout, %hash, "payout confirmed");
            Disbursement {
                status: PayoutStatus::Confirmed,
                tx_hash: Some(hash),
            }
        }
        Ok(false) => {
            error!(network = network.name(), %hash, "payout reverted on-chain");
            metrics::counter!("caishen_payout_failures").increment(1);
            Disbursement {
                status: PayoutStatus::Failed,
                tx_hash: Some(hash),
            }
        }
        Err(err) => {
            error!(network = network.name(), %hash, ?err, "payout confirmation unresolved");
            metrics::counter!("caishen_payout_failures").increment(1);
            Disbursement {
                status: PayoutStatus::Failed,
                tx_hash: Some(hash),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ledger::MockLedgerRpc, ledger::resolver::NetworkHandle, settings::NetworkSettings};
    use std::sync::Arc;

    fn network(client: MockLedgerRpc, signer: bool) -> NetworkHandle {
        NetworkHandle::new(
            NetworkSettings {
                name: "monad".to_string(),
                rpc_url: "https://rpc.example.org".to_string(),
                chain_id: 143,
                treasury_address: "0x00000000000000000000000000000000000088a8".to_string(),
                explorer_url: "https://explorer.example.org".to_string(),
                min_offering: "0.8".to_string(),
                currency: "MON".to_string(),
                signer_key: signer.then(|| "0x01".repeat(32)),
                boost_token: None,
            },
            Arc::new(client),
        )
        .unwrap()
    }

    fn recipient() -> Address {
        Address::repeat_byte(0x22)
    }

    #[tokio::test]
    async fn zero_payout_skips_the_ledger() {
        let network = network(MockLedgerRpc::new(), true);
        let result = run(&network, recipient(), U256::ZERO).await;
        assert_eq!(result.status, PayoutStatus::NoReturn);
        assert!(result.tx_hash.is_none());
    }

    #[tokio::test]
    async fn missing_signer_reports_no_wallet() {
        let network = network(MockLedgerRpc::new(), false);
        let result = run(&network, recipient(), U256::from(100u64)).await;
        assert_eq!(result.status, PayoutStatus::NoWallet);
        assert!(result.tx_hash.is_none());
    }

    #[tokio::test]
    async fn confirmed_payout_carries_its_hash() {
        let hash = B256::repeat_byte(0x77);
        let mut client = MockLedgerRpc::new();
        client
            .expect_send_value()
            .times(1)
            .returning(move |_, _| Ok(hash));
        client
            .expect_await_confirmation()
            .times(1)
            .returning(|_| Ok(true));
        let network = network(client, true);

        let result = run(&network, recipient(), U256::from(100u64)).await;
        assert_eq!(result.status, PayoutStatus::Confirmed);
        assert_eq!(result.tx_hash, Some(hash));
    }

    #[tokio::test]
    async fn submission_failure_is_recorded_not_retried() {
        let mut client = MockLedgerRpc::new();
        client
            .expect_send_value()
            .times(1)
            .returning(|_, _| Err(Error::ConfirmationTimeout("broadcast failed".to_string())));
        let network = network(client, true);

        let result = run(&network, recipient(), U256::from(100u64)).await;
        assert_eq!(result.status, PayoutStatus::Failed);
        assert!(result.tx_hash.is_none());
    }

    #[tokio::test]
    async fn unresolved_confirmation_keeps_the_broadcast_hash() {
        let hash = B256::repeat_byte(0x77);
        let mut client = MockLedgerRpc::new();
        client
            .expect_send_value()
            .times(1)
            .returning(move |_, _| Ok(hash));
        client
            .expect_await_confirmation()
            .times(1)
            .returning(move |h| Err(Error::ConfirmationTimeout(format!("{h:#x}"))));
        let network = network(client, true);

        let result = run(&network, recipient(), U256::from(100u64)).await;
        assert_eq!(result.status, PayoutStatus::Failed);
        assert_eq!(result.tx_hash, Some(hash));
    }
}
