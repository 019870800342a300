use crate::{
    Error, Result,
    ledger::{LedgerRpc, LogEntry, TxBody, TxReceipt},
    settings::NetworkSettings,
};
use alloy::{
    consensus::Transaction as _,
    network::{EthereumWallet, TransactionBuilder, TransactionResponse as _},
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::{future::Future, time::Duration};
use tracing::warn;
use url::Url;

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(2);
const CONFIRM_MAX_ATTEMPTS: u32 = 60;

/// EVM JSON-RPC ledger client for one configured network.
pub struct EvmLedger {
    provider: DynProvider,
}

impl EvmLedger {
    pub fn connect(settings: &NetworkSettings) -> Result<Self> {
        let url: Url = settings.rpc_url.parse()?;

        let provider = match settings.signer_key.as_deref() {
            Some(key) => {
                let signer: PrivateKeySigner = key.trim_start_matches("0x").parse()?;
                let wallet = EthereumWallet::from(signer);
                ProviderBuilder::new().wallet(wallet).connect_http(url).erased()
            }
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        Ok(Self { provider })
    }
}

#[async_trait]
impl LedgerRpc for EvmLedger {
    async fn get_receipt(&self, hash: B256) -> Result<Option<TxReceipt>> {
        let receipt = rpc_with_retry(
            || async { Ok(self.provider.get_transaction_receipt(hash).await?) },
            "get_transaction_receipt",
        )
        .await?;

        Ok(receipt.map(|receipt| TxReceipt {
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| LogEntry {
                    address: log.address(),
                    topics: log.topics().to_vec(),
                    data: log.data().data.to_vec(),
                })
                .collect(),
        }))
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<TxBody>> {
        let tx = rpc_with_retry(
            || async { Ok(self.provider.get_transaction_by_hash(hash).await?) },
            "get_transaction_by_hash",
        )
        .await?;

        Ok(tx.map(|tx| TxBody {
            from: tx.from(),
            to: tx.to(),
            value: tx.value(),
        }))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        rpc_with_retry(
            || async { Ok(self.provider.get_balance(address).await?) },
            "get_balance",
        )
        .await
    }

    async fn send_value(&self, to: Address, amount: U256) -> Result<B256> {
        // Deliberately no retry: a transfer must be broadcast at most once.
        let request = TransactionRequest::default().with_to(to).with_value(amount);
        let pending = self.provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn await_confirmation(&self, hash: B256) -> Result<bool> {
        for _ in 0..CONFIRM_MAX_ATTEMPTS {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(receipt.status());
            }
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
        Err(Error::ConfirmationTimeout(format!("{hash:#x}")))
    }
}

async fn rpc_with_retry<F, Fut, T>(operation: F, label: &'static str) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut op = operation;
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(250))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(3)
        .with_jitter();

    (move || op())
        .retry(backoff)
        .when(should_retry)
        .notify(|err: &Error, delay: Duration| {
            warn!(retry_in = ?delay, error = ?err, operation = label, "transient RPC failure");
        })
        .await
}

fn should_retry(err: &Error) -> bool {
    matches!(err, Error::Rpc(rpc) if rpc.is_transport_error())
}
