pub mod evm;
pub mod resolver;

use crate::Result;
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use mockall::automock;

/// Receipt facts the pipeline trusts the RPC collaborator for. The oracle
/// never validates ledger state itself.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
}

/// Body of a fetched transaction, reduced to the fields the verifier rules on.
#[derive(Debug, Clone, Copy)]
pub struct TxBody {
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
}

/// Ledger RPC collaborator. One instance per configured network.
#[automock]
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch the receipt for a transaction hash; `None` means the ledger has
    /// never seen the hash (or it is still pending).
    async fn get_receipt(&self, hash: B256) -> Result<Option<TxReceipt>>;

    /// Fetch the transaction body for a hash.
    async fn get_transaction(&self, hash: B256) -> Result<Option<TxBody>>;

    /// Current native balance of an address, in smallest units.
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Broadcast a native value transfer from the configured signer.
    async fn send_value(&self, to: Address, amount: U256) -> Result<B256>;

    /// Block until the hash is mined, returning its success flag. Errors with
    /// `ConfirmationTimeout` if the receipt never appears within the polling
    /// window; by then the transaction may still land, so callers must record
    /// the hash regardless.
    async fn await_confirmation(&self, hash: B256) -> Result<bool>;
}
