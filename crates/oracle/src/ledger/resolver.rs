use crate::{
    Error, Result,
    ledger::LedgerRpc,
    settings::NetworkSettings,
    util::{parse_address, parse_amount},
};
use alloy::primitives::{Address, B256, U256};
use std::sync::Arc;
use tracing::{debug, warn};

/// One configured network with its parsed entry rules and RPC client.
pub struct NetworkHandle {
    pub settings: NetworkSettings,
    pub client: Arc<dyn LedgerRpc>,
    treasury: Address,
    min_offering: U256,
    boost_token: Option<Address>,
}

impl NetworkHandle {
    pub fn new(settings: NetworkSettings, client: Arc<dyn LedgerRpc>) -> Result<Self> {
        let treasury = parse_address(&settings.treasury_address)?;
        let min_offering = parse_amount(&settings.min_offering)?;
        let boost_token = settings
            .boost_token
            .as_deref()
            .map(parse_address)
            .transpose()?;

        Ok(Self {
            settings,
            client,
            treasury,
            min_offering,
            boost_token,
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn min_offering(&self) -> U256 {
        self.min_offering
    }

    pub fn boost_token(&self) -> Option<Address> {
        self.boost_token
    }

    pub fn has_signer(&self) -> bool {
        self.settings.signer_key.is_some()
    }

    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!(
            "{}/tx/{}",
            self.settings.explorer_url.trim_end_matches('/'),
            hash
        )
    }
}

/// The configured network set. Probing happens in configuration order and
/// the first network that knows the hash wins.
pub struct Networks {
    entries: Vec<NetworkHandle>,
}

impl Networks {
    pub fn new(entries: Vec<NetworkHandle>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkHandle> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&NetworkHandle> {
        self.entries.iter().find(|handle| handle.name() == name)
    }

    /// Resolve which network a transaction hash belongs to. A hint naming a
    /// configured network short-circuits the probe; an unrecognized hint
    /// falls through to probing.
    pub async fn resolve(&self, hash: B256, hint: Option<&str>) -> Result<&NetworkHandle> {
        if let Some(hint) = hint {
            if let Some(handle) = self.get(hint) {
                return Ok(handle);
            }
        }

        for handle in &self.entries {
            match handle.client.get_receipt(hash).await {
                Ok(Some(_)) => {
                    debug!(network = handle.name(), %hash, "resolved transaction network");
                    return Ok(handle);
                }
                Ok(None) => continue,
                // A probe failure on one network must not mask the others.
                Err(err) => {
                    warn!(network = handle.name(), %hash, ?err, "network probe failed");
                    continue;
                }
            }
        }

        Err(Error::TransactionNotFound(format!("{hash:#x}")))
    }
}
