pub mod validation;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr, path::Path};
use validation::validate_config;

/// Main settings configuration for the caishen oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter directive (e.g., "info", "caishen_oracle=debug")
    pub log: String,
    /// Address the HTTP API binds to (e.g., "0.0.0.0:8080")
    pub listen: String,
    /// Optional address for the Prometheus metrics exporter
    #[serde(default)]
    pub metrics_listen: Option<String>,
    /// Durable store configuration
    pub store: StoreSettings,
    /// External AI judge configuration
    #[serde(default)]
    pub judge: JudgeSettings,
    /// Configured ledger networks, probed in declaration order
    pub networks: Vec<NetworkSettings>,
}

/// Durable store (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
}

/// External AI judge configuration
///
/// With no API key configured the judge is skipped entirely and every tier
/// decision takes the deterministic fallback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSettings {
    /// OpenAI-compatible chat completions endpoint
    pub api_url: String,
    /// Bearer token; absent means "judge disabled"
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier passed through to the endpoint
    pub model: String,
    /// Hard timeout for a single judge consultation, in seconds
    pub timeout_secs: u64,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.moonshot.ai/v1/chat/completions".to_string(),
            api_key: None,
            model: "kimi-k2.5".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Per-network ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Network key used in requests and records (e.g., "monad")
    pub name: String,
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Chain id, logged and validated at startup
    pub chain_id: u64,
    /// Treasury ("house wallet") address offerings must be sent to
    pub treasury_address: String,
    /// Block explorer base URL for settlement record links
    pub explorer_url: String,
    /// Minimum accepted offering, human decimal (e.g., "0.8")
    pub min_offering: String,
    /// Native currency symbol for display
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Private key for the disbursement signer; absent means read-only
    /// deployment (payouts recorded as no_wallet)
    #[serde(default)]
    pub signer_key: Option<String>,
    /// Reward-token contract address accepted for boost transfers
    #[serde(default)]
    pub boost_token: Option<String>,
}

fn default_currency() -> String {
    "MON".to_string()
}

impl Settings {
    /// Load configuration from a specific config file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Construct settings, env vars take priority still
        let settings = ConfigBuilder::builder()
            .add_source(File::with_name(&path.as_ref().to_string_lossy()))
            .add_source(
                Environment::with_prefix("CAISHEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        validate_config(&settings)?;

        Ok(settings)
    }

    /// Load configuration from environment variables alone
    pub fn from_env() -> Result<Self> {
        // NOTE: It's ok if this fails (file might not exist)
        let _ = dotenvy::dotenv();

        let settings: Settings = ConfigBuilder::builder()
            .add_source(
                Environment::with_prefix("CAISHEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        validate_config(&settings)?;

        Ok(settings)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.listen))
    }

    pub fn metrics_addr(&self) -> Result<Option<SocketAddr>> {
        self.metrics_listen
            .as_ref()
            .map(|addr| {
                addr.parse()
                    .with_context(|| format!("invalid metrics address: {addr}"))
            })
            .transpose()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings {{\n\
             \tLog: {}\n\
             \tListen: {}\n\
             \tStore URL: {}\n\
             \tJudge URL: {}\n\
             \tJudge enabled: {}\n\
             \tNetworks: {}\n\
             }}",
            self.log,
            self.listen,
            self.store.url,
            self.judge.api_url,
            self.judge.api_key.is_some(),
            self.networks
                .iter()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
