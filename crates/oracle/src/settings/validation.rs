use crate::{
    settings::Settings,
    util::{parse_address, parse_amount},
};
use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Validate the configuration values
pub fn validate_config(settings: &Settings) -> Result<()> {
    if settings.networks.is_empty() {
        bail!("At least one network must be configured");
    }

    let mut seen = HashSet::new();
    for network in &settings.networks {
        if network.name.is_empty() {
            bail!("Network name cannot be empty");
        }

        if !seen.insert(network.name.as_str()) {
            bail!("Duplicate network name '{}'", network.name);
        }

        if !network.rpc_url.starts_with("http://") && !network.rpc_url.starts_with("https://") {
            bail!(
                "RPC URL for network '{}' must start with http:// or https://",
                network.name
            );
        }

        parse_address(&network.treasury_address).with_context(|| {
            format!("Invalid treasury address for network '{}'", network.name)
        })?;

        if let Some(token) = &network.boost_token {
            parse_address(token).with_context(|| {
                format!("Invalid boost token address for network '{}'", network.name)
            })?;
        }

        parse_amount(&network.min_offering).with_context(|| {
            format!("Invalid minimum offering for network '{}'", network.name)
        })?;
    }

    if settings.store.url.is_empty() {
        bail!("Store URL cannot be empty");
    }

    if settings.judge.timeout_secs == 0 {
        bail!("Judge timeout must be greater than 0");
    }

    Ok(())
}
