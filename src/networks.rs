//! Static network registry
//!
//! Maps chain ids to the connection endpoint and bridge contract for every
//! chain this process relays. Loaded once at startup from indexed
//! environment variables and passed into every relayer; claim construction
//! resolves destination bridge addresses through it.

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use std::collections::BTreeMap;

/// Configuration for a single bridged network
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Human-readable name (e.g., "sepolia", "base-sepolia")
    pub name: String,
    /// Native EVM chain ID
    pub chain_id: u64,
    /// WebSocket endpoint for the live event subscription
    pub ws_url: String,
    /// Bridge contract address on this chain
    pub bridge_address: Address,
}

/// Chain-id-keyed registry over the configured networks
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<u64, NetworkConfig>,
}

impl NetworkRegistry {
    /// Create a registry, rejecting duplicate chain ids
    pub fn new(networks: Vec<NetworkConfig>) -> Result<Self> {
        let mut map = BTreeMap::new();

        for network in networks {
            if network.ws_url.is_empty() {
                return Err(eyre!("network {}: ws_url cannot be empty", network.name));
            }
            if let Some(previous) = map.insert(network.chain_id, network) {
                return Err(eyre!(
                    "duplicate chain ID {} ({})",
                    previous.chain_id,
                    previous.name
                ));
            }
        }

        if map.is_empty() {
            return Err(eyre!("at least one network must be configured"));
        }

        Ok(Self { networks: map })
    }

    /// Get the network config for a chain id
    pub fn get(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id)
    }

    /// Iterate over all configured networks
    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.values()
    }

    /// Number of configured networks
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Load the network registry from environment variables
///
/// Expects `NETWORKS_COUNT` and, for each i in 1..=count:
/// `NETWORK_<i>_NAME`, `NETWORK_<i>_CHAIN_ID`, `NETWORK_<i>_WS_URL`,
/// `NETWORK_<i>_BRIDGE_ADDRESS`.
pub fn load_from_env() -> Result<NetworkRegistry> {
    let count: usize = std::env::var("NETWORKS_COUNT")
        .map_err(|_| eyre!("NETWORKS_COUNT environment variable is required"))?
        .parse()
        .wrap_err("NETWORKS_COUNT must be a valid integer")?;

    let mut networks = Vec::with_capacity(count);

    for i in 1..=count {
        let prefix = format!("NETWORK_{}", i);

        let name =
            std::env::var(format!("{}_NAME", prefix)).unwrap_or_else(|_| format!("chain_{}", i));

        let chain_id: u64 = std::env::var(format!("{}_CHAIN_ID", prefix))
            .map_err(|_| eyre!("Missing {}_CHAIN_ID", prefix))?
            .parse()
            .map_err(|_| eyre!("Invalid {}_CHAIN_ID", prefix))?;

        let ws_url = std::env::var(format!("{}_WS_URL", prefix))
            .map_err(|_| eyre!("Missing {}_WS_URL", prefix))?;

        let bridge_address: Address = std::env::var(format!("{}_BRIDGE_ADDRESS", prefix))
            .map_err(|_| eyre!("Missing {}_BRIDGE_ADDRESS", prefix))?
            .parse()
            .map_err(|_| eyre!("Invalid {}_BRIDGE_ADDRESS", prefix))?;

        networks.push(NetworkConfig {
            name,
            chain_id,
            ws_url,
            bridge_address,
        });
    }

    NetworkRegistry::new(networks)
}
