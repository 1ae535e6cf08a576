//! Multi-chain coordinator
//!
//! Fans out one relayer task per configured network and exposes one combined
//! lifecycle handle. Construction spawns every relayer immediately; none of
//! them blocks startup on its chain becoming ready.

use std::sync::Arc;
use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use eyre::{eyre, Result, WrapErr};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::claims::ClaimStore;
use crate::config::Config;
use crate::networks::NetworkRegistry;
use crate::relayer::Relayer;
use crate::sink::ChainLogSink;

/// Lifecycle handle for one spawned relayer
pub struct RelayerHandle {
    name: String,
    chain_id: u64,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RelayerHandle {
    /// Signal the relayer to stop. Idempotent; safe to call more than once.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Runs one relayer per configured network against the shared claim store.
pub struct MultiChainRelayer {
    handles: Vec<RelayerHandle>,
}

impl MultiChainRelayer {
    /// Spawn one relayer task per registry entry. Each starts connecting
    /// immediately and independently.
    pub fn new(
        config: &Config,
        registry: Arc<NetworkRegistry>,
        store: Arc<ClaimStore>,
    ) -> Result<Self> {
        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .wrap_err("Invalid relayer private key")?;
        info!(relayer_address = %signer.address(), "Relayer signer initialized");

        let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);
        let mut handles = Vec::new();

        for network in registry.iter() {
            let sink = match ChainLogSink::open(&config.log_dir, network.chain_id) {
                Ok(sink) => sink,
                Err(e) => {
                    warn!(
                        chain = %network.name,
                        chain_id = network.chain_id,
                        error = %e,
                        "Failed to open chain log sink; continuing without this chain"
                    );
                    continue;
                }
            };

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let relayer = Relayer::new(
                network.clone(),
                Arc::clone(&registry),
                Arc::clone(&store),
                signer.clone(),
                sink,
                reconnect_delay,
                shutdown_rx,
            );

            let task = tokio::spawn(relayer.run());
            info!(
                chain = %network.name,
                chain_id = network.chain_id,
                "Started relayer"
            );

            handles.push(RelayerHandle {
                name: network.name.clone(),
                chain_id: network.chain_id,
                shutdown: shutdown_tx,
                task,
            });
        }

        if handles.is_empty() {
            return Err(eyre!("no relayers could be started"));
        }

        info!(relayers = handles.len(), "Multi-chain relayer started");
        Ok(Self { handles })
    }

    /// Block until the process-level shutdown signal, then stop every child.
    pub async fn run(self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        let _ = shutdown.recv().await;
        info!("Shutdown signal received, stopping relayers");
        self.stop().await;
        Ok(())
    }

    /// Best-effort stop of all relayers. Every child is signalled before any
    /// is awaited, and a failure on one does not prevent stopping the rest.
    pub async fn stop(self) {
        for handle in &self.handles {
            handle.stop();
        }

        for handle in self.handles {
            match handle.task.await {
                Ok(()) => info!(
                    chain = %handle.name,
                    chain_id = handle.chain_id,
                    "Relayer stopped"
                ),
                Err(e) => error!(
                    chain = %handle.name,
                    chain_id = handle.chain_id,
                    error = %e,
                    "Relayer task failed during shutdown"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::NetworkConfig;
    use alloy::primitives::address;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            private_key:
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
            claims_file: dir
                .path()
                .join("claims.json")
                .to_string_lossy()
                .into_owned(),
            log_dir: dir.path().to_string_lossy().into_owned(),
            reconnect_delay_ms: 100,
            api_port: 0,
        }
    }

    fn unreachable_registry() -> Arc<NetworkRegistry> {
        // nothing listens on these ports; relayers cycle in their reconnect
        // loops until stopped
        Arc::new(
            NetworkRegistry::new(vec![
                NetworkConfig {
                    name: "one".to_string(),
                    chain_id: 31337,
                    ws_url: "ws://127.0.0.1:9".to_string(),
                    bridge_address: address!("0000000000000000000000000000000000000001"),
                },
                NetworkConfig {
                    name: "two".to_string(),
                    chain_id: 31338,
                    ws_url: "ws://127.0.0.1:9".to_string(),
                    bridge_address: address!("0000000000000000000000000000000000000002"),
                },
            ])
            .unwrap(),
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawns_one_relayer_per_network_and_stops_cleanly() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let registry = unreachable_registry();
        let store = Arc::new(ClaimStore::load(&config.claims_file));

        let coordinator =
            MultiChainRelayer::new(&config, Arc::clone(&registry), store).unwrap();
        assert_eq!(coordinator.handles.len(), 2);

        // stop is idempotent per child
        coordinator.handles[0].stop();
        coordinator.handles[0].stop();

        tokio::time::timeout(Duration::from_secs(10), coordinator.stop())
            .await
            .expect("coordinated stop should complete");

        // both chain sinks were created
        assert!(dir.path().join("relayer-31337.log").exists());
        assert!(dir.path().join("relayer-31338.log").exists());
    }

    #[tokio::test]
    async fn test_invalid_private_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.private_key = "0xnot-a-key".to_string();
        let store = Arc::new(ClaimStore::load(&config.claims_file));

        assert!(MultiChainRelayer::new(&config, unreachable_registry(), store).is_err());
    }
}
