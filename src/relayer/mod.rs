//! Per-chain event relayer
//!
//! Each relayer owns one live WebSocket subscription to its chain's bridge
//! contract, turns every qualifying event into a signed claim in the shared
//! store, and stays connected through transient failures with a fixed-backoff
//! reconnect loop. One malformed event, one unresolvable claim, or one store
//! failure never takes the subscription down; only an explicit stop does.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::{Filter, Log};
use alloy::signers::local::PrivateKeySigner;
use chrono::Utc;
use eyre::{Result, WrapErr};
use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::Sleep;

use crate::claims::ClaimStore;
use crate::errors::{EventDecodeError, StoreError};
use crate::events::decode_bridge_event;
use crate::metrics;
use crate::networks::{NetworkConfig, NetworkRegistry};
use crate::sink::ChainLogSink;

pub mod claim;
pub mod multi;

pub use multi::MultiChainRelayer;

/// Connection lifecycle of a relayer.
///
/// `Stopped` is terminal and reachable from every other state via `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayerState {
    Disconnected,
    Connecting,
    Listening,
    Stopped,
}

impl RelayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayerState::Disconnected => "disconnected",
            RelayerState::Connecting => "connecting",
            RelayerState::Listening => "listening",
            RelayerState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for RelayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-pending reconnect timer.
///
/// Arming replaces any previously pending timer, so two socket errors in
/// quick succession still produce exactly one scheduled reconnect.
struct ReconnectTimer {
    delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl ReconnectTimer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Arm the timer, cancelling any pending one.
    fn arm(&mut self) {
        self.pending = Some(Box::pin(tokio::time::sleep(self.delay)));
    }

    /// Cancel the pending timer, if any.
    fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve when the armed timer fires; pends forever when disarmed.
    async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.pending = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

enum ListenExit {
    Shutdown,
    Disconnected,
}

/// Per-chain relayer.
pub struct Relayer {
    network: NetworkConfig,
    registry: Arc<NetworkRegistry>,
    store: Arc<ClaimStore>,
    signer: PrivateKeySigner,
    sink: ChainLogSink,
    state: RelayerState,
    reconnect: ReconnectTimer,
    shutdown: watch::Receiver<bool>,
    chain_label: String,
}

impl Relayer {
    /// Create a relayer for one network. Connection happens in `run`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network: NetworkConfig,
        registry: Arc<NetworkRegistry>,
        store: Arc<ClaimStore>,
        signer: PrivateKeySigner,
        sink: ChainLogSink,
        reconnect_delay: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let chain_label = network.name.clone();
        Self {
            network,
            registry,
            store,
            signer,
            sink,
            state: RelayerState::Disconnected,
            reconnect: ReconnectTimer::new(reconnect_delay),
            shutdown,
            chain_label,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id
    }

    pub fn state(&self) -> RelayerState {
        self.state
    }

    /// Run the connect/listen/reconnect loop until stopped.
    pub async fn run(mut self) {
        self.sink.append("Initializing...");

        loop {
            if self.should_stop() {
                break;
            }

            self.set_state(RelayerState::Connecting);
            match self.connect_and_listen().await {
                Ok(ListenExit::Shutdown) => break,
                Ok(ListenExit::Disconnected) => {
                    self.set_state(RelayerState::Disconnected);
                    metrics::set_connected(&self.chain_label, false);
                }
                Err(e) => {
                    self.sink.append(&format!("Connection error: {}", e));
                    tracing::error!(
                        chain_id = self.network.chain_id,
                        error = %e,
                        "Connection error"
                    );
                    metrics::record_error(&self.chain_label, "connection");
                    self.set_state(RelayerState::Disconnected);
                    metrics::set_connected(&self.chain_label, false);
                }
            }

            self.reconnect.arm();
            tokio::select! {
                _ = self.reconnect.fired() => {
                    self.sink.append("Reconnecting...");
                    metrics::record_reconnect(&self.chain_label);
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.teardown();
    }

    /// Open the WS subscription and process logs until it drops or we stop.
    async fn connect_and_listen(&mut self) -> Result<ListenExit> {
        self.sink.append(&format!(
            "Connecting to network: {} ({})",
            self.network.name, self.network.chain_id
        ));
        tracing::info!(
            chain = %self.network.name,
            chain_id = self.network.chain_id,
            "Connecting to network"
        );

        let ws = WsConnect::new(self.network.ws_url.clone());
        let provider = ProviderBuilder::new()
            .on_ws(ws)
            .await
            .wrap_err_with(|| format!("Failed to connect to {}", self.network.ws_url))?;

        let filter = Filter::new().address(self.network.bridge_address);
        let subscription = provider
            .subscribe_logs(&filter)
            .await
            .wrap_err("Failed to subscribe to bridge contract logs")?;
        let mut stream = subscription.into_stream();

        self.set_state(RelayerState::Listening);
        metrics::set_connected(&self.chain_label, true);
        self.sink
            .append(&format!("Connected to network: {}", self.network.ws_url));
        tracing::info!(
            chain = %self.network.name,
            chain_id = self.network.chain_id,
            "Listening for bridge events"
        );

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        return Ok(ListenExit::Shutdown);
                    }
                }
                item = stream.next() => match item {
                    Some(log) => self.handle_log(log).await,
                    None => {
                        self.sink.append("Connection closed. Attempting to reconnect...");
                        tracing::warn!(
                            chain_id = self.network.chain_id,
                            "Subscription closed"
                        );
                        return Ok(ListenExit::Disconnected);
                    }
                }
            }
        }
    }

    /// Turn one raw log into a stored claim. Every failure here affects this
    /// event only; the caller keeps the subscription alive.
    pub async fn handle_log(&self, log: Log) {
        let event = match decode_bridge_event(&log) {
            Ok(event) => event,
            Err(EventDecodeError::UnknownSignature(signature)) => {
                tracing::debug!(
                    chain_id = self.network.chain_id,
                    signature = %signature,
                    "Ignoring unrelated contract event"
                );
                return;
            }
            Err(e) => {
                self.sink
                    .append(&format!("ERROR: dropping malformed event: {}", e));
                tracing::error!(
                    chain_id = self.network.chain_id,
                    error = %e,
                    "Failed to decode bridge event, dropping"
                );
                metrics::record_error(&self.chain_label, "decode");
                return;
            }
        };

        metrics::record_event(&self.chain_label, event.name());
        self.sink.append(&format!(
            "{} event detected: user {} nonce {}",
            event.name(),
            event.user().to_checksum(None),
            event.nonce()
        ));

        let deadline = Utc::now().timestamp() as u64 + claim::CLAIM_TTL_SECS;
        let claim = match claim::build_claim(
            &event,
            self.network.chain_id,
            &self.registry,
            &self.signer,
            deadline,
        ) {
            Ok(claim) => claim,
            Err(e) => {
                self.sink
                    .append(&format!("ERROR: dropping {} event: {}", event.name(), e));
                tracing::error!(
                    chain_id = self.network.chain_id,
                    event = event.name(),
                    error = %e,
                    "Failed to build claim, dropping event"
                );
                metrics::record_error(&self.chain_label, "claim");
                return;
            }
        };

        metrics::record_claim_signed(&self.chain_label, claim.claim_type.as_str());
        let user = claim.user;
        let nonce = claim.nonce;

        match self.store.add_claim(claim) {
            Ok(()) => {
                metrics::record_claim_stored(&self.chain_label);
                self.sink.append(&format!(
                    "Claim added for user {} (nonce {})",
                    user.to_checksum(None),
                    nonce
                ));
            }
            Err(StoreError::DuplicateClaim { .. }) => {
                self.sink
                    .append(&format!("Skipped duplicate claim (nonce {})", nonce));
                tracing::warn!(
                    chain_id = self.network.chain_id,
                    user = %user.to_checksum(None),
                    nonce = %nonce,
                    "Skipping duplicate claim"
                );
            }
            Err(e) => {
                self.sink
                    .append(&format!("ERROR: failed to persist claim: {}", e));
                tracing::error!(
                    chain_id = self.network.chain_id,
                    error = %e,
                    "Failed to persist claim"
                );
                metrics::record_error(&self.chain_label, "store");
            }
        }
    }

    fn should_stop(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn set_state(&mut self, state: RelayerState) {
        if self.state != state {
            tracing::debug!(
                chain_id = self.network.chain_id,
                from = %self.state,
                to = %state,
                "Relayer state change"
            );
            self.state = state;
        }
    }

    fn teardown(&mut self) {
        self.reconnect.cancel();
        self.set_state(RelayerState::Stopped);
        metrics::set_connected(&self.chain_label, false);
        self.sink.append("Stopped.");
        self.sink.close();
        tracing::info!(
            chain = %self.network.name,
            chain_id = self.network.chain_id,
            "Relayer stopped"
        );
    }
}
