//! bridge-relayer: multi-chain bridge event relayer
//!
//! Relays cross-chain token-bridge events into cryptographically signed,
//! redeemable claims:
//!
//! - **Relayer** - one per chain; live WebSocket subscription to the bridge
//!   contract, deterministic claim construction and signing, automatic
//!   reconnection with fixed backoff
//! - **Multi-Chain Coordinator** - spawns and lifecycle-manages one relayer
//!   per configured network
//! - **Claim Store** - durable file-backed record of signed claims with
//!   per-user FIFO selection and idempotent claim-state transitions
//!
//! The four claim store operations (`add_claim`, `next_unclaimed_claim`,
//! `next_claimed_claim`, `mark_claimed`) are the entire outward contract
//! consumed by the redeeming side.

pub mod api;
pub mod claims;
pub mod config;
pub mod errors;
pub mod events;
pub mod hash;
pub mod metrics;
pub mod networks;
pub mod relayer;
pub mod sink;
pub mod types;

// Re-export commonly used items at the crate root
pub use claims::{ClaimStore, StoreStats};
pub use config::Config;
pub use errors::{ClaimError, EventDecodeError, StoreError};
pub use events::{decode_bridge_event, BridgeEvent};
pub use networks::{NetworkConfig, NetworkRegistry};
pub use relayer::{MultiChainRelayer, Relayer, RelayerState};
pub use types::{ClaimType, SignedClaim};
