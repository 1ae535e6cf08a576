//! Typed errors for the claim pipeline
//!
//! Application-level plumbing uses eyre; these enums exist where callers
//! need to match on the failure (dropping a single event vs. propagating).

use std::path::PathBuf;

use alloy::primitives::B256;
use thiserror::Error;

/// Errors raised by the claim store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The supplied address could not be normalized to checksummed form.
    #[error("invalid address {address:?}: {reason}")]
    AddressFormat { address: String, reason: String },

    /// A claim with the same (user, nonce, claimChainId) already exists.
    #[error("duplicate claim for user {user}, nonce {nonce}, claim chain {claim_chain_id}")]
    DuplicateClaim {
        user: String,
        nonce: String,
        claim_chain_id: u64,
    },

    /// The backing file could not be written.
    #[error("failed to write claim store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory store could not be encoded for persistence.
    #[error("failed to encode claim store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised while decoding a bridge contract log.
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The log carries no topics at all.
    #[error("log has no topics")]
    MissingTopics,

    /// topic0 does not match any bridge event this relayer handles.
    #[error("unrecognized event signature {0}")]
    UnknownSignature(B256),

    /// The log has fewer indexed topics than the event shape requires.
    #[error("{event}: expected {expected} topics, got {got}")]
    NotEnoughTopics {
        event: &'static str,
        expected: usize,
        got: usize,
    },

    /// The non-indexed data section is shorter than the event shape requires.
    #[error("{event}: event data too short ({len} bytes)")]
    DataTooShort { event: &'static str, len: usize },

    /// A field was present but did not fit its expected range.
    #[error("{event}: missing or malformed field {field}")]
    MalformedField {
        event: &'static str,
        field: &'static str,
    },
}

/// Errors raised while constructing and signing a claim.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The destination chain id is not present in the network registry.
    /// Fails this single claim only; the relayer keeps listening.
    #[error("no network registered for destination chain id {0}")]
    UnknownDestinationChain(u64),

    /// The signer rejected the digest.
    #[error("failed to sign claim digest: {0}")]
    Signing(#[from] alloy::signers::Error),
}
