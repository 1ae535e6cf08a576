//! Durable claim store
//!
//! Keeps every signed claim partitioned by claimant, in insertion order, and
//! mirrors the whole collection to a JSON backing file on every mutation.
//! The file is an array of `[checksummedAddress, SignedClaim[]]` pairs; a
//! legacy single-object encoding is still accepted on load, and any parse
//! failure falls back to an empty store rather than refusing to start.
//!
//! This store is safe to share across relayer tasks within one process. It
//! does NOT provide cross-process mutual exclusion; running two processes
//! against the same backing file is unsupported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use alloy::primitives::{Address, U256};
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::types::{ClaimType, SignedClaim};

/// Aggregate counts for the status endpoint
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub users: usize,
    pub total_claims: usize,
    pub unclaimed_claims: usize,
}

/// File-backed store of signed claims, keyed by claimant.
pub struct ClaimStore {
    path: PathBuf,
    claims: Mutex<BTreeMap<Address, Vec<SignedClaim>>>,
    /// In-process write-in-progress flag. A save attempted while another is
    /// pending is skipped with a warning instead of corrupting the file.
    saving: AtomicBool,
}

impl ClaimStore {
    /// Open the store at `path`, reading any existing backing file.
    /// Never fails: a missing or unreadable file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let claims = match std::fs::read_to_string(&path) {
            Ok(content) => parse_backing_file(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Claims file not found, starting fresh");
                BTreeMap::new()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error reading claims file, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path,
            claims: Mutex::new(claims),
            saving: AtomicBool::new(false),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a claim to its user's list and persist.
    ///
    /// Rejects a second claim with the same (user, nonce, claimChainId);
    /// this uniqueness check also makes re-delivered logs after a reconnect
    /// harmless.
    pub fn add_claim(&self, claim: SignedClaim) -> Result<(), StoreError> {
        let mut claims = self.lock();

        let user_claims = claims.entry(claim.user).or_default();
        if user_claims
            .iter()
            .any(|c| c.nonce == claim.nonce && c.claim_chain_id == claim.claim_chain_id)
        {
            return Err(StoreError::DuplicateClaim {
                user: claim.user.to_checksum(None),
                nonce: claim.nonce.to_string(),
                claim_chain_id: claim.claim_chain_id,
            });
        }

        let nonce = claim.nonce;
        let user = claim.user;
        user_claims.push(claim);

        self.save(&claims)?;
        info!(user = %user.to_checksum(None), nonce = %nonce, "Added claim");
        Ok(())
    }

    /// Oldest unclaimed claim for `user`, optionally filtered by claim type.
    /// Strict per-user FIFO; `None` when nothing matches.
    pub fn next_unclaimed_claim(
        &self,
        user: &str,
        claim_type: Option<ClaimType>,
    ) -> Result<Option<SignedClaim>, StoreError> {
        self.select(user, claim_type, false)
    }

    /// Oldest claimed claim for `user`, optionally filtered by claim type.
    /// Used to locate a previously redeemed wrapped-side claim before
    /// redeeming its original-side counterpart.
    pub fn next_claimed_claim(
        &self,
        user: &str,
        claim_type: Option<ClaimType>,
    ) -> Result<Option<SignedClaim>, StoreError> {
        self.select(user, claim_type, true)
    }

    fn select(
        &self,
        user: &str,
        claim_type: Option<ClaimType>,
        claimed: bool,
    ) -> Result<Option<SignedClaim>, StoreError> {
        let user = normalize_address(user)?;
        let claims = self.lock();

        Ok(claims.get(&user).and_then(|list| {
            list.iter()
                .find(|c| {
                    c.claimed == claimed && claim_type.map_or(true, |t| c.claim_type == t)
                })
                .cloned()
        }))
    }

    /// Flip the unique claim matching (user, nonce, claimChainId) to claimed
    /// and persist. A missing match or an already-claimed claim is a logged
    /// no-op, never an error, so the call is safe to retry after a crash or
    /// duplicate invocation.
    pub fn mark_claimed(
        &self,
        user: &str,
        nonce: U256,
        claim_chain_id: u64,
    ) -> Result<(), StoreError> {
        let user = normalize_address(user)?;
        let mut claims = self.lock();

        let Some(user_claims) = claims.get_mut(&user) else {
            warn!(user = %user.to_checksum(None), "No claims found for user");
            return Ok(());
        };

        let Some(claim) = user_claims
            .iter_mut()
            .find(|c| c.nonce == nonce && c.claim_chain_id == claim_chain_id)
        else {
            warn!(user = %user.to_checksum(None), nonce = %nonce, "Claim not found for user");
            return Ok(());
        };

        if claim.claimed {
            info!(nonce = %nonce, "Claim already marked claimed");
            return Ok(());
        }
        claim.claimed = true;

        self.save(&claims)?;
        info!(user = %user.to_checksum(None), nonce = %nonce, "Claim marked as claimed");
        Ok(())
    }

    /// Aggregate counts over the whole store
    pub fn stats(&self) -> StoreStats {
        let claims = self.lock();
        let total_claims = claims.values().map(Vec::len).sum();
        let unclaimed_claims = claims
            .values()
            .flat_map(|list| list.iter())
            .filter(|c| !c.claimed)
            .count();
        StoreStats {
            users: claims.len(),
            total_claims,
            unclaimed_claims,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<Address, Vec<SignedClaim>>> {
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite the full backing file. Guarded by the write-in-progress flag.
    fn save(&self, claims: &BTreeMap<Address, Vec<SignedClaim>>) -> Result<(), StoreError> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Save already in progress, skipping duplicate write");
            return Ok(());
        }

        let result = self.write_file(claims);
        self.saving.store(false, Ordering::Release);
        result
    }

    fn write_file(&self, claims: &BTreeMap<Address, Vec<SignedClaim>>) -> Result<(), StoreError> {
        let pairs: Vec<(String, &Vec<SignedClaim>)> = claims
            .iter()
            .map(|(user, list)| (user.to_checksum(None), list))
            .collect();

        let data = serde_json::to_string_pretty(&pairs)?;
        std::fs::write(&self.path, data).map_err(|source| {
            error!(path = %self.path.display(), error = %source, "Failed to save claims");
            StoreError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(path = %self.path.display(), "Claims saved to disk");
        Ok(())
    }
}

fn normalize_address(input: &str) -> Result<Address, StoreError> {
    match input.trim().parse::<Address>() {
        Ok(addr) => Ok(addr),
        Err(e) => Err(StoreError::AddressFormat {
            address: input.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse the backing file content.
///
/// Accepts the canonical array-of-pairs encoding or a legacy single-object
/// encoding (one bare claim). Anything else yields an empty store.
fn parse_backing_file(content: &str) -> BTreeMap<Address, Vec<SignedClaim>> {
    if let Ok(pairs) = serde_json::from_str::<Vec<(String, Vec<SignedClaim>)>>(content) {
        let mut map = BTreeMap::new();
        for (user, list) in pairs {
            match user.parse::<Address>() {
                Ok(user) => {
                    map.entry(user).or_insert_with(Vec::new).extend(list);
                }
                Err(e) => {
                    error!(user = %user, error = %e, "Skipping claims entry with invalid user key");
                }
            }
        }
        info!("Loaded claims from file");
        return map;
    }

    if let Ok(claim) = serde_json::from_str::<SignedClaim>(content) {
        info!("Loaded legacy single-claim file");
        let mut map = BTreeMap::new();
        map.insert(claim.user, vec![claim]);
        return map;
    }

    error!("Claims file is not in a recognized format, starting empty");
    BTreeMap::new()
}
