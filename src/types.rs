//! Shared claim types and their wire encodings
//!
//! The claim store file and every claim handed to consumers use the same
//! JSON encoding: camelCase keys, EIP-55 checksummed addresses, and decimal
//! strings for all numeric fields so amounts survive beyond 2^53 intact.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a signed claim.
///
/// Lock claims originate from source-chain deposits; Burn claims originate
/// from wrapped-token destruction on the hosting chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Lock,
    Burn,
}

impl ClaimType {
    /// Get the claim type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Lock => "lock",
            ClaimType::Burn => "burn",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A signed, redeemable attestation of a bridge event.
///
/// Created only by a relayer after validating and signing an on-chain event;
/// mutated only by `ClaimStore::mark_claimed`; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedClaim {
    #[serde(with = "checksum_address")]
    pub user: Address,
    #[serde(with = "checksum_address")]
    pub token: Address,
    #[serde(with = "dec_u256")]
    pub amount: U256,
    /// Per-event uniqueness tag from the source event, not an account
    /// sequence number.
    #[serde(with = "dec_u256")]
    pub nonce: U256,
    #[serde(with = "dec_u64")]
    pub source_chain_id: u64,
    #[serde(with = "dec_u64")]
    pub claim_chain_id: u64,
    /// 0x-prefixed hex of the 65-byte recoverable signature (r ‖ s ‖ v).
    pub signature: String,
    /// Unix timestamp after which the redeeming contract treats the claim
    /// as expired. Not enforced here.
    #[serde(with = "dec_u64")]
    pub deadline: u64,
    pub claimed: bool,
    pub claim_type: ClaimType,
}

/// Serde adapter: `Address` as an EIP-55 checksummed string.
pub mod checksum_address {
    use alloy::primitives::Address;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(addr: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&addr.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde adapter: `U256` as a decimal string.
pub mod dec_u256 {
    use alloy::primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde adapter: `u64` as a decimal string.
pub mod dec_u64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
