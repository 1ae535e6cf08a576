//! Bridge contract event decoding
//!
//! The bridge contract emits three event shapes, mapped to two claim
//! categories. Each shape has its own decode function over a raw log,
//! returning a typed error instead of panicking so one malformed log never
//! takes the subscription down.
//!
//! Event signatures:
//! - `TokenLocked(address indexed user, address indexed token, uint256 amount, uint256 targetChainId, uint256 nonce)`
//! - `NativeLocked(address indexed user, uint256 amount, uint256 targetChainId, uint256 nonce)`
//! - `TokenBurned(address indexed user, address indexed wrappedToken, address originalToken, uint256 amount, uint256 originalChainId, uint256 nonce)`

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::rpc::types::Log;

use crate::errors::EventDecodeError;
use crate::types::ClaimType;

/// An original asset deposited on its home chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLockedEvent {
    pub user: Address,
    pub token: Address,
    pub amount: U256,
    pub target_chain_id: u64,
    pub nonce: U256,
}

/// Native currency deposited on its home chain. The claim substitutes the
/// zero address for the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLockedEvent {
    pub user: Address,
    pub amount: U256,
    pub target_chain_id: u64,
    pub nonce: U256,
}

/// A wrapped token destroyed on its host chain to redeem the original asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBurnedEvent {
    pub user: Address,
    pub wrapped_token: Address,
    pub original_token: Address,
    pub amount: U256,
    pub original_chain_id: u64,
    pub nonce: U256,
}

/// Tagged union over the three bridge event shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    TokenLocked(TokenLockedEvent),
    NativeLocked(NativeLockedEvent),
    TokenBurned(TokenBurnedEvent),
}

impl BridgeEvent {
    /// Event name as emitted by the contract
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::TokenLocked(_) => "TokenLocked",
            BridgeEvent::NativeLocked(_) => "NativeLocked",
            BridgeEvent::TokenBurned(_) => "TokenBurned",
        }
    }

    /// Claim category this event produces
    pub fn claim_type(&self) -> ClaimType {
        match self {
            BridgeEvent::TokenLocked(_) | BridgeEvent::NativeLocked(_) => ClaimType::Lock,
            BridgeEvent::TokenBurned(_) => ClaimType::Burn,
        }
    }

    /// The event's per-source uniqueness tag
    pub fn nonce(&self) -> U256 {
        match self {
            BridgeEvent::TokenLocked(e) => e.nonce,
            BridgeEvent::NativeLocked(e) => e.nonce,
            BridgeEvent::TokenBurned(e) => e.nonce,
        }
    }

    /// The claimant
    pub fn user(&self) -> Address {
        match self {
            BridgeEvent::TokenLocked(e) => e.user,
            BridgeEvent::NativeLocked(e) => e.user,
            BridgeEvent::TokenBurned(e) => e.user,
        }
    }
}

/// Compute the TokenLocked event signature hash
pub fn token_locked_signature() -> B256 {
    keccak256(b"TokenLocked(address,address,uint256,uint256,uint256)")
}

/// Compute the NativeLocked event signature hash
pub fn native_locked_signature() -> B256 {
    keccak256(b"NativeLocked(address,uint256,uint256,uint256)")
}

/// Compute the TokenBurned event signature hash
pub fn token_burned_signature() -> B256 {
    keccak256(b"TokenBurned(address,address,address,uint256,uint256,uint256)")
}

/// Decode a raw bridge contract log into a typed event, dispatching on
/// topic0.
pub fn decode_bridge_event(log: &Log) -> Result<BridgeEvent, EventDecodeError> {
    let topic0 = log.topic0().ok_or(EventDecodeError::MissingTopics)?;

    if *topic0 == token_locked_signature() {
        decode_token_locked(log).map(BridgeEvent::TokenLocked)
    } else if *topic0 == native_locked_signature() {
        decode_native_locked(log).map(BridgeEvent::NativeLocked)
    } else if *topic0 == token_burned_signature() {
        decode_token_burned(log).map(BridgeEvent::TokenBurned)
    } else {
        Err(EventDecodeError::UnknownSignature(*topic0))
    }
}

/// Parse a TokenLocked log
///
/// Indexed: user, token. Data: amount, targetChainId, nonce (3 words).
pub fn decode_token_locked(log: &Log) -> Result<TokenLockedEvent, EventDecodeError> {
    const EVENT: &str = "TokenLocked";

    let topics = log.topics();
    if topics.len() < 3 {
        return Err(EventDecodeError::NotEnoughTopics {
            event: EVENT,
            expected: 3,
            got: topics.len(),
        });
    }

    let data = log.data().data.as_ref();
    if data.len() < 96 {
        return Err(EventDecodeError::DataTooShort {
            event: EVENT,
            len: data.len(),
        });
    }

    Ok(TokenLockedEvent {
        user: Address::from_word(topics[1]),
        token: Address::from_word(topics[2]),
        amount: U256::from_be_slice(&data[0..32]),
        target_chain_id: decode_chain_id(EVENT, "targetChainId", &data[32..64])?,
        nonce: U256::from_be_slice(&data[64..96]),
    })
}

/// Parse a NativeLocked log
///
/// Indexed: user. Data: amount, targetChainId, nonce (3 words).
pub fn decode_native_locked(log: &Log) -> Result<NativeLockedEvent, EventDecodeError> {
    const EVENT: &str = "NativeLocked";

    let topics = log.topics();
    if topics.len() < 2 {
        return Err(EventDecodeError::NotEnoughTopics {
            event: EVENT,
            expected: 2,
            got: topics.len(),
        });
    }

    let data = log.data().data.as_ref();
    if data.len() < 96 {
        return Err(EventDecodeError::DataTooShort {
            event: EVENT,
            len: data.len(),
        });
    }

    Ok(NativeLockedEvent {
        user: Address::from_word(topics[1]),
        amount: U256::from_be_slice(&data[0..32]),
        target_chain_id: decode_chain_id(EVENT, "targetChainId", &data[32..64])?,
        nonce: U256::from_be_slice(&data[64..96]),
    })
}

/// Parse a TokenBurned log
///
/// Indexed: user, wrappedToken.
/// Data: originalToken (address, right-aligned), amount, originalChainId,
/// nonce (4 words).
pub fn decode_token_burned(log: &Log) -> Result<TokenBurnedEvent, EventDecodeError> {
    const EVENT: &str = "TokenBurned";

    let topics = log.topics();
    if topics.len() < 3 {
        return Err(EventDecodeError::NotEnoughTopics {
            event: EVENT,
            expected: 3,
            got: topics.len(),
        });
    }

    let data = log.data().data.as_ref();
    if data.len() < 128 {
        return Err(EventDecodeError::DataTooShort {
            event: EVENT,
            len: data.len(),
        });
    }

    let original_token_bytes: [u8; 20] =
        data[12..32]
            .try_into()
            .map_err(|_| EventDecodeError::MalformedField {
                event: EVENT,
                field: "originalToken",
            })?;

    Ok(TokenBurnedEvent {
        user: Address::from_word(topics[1]),
        wrapped_token: Address::from_word(topics[2]),
        original_token: Address::from(original_token_bytes),
        amount: U256::from_be_slice(&data[32..64]),
        original_chain_id: decode_chain_id(EVENT, "originalChainId", &data[64..96])?,
        nonce: U256::from_be_slice(&data[96..128]),
    })
}

/// Chain ids ride in uint256 words but must fit u64
fn decode_chain_id(
    event: &'static str,
    field: &'static str,
    word: &[u8],
) -> Result<u64, EventDecodeError> {
    U256::from_be_slice(word)
        .try_into()
        .map_err(|_| EventDecodeError::MalformedField { event, field })
}
