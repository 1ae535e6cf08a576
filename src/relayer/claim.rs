//! Deterministic claim construction and signing
//!
//! Given a decoded bridge event, resolves the destination chain, packs and
//! hashes the claim fields, and signs the digest with the relayer's key
//! using the EIP-191 personal-message convention the redeeming contract
//! recovers against.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::errors::ClaimError;
use crate::events::BridgeEvent;
use crate::hash;
use crate::networks::NetworkRegistry;
use crate::types::SignedClaim;

/// Claims expire two days after the observed event.
pub const CLAIM_TTL_SECS: u64 = 2 * 24 * 60 * 60;

/// Build and sign a claim for a decoded event.
///
/// Lock claims redeem on the event's target chain; Burn claims redeem on the
/// chain the original asset lives on, and carry the original token address
/// rather than the wrapped one. An unknown destination chain fails this
/// single claim only.
pub fn build_claim(
    event: &BridgeEvent,
    source_chain_id: u64,
    registry: &NetworkRegistry,
    signer: &PrivateKeySigner,
    deadline: u64,
) -> Result<SignedClaim, ClaimError> {
    let (user, token, amount, nonce, claim_chain_id) = match event {
        BridgeEvent::TokenLocked(e) => (e.user, e.token, e.amount, e.nonce, e.target_chain_id),
        // native deposits carry no token contract; the zero address stands in
        BridgeEvent::NativeLocked(e) => (e.user, Address::ZERO, e.amount, e.nonce, e.target_chain_id),
        BridgeEvent::TokenBurned(e) => {
            (e.user, e.original_token, e.amount, e.nonce, e.original_chain_id)
        }
    };

    let destination = registry
        .get(claim_chain_id)
        .ok_or(ClaimError::UnknownDestinationChain(claim_chain_id))?;

    let digest = hash::claim_digest(
        &user,
        &token,
        amount,
        nonce,
        source_chain_id,
        claim_chain_id,
        &destination.bridge_address,
        deadline,
    );

    let signature = signer.sign_message_sync(&digest)?;

    Ok(SignedClaim {
        user,
        token,
        amount,
        nonce,
        source_chain_id,
        claim_chain_id,
        signature: format!("0x{}", hex::encode(signature.as_bytes())),
        deadline,
        claimed: false,
        claim_type: event.claim_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NativeLockedEvent, TokenBurnedEvent, TokenLockedEvent};
    use crate::networks::NetworkConfig;
    use crate::types::ClaimType;
    use alloy::primitives::{address, U256};

    // Well-known anvil test key #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEADLINE: u64 = 1767225600;

    fn registry() -> NetworkRegistry {
        NetworkRegistry::new(vec![
            NetworkConfig {
                name: "sepolia".to_string(),
                chain_id: 11155111,
                ws_url: "ws://localhost:8546".to_string(),
                bridge_address: address!("1111111111111111111111111111111111111111"),
            },
            NetworkConfig {
                name: "base-sepolia".to_string(),
                chain_id: 84532,
                ws_url: "ws://localhost:8547".to_string(),
                bridge_address: address!("2222222222222222222222222222222222222222"),
            },
        ])
        .unwrap()
    }

    fn signer() -> PrivateKeySigner {
        TEST_KEY.parse().unwrap()
    }

    fn lock_event() -> BridgeEvent {
        BridgeEvent::TokenLocked(TokenLockedEvent {
            user: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            token: address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
            amount: "1000000000000000000".parse().unwrap(),
            target_chain_id: 84532,
            nonce: U256::from(42u64),
        })
    }

    #[test]
    fn test_lock_claim_field_mapping() {
        let claim = build_claim(&lock_event(), 11155111, &registry(), &signer(), DEADLINE).unwrap();

        assert_eq!(claim.source_chain_id, 11155111);
        assert_eq!(claim.claim_chain_id, 84532);
        assert_eq!(claim.amount.to_string(), "1000000000000000000");
        assert_eq!(claim.nonce, U256::from(42u64));
        assert!(!claim.claimed);
        assert_eq!(claim.claim_type, ClaimType::Lock);
        assert_eq!(claim.deadline, DEADLINE);
        // 0x + 65 bytes hex
        assert_eq!(claim.signature.len(), 132);
    }

    #[test]
    fn test_native_lock_uses_zero_address_token() {
        let event = BridgeEvent::NativeLocked(NativeLockedEvent {
            user: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            amount: U256::from(5u64),
            target_chain_id: 84532,
            nonce: U256::from(1u64),
        });

        let claim = build_claim(&event, 11155111, &registry(), &signer(), DEADLINE).unwrap();
        assert_eq!(claim.token, Address::ZERO);
        assert_eq!(claim.claim_type, ClaimType::Lock);
    }

    #[test]
    fn test_burn_claim_targets_origin_chain_with_original_token() {
        let original = address!("dddddddddddddddddddddddddddddddddddddddd");
        let event = BridgeEvent::TokenBurned(TokenBurnedEvent {
            user: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            wrapped_token: address!("cccccccccccccccccccccccccccccccccccccccc"),
            original_token: original,
            amount: U256::from(5u64),
            original_chain_id: 11155111,
            nonce: U256::from(3u64),
        });

        let claim = build_claim(&event, 84532, &registry(), &signer(), DEADLINE).unwrap();
        assert_eq!(claim.token, original);
        assert_eq!(claim.claim_chain_id, 11155111);
        assert_eq!(claim.source_chain_id, 84532);
        assert_eq!(claim.claim_type, ClaimType::Burn);
    }

    #[test]
    fn test_unknown_destination_chain_fails_the_claim() {
        let event = BridgeEvent::TokenLocked(TokenLockedEvent {
            user: address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            token: address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
            amount: U256::from(1u64),
            target_chain_id: 999_999,
            nonce: U256::from(1u64),
        });

        assert!(matches!(
            build_claim(&event, 11155111, &registry(), &signer(), DEADLINE),
            Err(ClaimError::UnknownDestinationChain(999_999))
        ));
    }

    #[test]
    fn test_signature_is_deterministic_and_recovers_to_signer() {
        let signer = signer();
        let registry = registry();

        let a = build_claim(&lock_event(), 11155111, &registry, &signer, DEADLINE).unwrap();
        let b = build_claim(&lock_event(), 11155111, &registry, &signer, DEADLINE).unwrap();
        assert_eq!(a.signature, b.signature);

        // recompute the digest and check EIP-191 recovery
        let digest = hash::claim_digest(
            &a.user,
            &a.token,
            a.amount,
            a.nonce,
            a.source_chain_id,
            a.claim_chain_id,
            &registry.get(a.claim_chain_id).unwrap().bridge_address,
            a.deadline,
        );
        let signature = signer.sign_message_sync(&digest).unwrap();
        assert_eq!(
            format!("0x{}", hex::encode(signature.as_bytes())),
            a.signature
        );
        assert_eq!(
            signature.recover_address_from_msg(digest).unwrap(),
            signer.address()
        );
    }
}
