//! Claim digest computation
//!
//! The redeeming contract verifies claims against the keccak256 hash of a
//! tightly packed (unpadded) field concatenation, so the byte layout here
//! must reproduce the contract's `abi.encodePacked` ordering exactly.

use alloy::primitives::{Address, U256};
use tiny_keccak::{Hasher, Keccak};

/// Length of the packed claim preimage:
/// two addresses, four uint256 words, one address, one uint256 word.
pub const PACKED_CLAIM_LEN: usize = 20 + 20 + 32 + 32 + 32 + 32 + 20 + 32;

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Pack the claim fields in contract order.
///
/// Layout matches
/// `abi.encodePacked(address,address,uint256,uint256,uint256,uint256,address,uint256)`:
/// user, token, amount, nonce, sourceChainId, destinationChainId,
/// destinationBridgeAddress, deadline.
#[allow(clippy::too_many_arguments)]
pub fn pack_claim(
    user: &Address,
    token: &Address,
    amount: U256,
    nonce: U256,
    source_chain_id: u64,
    destination_chain_id: u64,
    destination_bridge: &Address,
    deadline: u64,
) -> [u8; PACKED_CLAIM_LEN] {
    let mut data = [0u8; PACKED_CLAIM_LEN];

    // user (20 bytes), token (20 bytes)
    data[0..20].copy_from_slice(user.as_slice());
    data[20..40].copy_from_slice(token.as_slice());

    // amount, nonce (uint256, big-endian)
    data[40..72].copy_from_slice(&amount.to_be_bytes::<32>());
    data[72..104].copy_from_slice(&nonce.to_be_bytes::<32>());

    // chain ids widen to uint256 words
    data[104..136].copy_from_slice(&U256::from(source_chain_id).to_be_bytes::<32>());
    data[136..168].copy_from_slice(&U256::from(destination_chain_id).to_be_bytes::<32>());

    // destination bridge contract (20 bytes)
    data[168..188].copy_from_slice(destination_bridge.as_slice());

    // deadline (uint256)
    data[188..220].copy_from_slice(&U256::from(deadline).to_be_bytes::<32>());

    data
}

/// keccak256 over the packed claim fields. This is the digest the relayer
/// signs and the redeeming contract recovers against.
#[allow(clippy::too_many_arguments)]
pub fn claim_digest(
    user: &Address,
    token: &Address,
    amount: U256,
    nonce: U256,
    source_chain_id: u64,
    destination_chain_id: u64,
    destination_bridge: &Address,
    deadline: u64,
) -> [u8; 32] {
    keccak256(&pack_claim(
        user,
        token,
        amount,
        nonce,
        source_chain_id,
        destination_chain_id,
        destination_bridge,
        deadline,
    ))
}

/// Convert a 32-byte hash to a hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_keccak256() {
        let result = keccak256(b"hello");
        assert_eq!(
            bytes32_to_hex(&result),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_packed_layout() {
        let user = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let token = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let bridge = address!("cccccccccccccccccccccccccccccccccccccccc");

        let packed = pack_claim(
            &user,
            &token,
            U256::from(1u64),
            U256::from(42u64),
            11155111,
            84532,
            &bridge,
            1767225600,
        );

        assert_eq!(packed.len(), PACKED_CLAIM_LEN);
        assert_eq!(&packed[0..20], user.as_slice());
        assert_eq!(&packed[20..40], token.as_slice());
        // amount occupies a full 32-byte word, value right-aligned
        assert_eq!(packed[71], 1);
        assert_eq!(packed[103], 42);
        assert_eq!(&packed[168..188], bridge.as_slice());
    }

    #[test]
    fn test_digest_is_deterministic_and_field_sensitive() {
        let user = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let token = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let bridge = address!("cccccccccccccccccccccccccccccccccccccccc");
        let amount: U256 = "1000000000000000000".parse().unwrap();

        let a = claim_digest(&user, &token, amount, U256::from(42u64), 11155111, 84532, &bridge, 1767225600);
        let b = claim_digest(&user, &token, amount, U256::from(42u64), 11155111, 84532, &bridge, 1767225600);
        let c = claim_digest(&user, &token, amount, U256::from(43u64), 11155111, 84532, &bridge, 1767225600);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
