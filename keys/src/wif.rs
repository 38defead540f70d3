//! Wallet Import Format: Base58Check of `0x80 ‖ key ‖ 0x01`.
//!
//! Only the compressed-pubkey flavor is produced or accepted, matching what
//! every current wallet emits.

use crypto_utils::base58::{base58_check_decode, base58_check_encode};
use zeroize::{Zeroize, Zeroizing};

use crate::error::KeyError;

pub const WIF_VERSION: u8 = 0x80;
pub const COMPRESSED_FLAG: u8 = 0x01;

const PAYLOAD_LENGTH: usize = 34;

/// Encodes a 32-byte private key as a compressed-key WIF string.
pub fn encode(private_key: &[u8; 32]) -> String {
    let mut payload = [0u8; PAYLOAD_LENGTH];
    payload[0] = WIF_VERSION;
    payload[1..33].copy_from_slice(private_key);
    payload[33] = COMPRESSED_FLAG;
    let encoded = base58_check_encode(&payload);
    payload.zeroize();
    encoded
}

/// Decodes a WIF string back to the raw private key. The version byte,
/// compression flag, payload length, and checksum must all hold.
pub fn decode(wif: &str) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    let mut payload = base58_check_decode(wif).map_err(|_| KeyError::InvalidFormat)?;
    if payload.len() != PAYLOAD_LENGTH
        || payload[0] != WIF_VERSION
        || payload[33] != COMPRESSED_FLAG
    {
        payload.zeroize();
        return Err(KeyError::InvalidFormat);
    }
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&payload[1..33]);
    payload.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    // Compressed WIF for the scalar 1, a fixture shared by every wallet
    // implementation.
    const KEY_ONE: [u8; 32] =
        hex!("0000000000000000000000000000000000000000000000000000000000000001");
    const WIF_ONE: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";

    #[test]
    fn known_vector() {
        assert_eq!(encode(&KEY_ONE), WIF_ONE);
        assert_eq!(*decode(WIF_ONE).unwrap(), KEY_ONE);
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut s = WIF_ONE.to_string();
        s.pop();
        s.push('m');
        assert_eq!(decode(&s).unwrap_err(), KeyError::InvalidFormat);
    }

    #[test]
    fn decode_rejects_wrong_version() {
        // 0x81 version byte instead of 0x80.
        let mut payload = [0u8; 34];
        payload[0] = 0x81;
        payload[33] = COMPRESSED_FLAG;
        let s = base58_check_encode(&payload);
        assert_eq!(decode(&s).unwrap_err(), KeyError::InvalidFormat);
    }

    #[test]
    fn decode_rejects_missing_compression_flag() {
        // 33-byte uncompressed-style payload.
        let mut payload = [0u8; 33];
        payload[0] = WIF_VERSION;
        let s = base58_check_encode(&payload);
        assert_eq!(decode(&s).unwrap_err(), KeyError::InvalidFormat);
    }

    #[test]
    fn decode_rejects_off_length_strings() {
        // Compressed WIF is 52 characters; neighbors on either side fail.
        assert_eq!(decode(&"K".repeat(50)).unwrap_err(), KeyError::InvalidFormat);
        assert_eq!(decode(&"K".repeat(53)).unwrap_err(), KeyError::InvalidFormat);
    }

    #[test]
    fn decode_rejects_non_base58_input() {
        assert_eq!(decode("0OIl").unwrap_err(), KeyError::InvalidFormat);
        assert_eq!(decode("").unwrap_err(), KeyError::InvalidFormat);
    }

    proptest! {
        #[test]
        fn round_trip(key in proptest::array::uniform32(any::<u8>())) {
            let wif = encode(&key);
            prop_assert_eq!(*decode(&wif).unwrap(), key);
        }
    }
}
