use crypto_utils::base58::base58_check_encode;
use crypto_utils::script::verification_script_hash;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::error::KeyError;
use crate::point::EcPoint;
use crate::signature::EcdsaSignature;
use crate::wif;

pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Version byte prepended to the script hash when rendering an address.
pub const ADDRESS_VERSION: u8 = 0x35;

/// A secp256r1 key pair. The public key is always `private * G`; both halves
/// are created together and the private half is wiped on drop.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Draws a fresh key from the OS RNG. The library rejects and redraws the
    /// (practically unreachable) out-of-range scalar internally.
    pub fn new_random() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Builds a key pair from a raw 32-byte big-endian scalar. The scalar must
    /// lie in `[1, n-1]`.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(KeyError::InvalidArgument);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::CryptoOperation)?;
        let verifying_key = *signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Accepts a hex private key with or without a `0x` prefix.
    pub fn from_private_key_hex(s: &str) -> Result<Self, KeyError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(s).map_err(|_| KeyError::InvalidFormat)?;
        let result = Self::from_private_key(&bytes);
        bytes.zeroize();
        result
    }

    pub fn private_key_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    pub fn public_key_bytes(&self, compressed: bool) -> Vec<u8> {
        self.verifying_key
            .to_encoded_point(compressed)
            .as_bytes()
            .to_vec()
    }

    pub fn public_key_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(self.verifying_key.to_encoded_point(true).as_bytes());
        out
    }

    pub fn public_point(&self) -> EcPoint {
        EcPoint::from(&self.verifying_key)
    }

    /// HASH160 of the single-signature verification script for this key.
    pub fn script_hash(&self) -> [u8; 20] {
        verification_script_hash(&self.public_key_compressed())
    }

    /// Base58Check of the version byte followed by the script hash.
    pub fn address(&self) -> String {
        let mut payload = [0u8; 21];
        payload[0] = ADDRESS_VERSION;
        payload[1..].copy_from_slice(&self.script_hash());
        base58_check_encode(&payload)
    }

    /// ECDSA over a 32-byte digest. The result is always low-S canonical; the
    /// recovery id parity is flipped when normalization negates `s`.
    pub fn sign(&self, message_hash: &[u8; 32]) -> Result<EcdsaSignature, KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(message_hash)
            .map_err(|_| KeyError::CryptoOperation)?;
        let (signature, recovery_byte) = match signature.normalize_s() {
            Some(normalized) => (normalized, recovery_id.to_byte() ^ 1),
            None => (signature, recovery_id.to_byte()),
        };
        Ok(EcdsaSignature::from_p256(&signature, Some(recovery_byte)))
    }

    /// Verifies a signature produced over `message_hash` with this key pair's
    /// public key. Returns `false` on any malformed input.
    pub fn verify(&self, message_hash: &[u8; 32], signature: &EcdsaSignature) -> bool {
        let Ok(signature) = signature.to_p256() else {
            return false;
        };
        self.verifying_key
            .verify_prehash(message_hash, &signature)
            .is_ok()
    }

    /// Plaintext private-key export in Wallet Import Format.
    pub fn export_wif(&self) -> String {
        wif::encode(&self.private_key_bytes())
    }

    pub fn import_wif(s: &str) -> Result<Self, KeyError> {
        let key = wif::decode(s)?;
        Self::from_private_key(key.as_ref())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key_compressed()))
            .field("private_key", &"<redacted>")
            .finish()
    }
}
