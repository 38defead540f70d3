//! BIP-32 hierarchical deterministic keys over secp256r1.
//!
//! The derivation math follows BIP-32 exactly, with the curve swapped for
//! secp256r1. Serialized keys use the standard xprv/xpub version bytes; they
//! are not interchangeable with secp256k1 wallets.

use crypto_utils::base58::{base58_check_decode, base58_check_encode};
use crypto_utils::hash::hash160;
use crypto_utils::hmac::hmac_sha512;
use p256::elliptic_curve::PrimeField;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::error::KeyError;
use crate::keypair::KeyPair;

/// Child indexes at or above this offset derive hardened keys.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const MIN_SEED_LENGTH: usize = 16;
const MAX_SEED_LENGTH: usize = 64;
const PAYLOAD_LENGTH: usize = 78;

const MAINNET_PRIVATE_VERSION: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
const MAINNET_PUBLIC_VERSION: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const TESTNET_PRIVATE_VERSION: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
const TESTNET_PUBLIC_VERSION: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];

/// Selects the version bytes used for serialized extended keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    fn private_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => MAINNET_PRIVATE_VERSION,
            Network::Testnet => TESTNET_PRIVATE_VERSION,
        }
    }

    fn public_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => MAINNET_PUBLIC_VERSION,
            Network::Testnet => TESTNET_PUBLIC_VERSION,
        }
    }
}

/// An extended private key: a private scalar plus the chain metadata needed
/// to derive children and serialize to xprv text.
#[derive(Clone)]
pub struct ExtendedPrivKey {
    network: Network,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    private_key: SecretKey,
}

/// The public half of an extended key. Supports non-hardened derivation only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPubKey {
    network: Network,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    public_key: PublicKey,
}

fn fingerprint_of(public_key: &PublicKey) -> [u8; 4] {
    let digest = hash160(public_key.to_encoded_point(true).as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Interprets a 32-byte HMAC half as a scalar without modular reduction, per
/// BIP-32. Values at or above the group order are rejected.
fn scalar_from_hmac_half(half: &[u8]) -> Result<Scalar, KeyError> {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(half);
    let scalar = Option::<Scalar>::from(Scalar::from_repr(bytes.into()));
    bytes.zeroize();
    scalar.ok_or(KeyError::CryptoOperation)
}

impl ExtendedPrivKey {
    /// Derives the master key from a 16..=64 byte seed. A seed whose HMAC
    /// half falls outside `[1, n-1]` cannot produce a master key; callers
    /// should pick a different seed.
    pub fn new_master(seed: &[u8], network: Network) -> Result<Self, KeyError> {
        if !(MIN_SEED_LENGTH..=MAX_SEED_LENGTH).contains(&seed.len()) {
            return Err(KeyError::InvalidArgument);
        }
        let i = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, seed));
        let private_key =
            SecretKey::from_slice(&i[..32]).map_err(|_| KeyError::CryptoOperation)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self {
            network,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            private_key,
        })
    }

    /// Derives a child key. Indexes at or above [`HARDENED_OFFSET`] use the
    /// hardened scheme and commit to the parent private key.
    pub fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        let depth = self.depth.checked_add(1).ok_or(KeyError::InvalidArgument)?;
        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if index >= HARDENED_OFFSET {
            data.push(0x00);
            data.extend_from_slice(self.private_key.to_bytes().as_slice());
        } else {
            data.extend_from_slice(self.public_key().to_encoded_point(true).as_bytes());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = Zeroizing::new(hmac_sha512(&self.chain_code, &data));
        let tweak = scalar_from_hmac_half(&i[..32])?;
        let child_scalar = tweak + *self.private_key.to_nonzero_scalar();
        // A zero child scalar means this index is unusable; BIP-32 says to
        // skip it.
        let child_scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(child_scalar))
            .ok_or(KeyError::CryptoOperation)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self {
            network: self.network,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            private_key: SecretKey::from(child_scalar),
        })
    }

    pub fn to_extended_pub(&self) -> ExtendedPubKey {
        ExtendedPubKey {
            network: self.network,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            public_key: self.public_key(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    pub fn key_pair(&self) -> Result<KeyPair, KeyError> {
        KeyPair::from_private_key(self.private_key.to_bytes().as_slice())
    }

    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.to_bytes().into())
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key())
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Serializes to xprv (or tprv) text, 111 Base58Check characters.
    pub fn to_base58(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LENGTH];
        payload[..4].copy_from_slice(&self.network.private_version());
        payload[4] = self.depth;
        payload[5..9].copy_from_slice(&self.parent_fingerprint);
        payload[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        payload[13..45].copy_from_slice(&self.chain_code);
        payload[45] = 0x00;
        payload[46..].copy_from_slice(self.private_key.to_bytes().as_slice());
        let encoded = base58_check_encode(&payload);
        payload.zeroize();
        encoded
    }

    pub fn from_base58(text: &str) -> Result<Self, KeyError> {
        let mut raw = parse_payload(text)?;
        if !raw.is_private || raw.key[0] != 0x00 {
            raw.key.zeroize();
            return Err(KeyError::InvalidFormat);
        }
        let private_key = SecretKey::from_slice(&raw.key[1..]);
        raw.key.zeroize();
        Ok(Self {
            network: raw.network,
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: raw.child_number,
            chain_code: raw.chain_code,
            private_key: private_key.map_err(|_| KeyError::InvalidFormat)?,
        })
    }
}

impl ExtendedPubKey {
    /// Derives a non-hardened child. Hardened indexes require the private key
    /// and are rejected with `InvalidArgument`.
    pub fn derive_child(&self, index: u32) -> Result<Self, KeyError> {
        if index >= HARDENED_OFFSET {
            return Err(KeyError::InvalidArgument);
        }
        let depth = self.depth.checked_add(1).ok_or(KeyError::InvalidArgument)?;
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(self.public_key.to_encoded_point(true).as_bytes());
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data);
        let tweak = scalar_from_hmac_half(&i[..32])?;
        let point = ProjectivePoint::GENERATOR * tweak + self.public_key.to_projective();
        // The identity point cannot be a public key; skip this index.
        let public_key =
            PublicKey::from_affine(point.to_affine()).map_err(|_| KeyError::CryptoOperation)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self {
            network: self.network,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            public_key,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn public_key_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(self.public_key.to_encoded_point(true).as_bytes());
        out
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Serializes to xpub (or tpub) text, 111 Base58Check characters.
    pub fn to_base58(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LENGTH];
        payload[..4].copy_from_slice(&self.network.public_version());
        payload[4] = self.depth;
        payload[5..9].copy_from_slice(&self.parent_fingerprint);
        payload[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        payload[13..45].copy_from_slice(&self.chain_code);
        payload[45..].copy_from_slice(&self.public_key_compressed());
        base58_check_encode(&payload)
    }

    pub fn from_base58(text: &str) -> Result<Self, KeyError> {
        let raw = parse_payload(text)?;
        if raw.is_private {
            return Err(KeyError::InvalidFormat);
        }
        let public_key =
            PublicKey::from_sec1_bytes(&raw.key).map_err(|_| KeyError::InvalidFormat)?;
        Ok(Self {
            network: raw.network,
            depth: raw.depth,
            parent_fingerprint: raw.parent_fingerprint,
            child_number: raw.child_number,
            chain_code: raw.chain_code,
            public_key,
        })
    }
}

struct RawExtendedKey {
    network: Network,
    is_private: bool,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    key: [u8; 33],
}

fn parse_payload(text: &str) -> Result<RawExtendedKey, KeyError> {
    let mut payload = base58_check_decode(text).map_err(|_| KeyError::InvalidFormat)?;
    if payload.len() != PAYLOAD_LENGTH {
        payload.zeroize();
        return Err(KeyError::InvalidFormat);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&payload[..4]);
    let (network, is_private) = match version {
        MAINNET_PRIVATE_VERSION => (Network::Mainnet, true),
        MAINNET_PUBLIC_VERSION => (Network::Mainnet, false),
        TESTNET_PRIVATE_VERSION => (Network::Testnet, true),
        TESTNET_PUBLIC_VERSION => (Network::Testnet, false),
        _ => {
            payload.zeroize();
            return Err(KeyError::InvalidFormat);
        }
    };
    let depth = payload[4];
    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&payload[5..9]);
    let child_number = u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]);
    // A master key has no parent to reference.
    if depth == 0 && (child_number != 0 || parent_fingerprint != [0u8; 4]) {
        payload.zeroize();
        return Err(KeyError::InvalidFormat);
    }
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&payload[13..45]);
    let mut key = [0u8; 33];
    key.copy_from_slice(&payload[45..]);
    payload.zeroize();
    Ok(RawExtendedKey {
        network,
        is_private,
        depth,
        parent_fingerprint,
        child_number,
        chain_code,
        key,
    })
}

impl fmt::Debug for ExtendedPrivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivKey")
            .field("network", &self.network)
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("private_key", &"<redacted>")
            .finish()
    }
}
