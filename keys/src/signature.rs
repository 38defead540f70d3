use ecdsa::RecoveryId;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use std::fmt;

use crate::error::KeyError;
use crate::point::EcPoint;

pub const SIGNATURE_LENGTH: usize = 64;

/// Half of the secp256r1 group order. Signatures whose `s` exceeds this value
/// are malleable and rejected by network consensus.
pub const CURVE_ORDER_HALF: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xde, 0x73, 0x7d, 0x56, 0xd3, 0x8b, 0xcf, 0x42, 0x79, 0xdc, 0xe5, 0x61, 0x7e, 0x31,
    0x92, 0xa8,
];

/// An ECDSA signature over secp256r1 with an optional recovery id.
///
/// The recovery id is stored in `{0, 1, 2, 3}`; [`EcdsaSignature::v`] exposes
/// the legacy 27-offset form some callers expect.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: Option<u8>,
}

impl EcdsaSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: Option<u8>) -> Result<Self, KeyError> {
        if let Some(id) = recovery_id {
            if id > 3 {
                return Err(KeyError::InvalidArgument);
            }
        }
        Ok(Self { r, s, recovery_id })
    }

    /// Parses the 64-byte `r ‖ s` concatenation. No recovery id is attached.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(KeyError::InvalidArgument);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self {
            r,
            s,
            recovery_id: None,
        })
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }

    /// Legacy recovery id in the `[27, 30]` convention.
    pub fn v(&self) -> Option<u8> {
        self.recovery_id.map(|id| id + 27)
    }

    /// A signature is canonical iff `s` is at most half the group order.
    pub fn is_canonical(&self) -> bool {
        self.s.as_slice() <= CURVE_ORDER_HALF.as_slice()
    }

    /// Recomputes the candidate public key for recovery id `v` in `{0..=3}`.
    pub fn recover_public_key(&self, v: u8, message_hash: &[u8; 32]) -> Result<EcPoint, KeyError> {
        let recovery_id = RecoveryId::from_byte(v).ok_or(KeyError::InvalidArgument)?;
        let signature = self.to_p256()?;
        let key = VerifyingKey::recover_from_prehash(message_hash, &signature, recovery_id)
            .map_err(|_| KeyError::CryptoOperation)?;
        Ok(EcPoint::from(&key))
    }

    pub(crate) fn from_p256(signature: &Signature, recovery_id: Option<u8>) -> Self {
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s, recovery_id }
    }

    pub(crate) fn to_p256(&self) -> Result<Signature, KeyError> {
        Signature::from_scalars(self.r, self.s).map_err(|_| KeyError::CryptoOperation)
    }
}

/// Standard ECDSA verification over a 32-byte digest. Never errors: any
/// malformed key or signature yields `false`.
pub fn verify_signature(
    message_hash: &[u8; 32],
    signature: &EcdsaSignature,
    public_key: &[u8],
) -> bool {
    let Ok(key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = signature.to_p256() else {
        return false;
    };
    key.verify_prehash(message_hash, &signature).is_ok()
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EcdsaSignature(r: {}, s: {}, v: {:?})",
            hex::encode(self.r),
            hex::encode(self.s),
            self.recovery_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn byte_round_trip() {
        let mut raw = [0u8; 64];
        raw[0] = 0x11;
        raw[63] = 0x22;
        let sig = EcdsaSignature::from_bytes(&raw).unwrap();
        assert_eq!(sig.to_bytes(), raw);
        assert_eq!(sig.recovery_id(), None);
        assert_eq!(sig.v(), None);
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert_eq!(
            EcdsaSignature::from_bytes(&[0u8; 63]),
            Err(KeyError::InvalidArgument)
        );
        assert_eq!(
            EcdsaSignature::from_bytes(&[0u8; 65]),
            Err(KeyError::InvalidArgument)
        );
    }

    #[test]
    fn new_rejects_out_of_range_recovery_id() {
        assert_eq!(
            EcdsaSignature::new([1u8; 32], [1u8; 32], Some(4)),
            Err(KeyError::InvalidArgument)
        );
        let sig = EcdsaSignature::new([1u8; 32], [1u8; 32], Some(1)).unwrap();
        assert_eq!(sig.v(), Some(28));
    }

    #[test]
    fn high_s_is_not_canonical() {
        // s = n - 1, maximal valid scalar, above the half order.
        let high_s = hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632550");
        let sig = EcdsaSignature::new([1u8; 32], high_s, None).unwrap();
        assert!(!sig.is_canonical());

        let sig = EcdsaSignature::new([1u8; 32], CURVE_ORDER_HALF, None).unwrap();
        assert!(sig.is_canonical());
    }

    #[test]
    fn recover_rejects_out_of_range_v() {
        let sig = EcdsaSignature::new([1u8; 32], [1u8; 32], None).unwrap();
        assert_eq!(
            sig.recover_public_key(4, &[0u8; 32]),
            Err(KeyError::InvalidArgument)
        );
    }

    #[test]
    fn verify_accepts_signature_rebuilt_from_bytes() {
        let kp = crate::keypair::KeyPair::new_random();
        let hash = [0x5au8; 32];
        let sig = kp.sign(&hash).unwrap();
        let rebuilt = EcdsaSignature::from_bytes(&sig.to_bytes()).unwrap();
        assert!(verify_signature(&hash, &rebuilt, &kp.public_key_compressed()));
    }

    #[test]
    fn verify_tolerates_garbage_inputs() {
        let sig = EcdsaSignature::new([0u8; 32], [0u8; 32], None).unwrap();
        assert!(!verify_signature(&[0u8; 32], &sig, &[0u8; 33]));
        assert!(!verify_signature(&[0u8; 32], &sig, b"not a key"));
    }
}
