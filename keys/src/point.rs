use p256::ecdsa::VerifyingKey;
use p256::elliptic_curve::bigint::U256;
use p256::elliptic_curve::group::Group;
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};

use crate::error::KeyError;

pub const COMPRESSED_LENGTH: usize = 33;
pub const UNCOMPRESSED_LENGTH: usize = 65;

/// A point on secp256r1, validated to lie on the curve at construction.
///
/// The point at infinity is a distinct singleton state with no byte encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcPoint {
    inner: Option<AffinePoint>,
}

impl EcPoint {
    /// Parses a SEC1 encoding, compressed (33 bytes, prefix 0x02/0x03) or
    /// uncompressed (65 bytes, prefix 0x04).
    pub fn decode(data: &[u8]) -> Result<Self, KeyError> {
        match (data.len(), data.first()) {
            (COMPRESSED_LENGTH, Some(0x02 | 0x03)) | (UNCOMPRESSED_LENGTH, Some(0x04)) => {}
            _ => return Err(KeyError::InvalidPoint),
        }
        let encoded = EncodedPoint::from_bytes(data).map_err(|_| KeyError::InvalidPoint)?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(KeyError::InvalidPoint)?;
        Ok(Self {
            inner: Some(affine),
        })
    }

    /// SEC1-encodes the point. The point at infinity has no valid encoding.
    pub fn encode(&self, compressed: bool) -> Result<Vec<u8>, KeyError> {
        let affine = self.inner.ok_or(KeyError::InvalidPoint)?;
        Ok(affine.to_encoded_point(compressed).as_bytes().to_vec())
    }

    /// The curve's base point G.
    pub fn generator() -> Self {
        Self {
            inner: Some(AffinePoint::GENERATOR),
        }
    }

    pub fn infinity() -> Self {
        Self { inner: None }
    }

    pub fn is_infinity(&self) -> bool {
        self.inner.is_none()
    }

    /// Finite points are validated on decode, so only infinity is off-curve.
    pub fn is_on_curve(&self) -> bool {
        self.inner.is_some()
    }

    /// Multiplies by a scalar interpreted as a big-endian integer, reduced
    /// modulo the group order. Infinity times anything is infinity.
    pub fn multiply(&self, scalar: &[u8; 32]) -> EcPoint {
        let Some(affine) = self.inner else {
            return Self::infinity();
        };
        let k = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*scalar));
        let product = ProjectivePoint::from(affine) * k;
        if bool::from(product.is_identity()) {
            Self::infinity()
        } else {
            Self {
                inner: Some(product.to_affine()),
            }
        }
    }

    pub(crate) fn from_affine(affine: AffinePoint) -> Self {
        Self {
            inner: Some(affine),
        }
    }
}

impl From<&VerifyingKey> for EcPoint {
    fn from(key: &VerifyingKey) -> Self {
        Self::from_affine(*key.as_affine())
    }
}
