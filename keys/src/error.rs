use std::fmt;

/// Errors produced by the key and signature engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Zero-length or wrong-size input, or a parameter outside its valid range.
    InvalidArgument,
    /// Malformed WIF/NEP-2/xprv/xpub text: bad character, checksum, length,
    /// version byte, or structural invariant.
    InvalidFormat,
    /// Byte string does not encode a point on secp256r1, or the point at
    /// infinity was used where a finite point is required.
    InvalidPoint,
    /// NEP-2 address-hash salt mismatch after decryption.
    InvalidPassword,
    /// Curve or cipher library failure, or a scalar outside `[1, n-1]`.
    CryptoOperation,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyError::InvalidArgument => "invalid argument",
            KeyError::InvalidFormat => "invalid format",
            KeyError::InvalidPoint => "invalid curve point",
            KeyError::InvalidPassword => "invalid password",
            KeyError::CryptoOperation => "cryptographic operation failed",
        })
    }
}

impl std::error::Error for KeyError {}
