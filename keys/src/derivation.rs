use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;
use crate::extended_key::{ExtendedPrivKey, ExtendedPubKey, HARDENED_OFFSET};

/// A parsed BIP-32 derivation path such as `m/44'/888'/0'/0/0`.
///
/// Hardened segments accept `'`, `h`, or `H` suffixes on parse and render
/// back with `'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationPath {
    indexes: Vec<u32>,
}

impl DerivationPath {
    pub fn indexes(&self) -> &[u32] {
        &self.indexes
    }

    /// Walks the path from `root`, applying each child index in order.
    pub fn derive_private(&self, root: &ExtendedPrivKey) -> Result<ExtendedPrivKey, KeyError> {
        let mut key = root.clone();
        for &index in &self.indexes {
            key = key.derive_child(index)?;
        }
        Ok(key)
    }

    /// Public-only path walk. Fails on the first hardened segment.
    pub fn derive_public(&self, root: &ExtendedPubKey) -> Result<ExtendedPubKey, KeyError> {
        let mut key = root.clone();
        for &index in &self.indexes {
            key = key.derive_child(index)?;
        }
        Ok(key)
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        if segments.next() != Some("m") {
            return Err(KeyError::InvalidFormat);
        }
        let mut indexes = Vec::new();
        for segment in segments {
            let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
                Some(rest) => (rest, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(KeyError::InvalidFormat);
            }
            let index: u32 = digits.parse().map_err(|_| KeyError::InvalidFormat)?;
            if index >= HARDENED_OFFSET {
                return Err(KeyError::InvalidFormat);
            }
            indexes.push(if hardened { index | HARDENED_OFFSET } else { index });
        }
        Ok(Self { indexes })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &index in &self.indexes {
            if index >= HARDENED_OFFSET {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}
