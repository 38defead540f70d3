//! NEP-2 password-protected private keys.
//!
//! A key is whitened with scrypt output and encrypted under AES-256-ECB; the
//! first four bytes of the owner's script hash double as the scrypt salt and
//! the only integrity check. There is no MAC: a wrong password surfaces as a
//! salt mismatch after decryption.

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use crypto_utils::base58::{base58_check_decode, base58_check_encode};
use zeroize::{Zeroize, Zeroizing};

use crate::error::KeyError;
use crate::keypair::KeyPair;

pub const NEP2_PREFIX: [u8; 2] = [0x01, 0x42];
pub const NEP2_FLAG_COMPRESSED: u8 = 0xE0;
pub const NEP2_FLAG_UNCOMPRESSED: u8 = 0xC0;

/// Length of the Base58Check text form.
pub const NEP2_LENGTH: usize = 58;

const PAYLOAD_LENGTH: usize = 39;
const SALT_LENGTH: usize = 4;
const DERIVED_LENGTH: usize = 64;

/// scrypt cost parameters. `n` must be a power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScryptParams {
    pub n: u32,
    pub r: u32,
    pub p: u32,
}

impl Default for ScryptParams {
    /// The interoperability parameters every wallet agrees on.
    fn default() -> Self {
        Self {
            n: 16384,
            r: 8,
            p: 8,
        }
    }
}

impl ScryptParams {
    /// Weak parameters for tests and development tooling. Must be requested
    /// explicitly; keys hardened with these are cheap to brute-force.
    pub fn light() -> Self {
        Self { n: 1024, r: 1, p: 1 }
    }

    fn to_kdf(self) -> Result<scrypt::Params, KeyError> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(KeyError::InvalidArgument);
        }
        let log_n = self.n.trailing_zeros() as u8;
        scrypt::Params::new(log_n, self.r, self.p, DERIVED_LENGTH)
            .map_err(|_| KeyError::InvalidArgument)
    }
}

fn derive_key(
    password: &str,
    salt: &[u8; SALT_LENGTH],
    params: &ScryptParams,
) -> Result<Zeroizing<[u8; DERIVED_LENGTH]>, KeyError> {
    let mut derived = Zeroizing::new([0u8; DERIVED_LENGTH]);
    scrypt::scrypt(password.as_bytes(), salt, &params.to_kdf()?, derived.as_mut())
        .map_err(|_| KeyError::CryptoOperation)?;
    Ok(derived)
}

fn aes256_apply<F>(key: &[u8], block32: &mut [u8; 32], f: F)
where
    F: Fn(&Aes256, &mut aes::Block),
{
    let cipher = Aes256::new(GenericArray::from_slice(key));
    for chunk in block32.chunks_exact_mut(16) {
        f(&cipher, GenericArray::from_mut_slice(chunk));
    }
}

/// Encrypts a key pair's private half under `password`.
pub fn encrypt(
    keypair: &KeyPair,
    password: &str,
    params: &ScryptParams,
) -> Result<String, KeyError> {
    let script_hash = keypair.script_hash();
    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(&script_hash[..SALT_LENGTH]);

    let derived = derive_key(password, &salt, params)?;

    let private_key = keypair.private_key_bytes();
    let mut block = Zeroizing::new([0u8; 32]);
    for (out, (key_byte, pad)) in block
        .iter_mut()
        .zip(private_key.iter().zip(derived[..32].iter()))
    {
        *out = key_byte ^ pad;
    }
    aes256_apply(&derived[32..], &mut block, |cipher, chunk| {
        cipher.encrypt_block(chunk)
    });

    let mut payload = [0u8; PAYLOAD_LENGTH];
    payload[..2].copy_from_slice(&NEP2_PREFIX);
    payload[2] = NEP2_FLAG_COMPRESSED;
    payload[3..7].copy_from_slice(&salt);
    payload[7..].copy_from_slice(block.as_ref());
    Ok(base58_check_encode(&payload))
}

/// Decrypts a NEP-2 string. A wrong password is detected by re-deriving the
/// script hash from the recovered key and comparing its prefix to the salt.
pub fn decrypt(nep2: &str, password: &str, params: &ScryptParams) -> Result<KeyPair, KeyError> {
    if nep2.len() != NEP2_LENGTH {
        return Err(KeyError::InvalidFormat);
    }
    let payload = base58_check_decode(nep2).map_err(|_| KeyError::InvalidFormat)?;
    if payload.len() != PAYLOAD_LENGTH
        || payload[..2] != NEP2_PREFIX
        || !matches!(payload[2], NEP2_FLAG_COMPRESSED | NEP2_FLAG_UNCOMPRESSED)
    {
        return Err(KeyError::InvalidFormat);
    }
    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(&payload[3..7]);

    let derived = derive_key(password, &salt, params)?;

    let mut block = Zeroizing::new([0u8; 32]);
    block.copy_from_slice(&payload[7..]);
    aes256_apply(&derived[32..], &mut block, |cipher, chunk| {
        cipher.decrypt_block(chunk)
    });
    for (byte, pad) in block.iter_mut().zip(derived[..32].iter()) {
        *byte ^= pad;
    }

    // An out-of-range recovered scalar is also wrong-password evidence.
    let keypair =
        KeyPair::from_private_key(block.as_ref()).map_err(|_| KeyError::InvalidPassword)?;
    let mut script_hash = keypair.script_hash();
    let matches = script_hash[..SALT_LENGTH] == salt;
    script_hash.zeroize();
    if !matches {
        return Err(KeyError::InvalidPassword);
    }
    Ok(keypair)
}
