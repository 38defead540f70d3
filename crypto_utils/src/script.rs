use crate::hash::hash160;

/// Pushes the next 33 bytes onto the evaluation stack.
const OP_PUSHBYTES_33: u8 = 0x21;
/// Verifies an ECDSA signature against the pushed public key.
const OP_CHECKSIG: u8 = 0xAC;

pub const SINGLE_SIG_SCRIPT_LENGTH: usize = 35;

/// Builds the standard single-signature verification script for a compressed
/// public key: `PUSHBYTES33 <pubkey> CHECKSIG`.
pub fn single_sig_verification_script(pubkey: &[u8; 33]) -> [u8; SINGLE_SIG_SCRIPT_LENGTH] {
    let mut script = [0u8; SINGLE_SIG_SCRIPT_LENGTH];
    script[0] = OP_PUSHBYTES_33;
    script[1..34].copy_from_slice(pubkey);
    script[34] = OP_CHECKSIG;
    script
}

/// HASH160 of the single-signature verification script, the account's script
/// hash used for addresses and NEP-2 salts.
pub fn verification_script_hash(pubkey: &[u8; 33]) -> [u8; 20] {
    hash160(&single_sig_verification_script(pubkey))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash160;
    use hex_literal::hex;

    #[test]
    fn script_layout() {
        let pubkey = hex!("036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");
        let script = single_sig_verification_script(&pubkey);
        assert_eq!(script.len(), SINGLE_SIG_SCRIPT_LENGTH);
        assert_eq!(script[0], OP_PUSHBYTES_33);
        assert_eq!(&script[1..34], &pubkey);
        assert_eq!(script[34], OP_CHECKSIG);
    }

    #[test]
    fn script_hash_matches_hash160_of_script() {
        let pubkey = hex!("036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296");
        let script = single_sig_verification_script(&pubkey);
        assert_eq!(verification_script_hash(&pubkey), hash160(&script));
    }
}
