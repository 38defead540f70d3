use crate::hash::sha256d;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    InvalidCharacter(char),
    InvalidLength,
    InvalidChecksum,
}

pub const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn base58_encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // Base-256 to base-58 conversion; digits accumulate least significant first.
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in &data[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut encoded = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        encoded.push('1');
    }
    for &digit in digits.iter().rev() {
        encoded.push(BASE58_ALPHABET[digit as usize] as char);
    }
    encoded
}

pub fn base58_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    if s.is_empty() {
        return Err(Base58Error::InvalidLength);
    }
    let zeros = s.bytes().take_while(|&b| b == b'1').count();

    // Bytes accumulate least significant first.
    let mut bytes: Vec<u8> = Vec::with_capacity(s.len());
    for c in s.chars().skip(zeros) {
        if !c.is_ascii() {
            return Err(Base58Error::InvalidCharacter(c));
        }
        let mut carry = BASE58_ALPHABET
            .iter()
            .position(|&a| a == c as u8)
            .ok_or(Base58Error::InvalidCharacter(c))? as u32;
        for byte in bytes.iter_mut() {
            carry += *byte as u32 * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut decoded = vec![0u8; zeros];
    decoded.extend(bytes.iter().rev());
    Ok(decoded)
}

/// Appends the first 4 bytes of `sha256d(payload)` before encoding.
pub fn base58_check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut extended = Vec::with_capacity(payload.len() + 4);
    extended.extend_from_slice(payload);
    extended.extend_from_slice(&checksum[..4]);
    base58_encode(&extended)
}

/// Decodes and strips the 4-byte checksum, validating it against the payload.
pub fn base58_check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = base58_decode(s)?;
    if raw.len() < 4 {
        return Err(Base58Error::InvalidLength);
    }
    let (payload, checksum) = raw.split_at(raw.len() - 4);
    if sha256d(payload)[..4] != *checksum {
        return Err(Base58Error::InvalidChecksum);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_vectors() {
        assert_eq!(base58_encode(&[0x00]), "1");
        assert_eq!(base58_encode(&[0x61]), "2g");
        assert_eq!(base58_encode(&[0x62, 0x62, 0x62]), "a3gV");
        assert_eq!(base58_encode(&[0x63, 0x63, 0x63]), "aPEr");
    }

    #[test]
    fn encode_preserves_leading_zeros() {
        assert_eq!(base58_encode(&[0, 1]), "12");
        assert_eq!(base58_encode(&[0, 0, 1]), "112");
        assert_eq!(base58_encode(&[0, 0, 0, 0, 1]), "11112");
        assert_eq!(base58_decode("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn decode_empty_is_rejected() {
        assert_eq!(base58_decode(""), Err(Base58Error::InvalidLength));
    }

    #[test]
    fn decode_known_values() {
        assert_eq!(base58_decode("2").unwrap(), vec![1]);
        assert_eq!(base58_decode("Ldp").unwrap(), vec![1, 2, 3]);
        assert_eq!(base58_decode("15T").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn decode_rejects_invalid_characters() {
        match base58_decode("0OIl") {
            Err(Base58Error::InvalidCharacter(c)) => assert_eq!(c, '0'),
            other => panic!("expected InvalidCharacter, got {:?}", other),
        }
        assert!(matches!(
            base58_decode("4P1e!"),
            Err(Base58Error::InvalidCharacter('!'))
        ));
    }

    #[test]
    fn decode_rejects_non_ascii() {
        assert!(matches!(
            base58_decode("ab\u{00e9}"),
            Err(Base58Error::InvalidCharacter(_))
        ));
    }

    #[test]
    fn round_trip() {
        let data = b"hello world";
        let encoded = base58_encode(data);
        assert_eq!(base58_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn check_round_trip() {
        let payload = b"Base58Check";
        let encoded = base58_check_encode(payload);
        assert_eq!(base58_check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn check_rejects_corrupted_checksum() {
        let mut encoded = base58_check_encode(b"Hello, World!").into_bytes();
        encoded[0] ^= 1;
        let result = base58_check_decode(std::str::from_utf8(&encoded).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn check_rejects_truncation() {
        let encoded = base58_check_encode(b"Hello");
        assert!(base58_check_decode(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn check_empty_payload() {
        let encoded = base58_check_encode(b"");
        assert_eq!(base58_check_decode(&encoded).unwrap(), b"");
    }
}
