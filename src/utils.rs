//! Small helpers shared by the codec modules

use sha2::{Digest, Sha256};

use crate::error::Result;

/// Double SHA-256
pub(crate) fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// XOR `mask` into `target`. Both slices must have equal length.
pub(crate) fn xor_in_place(target: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(target.len(), mask.len());
    for (t, m) in target.iter_mut().zip(mask) {
        *t ^= m;
    }
}

/// Base58Check-decode, stripping the 4-byte checksum.
pub(crate) fn decode_base58check(s: &str) -> Result<Vec<u8>> {
    Ok(bs58::decode(s).with_check(None).into_vec()?)
}

/// Base58Check-encode, appending the 4-byte checksum.
pub(crate) fn encode_base58check(data: &[u8]) -> String {
    bs58::encode(data).with_check().into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256d() {
        assert_eq!(
            hex::encode(sha256d(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_xor_in_place() {
        let mut target = [0b1010_1010u8, 0xFF];
        xor_in_place(&mut target, &[0b0101_0101, 0xFF]);
        assert_eq!(target, [0xFF, 0x00]);
    }

    #[test]
    fn test_base58check_round_trip() {
        let data = [0x80, 0x01, 0x02, 0x03];
        let encoded = encode_base58check(&data);
        assert_eq!(decode_base58check(&encoded).unwrap(), data);
    }
}
