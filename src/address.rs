//! Address derivation used for BIP38 checksums
//!
//! The codec never persists addresses; they exist so the 4-byte
//! address hash embedded in BIP38 payloads can be computed and
//! verified.

use bitcoin_hashes::{hash160, Hash};

use crate::utils::{encode_base58check, sha256d};

/// P2PKH address for a serialized public key.
pub fn p2pkh(pubkey: &[u8], version: u8) -> String {
    let hash = hash160::Hash::hash(pubkey);
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(hash.as_byte_array());
    encode_base58check(&data)
}

/// P2SH address for a raw script.
pub fn p2sh(script: &[u8], version: u8) -> String {
    let hash = hash160::Hash::hash(script);
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(hash.as_byte_array());
    encode_base58check(&data)
}

/// First four bytes of the double SHA-256 of the P2PKH address string.
///
/// This is the passphrase-correctness checksum (and scrypt salt) of
/// the BIP38 payload formats.
pub fn address_checksum(pubkey: &[u8], version: u8) -> [u8; 4] {
    let address = p2pkh(pubkey, version);
    let digest = sha256d(address.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Public key from the Base58Check reference example
    const PUBKEY_HEX: &str = "0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352";

    #[test]
    fn test_p2pkh_address() {
        let pubkey = hex::decode(PUBKEY_HEX).unwrap();
        assert_eq!(p2pkh(&pubkey, 0x00), "1PMycacnJaSqwwJqjawXBErnLsZ7RkXUAs");
    }

    #[test]
    fn test_p2sh_prefix() {
        // Any script hashes to a '3' address under the mainnet multisig version
        let address = p2sh(&[0x51, 0xAE], 0x05);
        assert!(address.starts_with('3'), "got: {}", address);
    }

    #[test]
    fn test_address_checksum_matches_address() {
        let pubkey = hex::decode(PUBKEY_HEX).unwrap();
        let address = p2pkh(&pubkey, 0x00);
        let digest = sha256d(address.as_bytes());
        assert_eq!(address_checksum(&pubkey, 0x00), digest[..4]);
    }
}
