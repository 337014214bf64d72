//! Wallet Import Format encode/decode
//!
//! WIF is the plain Base58Check rendering of a private key: version
//! byte, 32-byte scalar, and a trailing `0x01` marker when the public
//! key is compressed.

use crate::error::{Error, Result};
use crate::keypair::KeyPair;
use crate::network::NetworkParams;
use crate::utils::{decode_base58check, encode_base58check};

/// Marker byte appended to the payload of compressed keys
const COMPRESSION_MARKER: u8 = 0x01;

/// Encode a key pair as WIF.
pub fn encode(key: &KeyPair, network: &NetworkParams) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(network.wif_version());
    payload.extend_from_slice(&key.secret_bytes());
    if key.compressed() {
        payload.push(COMPRESSION_MARKER);
    }
    encode_base58check(&payload)
}

/// Decode a WIF string under the given network parameters.
pub fn decode(s: &str, network: &NetworkParams) -> Result<KeyPair> {
    from_payload(&decode_base58check(s)?, network)
}

/// Decode an already Base58Check-stripped WIF payload.
pub(crate) fn from_payload(payload: &[u8], network: &NetworkParams) -> Result<KeyPair> {
    let (version, rest) = match payload.split_first() {
        Some(split) => split,
        None => return Err(Error::InvalidLength(0)),
    };
    if *version != network.wif_version() {
        return Err(Error::UnknownVersion(*version));
    }

    let compressed = match rest.len() {
        32 => false,
        33 if rest[32] == COMPRESSION_MARKER => true,
        _ => return Err(Error::InvalidLength(payload.len())),
    };

    KeyPair::from_secret_bytes(&rest[..32], compressed)
}
