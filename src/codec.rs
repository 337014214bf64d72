//! Format detection and dispatch
//!
//! [`KeyCodec`] is the entry point applications use: it owns the
//! network parameters and an optional passphrase supplier, detects the
//! encoding of incoming text, and routes to the WIF or BIP38 logic.

use crate::bip38;
use crate::error::{Error, Result};
use crate::keypair::KeyPair;
use crate::network::NetworkParams;
use crate::utils::decode_base58check;
use crate::wif;

/// A capability that yields a passphrase on demand.
///
/// Invoked at most once per encode/decode call, and only after the
/// detected format is known to need one, so WIF traffic never triggers
/// a prompt. `None` means no passphrase is available.
pub trait PassphraseProvider {
    /// Produce the passphrase, or `None` if unavailable.
    fn passphrase(&self) -> Option<String>;
}

impl<F> PassphraseProvider for F
where
    F: Fn() -> Option<String>,
{
    fn passphrase(&self) -> Option<String> {
        self()
    }
}

/// Serializes and parses private keys under fixed network parameters.
pub struct KeyCodec {
    network: NetworkParams,
    passphrase: Option<Box<dyn PassphraseProvider + Send + Sync>>,
}

impl KeyCodec {
    /// A codec without a passphrase supplier; it can handle WIF only.
    pub fn new(network: NetworkParams) -> Self {
        Self {
            network,
            passphrase: None,
        }
    }

    /// A codec with a passphrase supplier for the BIP38 paths.
    pub fn with_passphrase<P>(network: NetworkParams, provider: P) -> Self
    where
        P: PassphraseProvider + Send + Sync + 'static,
    {
        Self {
            network,
            passphrase: Some(Box::new(provider)),
        }
    }

    /// The network parameters this codec was built with.
    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    /// Serialize a key pair.
    ///
    /// Produces BIP38 when the passphrase supplier yields a passphrase,
    /// plain WIF otherwise.
    pub fn encode(&self, key: &KeyPair) -> Result<String> {
        match self.passphrase.as_ref().and_then(|p| p.passphrase()) {
            Some(pass) => bip38::encrypt(key, &pass, &self.network),
            None => Ok(wif::encode(key, &self.network)),
        }
    }

    /// Serialize a key pair as plain WIF, ignoring any supplier.
    pub fn encode_plain(&self, key: &KeyPair) -> String {
        wif::encode(key, &self.network)
    }

    /// Parse serialized key text, detecting its format.
    pub fn decode(&self, s: &str) -> Result<KeyPair> {
        let payload = decode_base58check(s)?;
        if payload.len() == bip38::PAYLOAD_LEN
            && (payload.starts_with(&[0x01, 0x42]) || payload.starts_with(&[0x01, 0x43]))
        {
            let pass = self.require_passphrase()?;
            bip38::decrypt_payload(&payload, &pass, &self.network)
        } else if payload.len() == 33 || payload.len() == 34 {
            wif::from_payload(&payload, &self.network)
        } else {
            Err(Error::UnrecognizedFormat)
        }
    }

    fn require_passphrase(&self) -> Result<String> {
        self.passphrase
            .as_ref()
            .and_then(|p| p.passphrase())
            .ok_or(Error::MissingPassphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encode_base58check;

    const WIF_UNCOMPRESSED: &str = "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ";
    const BIP38_NON_EC: &str = "6PRVWUbkzzsbcVac2qwfssoUJAN1Xhrg6bNk8J7Nzm5H7kxEbn2Nh2ZoGg";

    #[test]
    fn test_wif_never_consults_the_supplier() {
        let codec = KeyCodec::with_passphrase(NetworkParams::MAINNET, || -> Option<String> {
            panic!("passphrase requested for WIF input")
        });
        let key = codec.decode(WIF_UNCOMPRESSED).unwrap();
        assert!(!key.compressed());
        codec.encode_plain(&key);
    }

    #[test]
    fn test_bip38_without_supplier() {
        let codec = KeyCodec::new(NetworkParams::MAINNET);
        assert_eq!(codec.decode(BIP38_NON_EC), Err(Error::MissingPassphrase));

        let declining = KeyCodec::with_passphrase(NetworkParams::MAINNET, || None::<String>);
        assert_eq!(declining.decode(BIP38_NON_EC), Err(Error::MissingPassphrase));
    }

    #[test]
    fn test_encode_without_passphrase_is_wif() {
        let key = KeyPair::from_secret_bytes(&[0x21u8; 32], true).unwrap();
        let codec = KeyCodec::new(NetworkParams::MAINNET);
        let text = codec.encode(&key).unwrap();
        assert_eq!(text, codec.encode_plain(&key));

        // A supplier that declines also falls back to WIF
        let declining = KeyCodec::with_passphrase(NetworkParams::MAINNET, || None::<String>);
        assert_eq!(declining.encode(&key).unwrap(), text);
    }

    #[test]
    fn test_unknown_prefix_is_unrecognized() {
        // Valid Base58Check, 39 bytes, but no known prefix
        let mut payload = vec![0x02, 0x42];
        payload.extend_from_slice(&[0u8; 37]);
        let text = encode_base58check(&payload);
        let codec = KeyCodec::new(NetworkParams::MAINNET);
        assert_eq!(codec.decode(&text), Err(Error::UnrecognizedFormat));

        // Unknown length as well
        let text = encode_base58check(&[0x80; 20]);
        assert_eq!(codec.decode(&text), Err(Error::UnrecognizedFormat));
    }

    #[test]
    fn test_corrupt_text_is_a_checksum_error() {
        let codec = KeyCodec::new(NetworkParams::MAINNET);
        let mut corrupted = String::from(WIF_UNCOMPRESSED);
        corrupted.replace_range(10..11, "x");
        assert_eq!(codec.decode(&corrupted), Err(Error::InvalidChecksum));
    }
}
