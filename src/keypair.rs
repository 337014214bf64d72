//! Key pair type shared by the WIF and BIP38 paths

use core::fmt;

use secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::error::Result;

/// A secp256k1 key pair with its public-encoding preference.
///
/// The public point always equals `d·G`; the compression flag decides
/// whether [`KeyPair::public_bytes`] yields the 33-byte or the 65-byte
/// encoding, and is carried through every serialization round trip.
///
/// The private scalar is erased when the pair is dropped. Callers that
/// want to dispose of it earlier call [`KeyPair::scrub`] explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
    compressed: bool,
}

impl KeyPair {
    /// Build a key pair from an existing secret key.
    pub fn from_secret_key(secret: SecretKey, compressed: bool) -> Self {
        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Self {
            secret,
            public,
            compressed,
        }
    }

    /// Build a key pair from a 32-byte big-endian scalar.
    ///
    /// Fails if the bytes are not in the valid scalar range `1 ≤ d < n`.
    pub fn from_secret_bytes(bytes: &[u8], compressed: bool) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)?;
        Ok(Self::from_secret_key(secret, compressed))
    }

    /// Generate a fresh random key pair.
    pub fn generate(compressed: bool) -> Self {
        Self::from_secret_key(SecretKey::new(&mut rand::thread_rng()), compressed)
    }

    /// The private scalar, big-endian.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// The underlying secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// The public point.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Serialized public point, 33 or 65 bytes per the compression flag.
    pub fn public_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public.serialize().to_vec()
        } else {
            self.public.serialize_uncompressed().to_vec()
        }
    }

    /// Whether the compressed public encoding is produced.
    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Overwrite the private scalar in memory.
    ///
    /// The pair is unusable afterwards; this exists so callers can end
    /// the secret's lifetime at a point of their choosing instead of
    /// waiting for the drop.
    pub fn scrub(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

// The private scalar stays out of Debug output.
impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_encoding_lengths() {
        let compressed = KeyPair::from_secret_bytes(&[0x11u8; 32], true).unwrap();
        assert_eq!(compressed.public_bytes().len(), 33);

        let uncompressed = KeyPair::from_secret_bytes(&[0x11u8; 32], false).unwrap();
        assert_eq!(uncompressed.public_bytes().len(), 65);

        // Same point either way, only the serialization differs
        assert_eq!(compressed.public_key(), uncompressed.public_key());
    }

    #[test]
    fn test_rejects_invalid_scalar() {
        assert!(KeyPair::from_secret_bytes(&[0u8; 32], true).is_err());
        assert!(KeyPair::from_secret_bytes(&[0xFFu8; 32], true).is_err());
        assert!(KeyPair::from_secret_bytes(&[0x11u8; 31], true).is_err());
    }

    #[test]
    fn test_generate() {
        let a = KeyPair::generate(true);
        let b = KeyPair::generate(true);
        assert_ne!(a.secret_bytes(), b.secret_bytes());
        assert_eq!(a.public_bytes().len(), 33);
    }

    #[test]
    fn test_scrub_erases_secret() {
        let mut key = KeyPair::from_secret_bytes(&[0x42u8; 32], true).unwrap();
        key.scrub();
        assert_ne!(key.secret_bytes(), [0x42u8; 32]);
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = KeyPair::from_secret_bytes(&[0x42u8; 32], true).unwrap();
        assert!(!format!("{:?}", key).contains("4242"));
    }
}
