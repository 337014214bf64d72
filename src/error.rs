//! Error types for key serialization

use thiserror::Error;

/// Result type alias for key-codec operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Payload length or prefix does not match any known encoding
    #[error("unrecognized key format")]
    UnrecognizedFormat,
    /// Base58Check checksum mismatch (corrupt or mistyped text)
    #[error("base58 checksum mismatch")]
    InvalidChecksum,
    /// Version byte does not match the configured network
    #[error("version byte {0:#04x} does not match the configured network")]
    UnknownVersion(u8),
    /// Payload length is not valid for the detected format
    #[error("invalid payload length {0}")]
    InvalidLength(usize),
    /// BIP38 address-hash verification failed after decryption
    #[error("passphrase does not match")]
    WrongPassphrase,
    /// A passphrase is required but the supplier yielded none
    #[error("a passphrase is required but none is available")]
    MissingPassphrase,
    /// A recognized but unsupported encoding variant
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(&'static str),
    /// A caller-supplied parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Secp256k1 error
    #[error("secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),
    /// scrypt or cipher setup failed
    #[error("key derivation failed")]
    KeyDerivation,
}

impl From<bs58::decode::Error> for Error {
    fn from(e: bs58::decode::Error) -> Self {
        match e {
            bs58::decode::Error::InvalidChecksum {
                ..
            } => Error::InvalidChecksum,
            _ => Error::UnrecognizedFormat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_error_mapping() {
        // Checksum variant maps to InvalidChecksum, everything else is unrecognized
        let bad_checksum = bs58::decode("1111111111").with_check(None).into_vec();
        assert_eq!(Error::from(bad_checksum.unwrap_err()), Error::InvalidChecksum);

        let bad_alphabet = bs58::decode("0OIl").with_check(None).into_vec();
        assert_eq!(Error::from(bad_alphabet.unwrap_err()), Error::UnrecognizedFormat);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::UnknownVersion(0xef).to_string(),
            "version byte 0xef does not match the configured network"
        );
        assert_eq!(Error::WrongPassphrase.to_string(), "passphrase does not match");
    }
}
