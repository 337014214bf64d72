//! Key Codec Library
//!
//! Serialization of secp256k1 private keys for wallet import/export:
//! plain Wallet Import Format (WIF) and passphrase-encrypted BIP38, in
//! both the non-EC-multiplied and EC-multiplied variants.
//!
//! [`KeyCodec`] detects the format of incoming text and dispatches;
//! the per-format modules are public for callers that already know
//! what they are holding. All operations are synchronous and touch no
//! global state, so independent calls may run on independent threads.
//! The scrypt-based BIP38 paths are deliberately expensive; keep them
//! off latency-sensitive threads.


pub mod address;
pub mod bip38;
pub mod codec;
pub mod error;
pub mod keypair;
pub mod network;
pub(crate) mod utils;
pub mod wif;

pub use codec::{KeyCodec, PassphraseProvider};
pub use error::{Error, Result};
pub use keypair::KeyPair;
pub use network::NetworkParams;

/// Re-export commonly used types
pub mod prelude {
    pub use super::{Error, KeyCodec, KeyPair, NetworkParams, PassphraseProvider, Result};
}
