//! BIP38 passphrase-protected private key encryption
//!
//! Two payload variants share the 39-byte layout behind the Base58Check
//! text (which renders with a human-visible `6P` prefix):
//!
//! 1. Non-EC-multiply (`0x0142`): the private scalar itself is XOR-masked
//!    and AES-encrypted under scrypt-derived material.
//! 2. EC-multiply (`0x0143`): the scalar is the product of a
//!    passphrase-derived factor and a seed-derived factor, so a party
//!    holding only the intermediate code can mint encrypted keys without
//!    ever learning the passphrase or the result.
//!
//! The embedded 4-byte address hash doubles as scrypt salt and as the
//! only passphrase-correctness check; decryption verifies it after
//! re-deriving the address and reports nothing more granular than
//! [`Error::WrongPassphrase`].

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use rand::Rng;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::address;
use crate::error::{Error, Result};
use crate::keypair::KeyPair;
use crate::network::NetworkParams;
use crate::utils::{decode_base58check, encode_base58check, sha256d, xor_in_place};

const PREFIX_NON_EC: [u8; 2] = [0x01, 0x42];
const PREFIX_EC: [u8; 2] = [0x01, 0x43];

/// Payload length of both variants, before the Base58Check checksum
pub(crate) const PAYLOAD_LEN: usize = 39;

// Flag byte: both high bits set marks the non-EC variant.
const FLAG_NON_EC_BASE: u8 = 0xC0;
const FLAG_COMPRESSED: u8 = 0x20;
const FLAG_LOT_SEQUENCE: u8 = 0x04;

// Intermediate-code magic, with and without lot/sequence numbers.
const MAGIC_INTERMEDIATE_LOT: [u8; 8] = [0x2C, 0xE9, 0xB3, 0xE1, 0xFF, 0x39, 0xE2, 0x51];
const MAGIC_INTERMEDIATE: [u8; 8] = [0x2C, 0xE9, 0xB3, 0xE1, 0xFF, 0x39, 0xE2, 0x53];
const INTERMEDIATE_LEN: usize = 49;

// Passphrase scrypt cost (N = 2^14, r = 8, p = 8); the second,
// passpoint-keyed pass of the EC variant runs at N = 2^10, r = 1, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 8;
const SCRYPT_EC_LOG_N: u8 = 10;

/// Encrypt a key pair with a passphrase (non-EC-multiply variant).
///
/// Deterministic: the salt is the address hash of the key itself, so
/// the same key and passphrase always produce the same text.
pub fn encrypt(key: &KeyPair, passphrase: &str, network: &NetworkParams) -> Result<String> {
    let address_hash = address::address_checksum(&key.public_bytes(), network.address_version);

    let pass = normalized(passphrase);
    let mut derived = Zeroizing::new([0u8; 64]);
    scrypt_derive(pass.as_bytes(), &address_hash, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, &mut derived[..])?;
    let (half1, half2) = derived.split_at(32);
    let cipher = Aes256::new(GenericArray::from_slice(half2));

    let secret = Zeroizing::new(key.secret_bytes());
    let mut block1 = [0u8; 16];
    let mut block2 = [0u8; 16];
    block1.copy_from_slice(&secret[..16]);
    block2.copy_from_slice(&secret[16..]);
    xor_in_place(&mut block1, &half1[..16]);
    xor_in_place(&mut block2, &half1[16..]);

    let mut data = Vec::with_capacity(PAYLOAD_LEN);
    data.extend_from_slice(&PREFIX_NON_EC);
    data.push(if key.compressed() {
        FLAG_NON_EC_BASE | FLAG_COMPRESSED
    } else {
        FLAG_NON_EC_BASE
    });
    data.extend_from_slice(&address_hash);
    data.extend_from_slice(&encrypt_block(&cipher, &block1));
    data.extend_from_slice(&encrypt_block(&cipher, &block2));
    Ok(encode_base58check(&data))
}

/// Decrypt a BIP38 string, detecting the variant from its prefix.
pub fn decrypt(s: &str, passphrase: &str, network: &NetworkParams) -> Result<KeyPair> {
    decrypt_payload(&decode_base58check(s)?, passphrase, network)
}

/// Decrypt an already Base58Check-stripped BIP38 payload.
pub(crate) fn decrypt_payload(
    payload: &[u8],
    passphrase: &str,
    network: &NetworkParams,
) -> Result<KeyPair> {
    if payload.len() != PAYLOAD_LEN {
        return Err(Error::InvalidLength(payload.len()));
    }
    if payload[..2] == PREFIX_NON_EC {
        decrypt_non_ec(payload, passphrase, network)
    } else if payload[..2] == PREFIX_EC {
        decrypt_ec(payload, passphrase, network)
    } else {
        Err(Error::UnrecognizedFormat)
    }
}

fn decrypt_non_ec(payload: &[u8], passphrase: &str, network: &NetworkParams) -> Result<KeyPair> {
    let flag = payload[2];
    let compressed = flag & FLAG_COMPRESSED != 0;
    let address_hash = &payload[3..7];

    let pass = normalized(passphrase);
    let mut derived = Zeroizing::new([0u8; 64]);
    scrypt_derive(pass.as_bytes(), address_hash, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, &mut derived[..])?;
    let (half1, half2) = derived.split_at(32);
    let cipher = Aes256::new(GenericArray::from_slice(half2));

    let mut secret = Zeroizing::new([0u8; 32]);
    secret[..16].copy_from_slice(&decrypt_block(&cipher, &payload[7..23]));
    secret[16..].copy_from_slice(&decrypt_block(&cipher, &payload[23..39]));
    xor_in_place(&mut secret[..], half1);

    let key = KeyPair::from_secret_bytes(&secret[..], compressed)
        .map_err(|_| Error::WrongPassphrase)?;
    verify_address_hash(&key, address_hash, network)?;
    Ok(key)
}

fn decrypt_ec(payload: &[u8], passphrase: &str, network: &NetworkParams) -> Result<KeyPair> {
    let flag = payload[2];
    let compressed = flag & FLAG_COMPRESSED != 0;
    let lot_sequence = flag & FLAG_LOT_SEQUENCE != 0;
    let address_hash = &payload[3..7];
    let owner_entropy = &payload[7..15];
    // With lot/sequence numbers only the first half of the entropy salts
    // the passphrase; the rest encodes the numbers themselves.
    let owner_salt = if lot_sequence {
        &owner_entropy[..4]
    } else {
        owner_entropy
    };

    let pass = normalized(passphrase);
    let mut passfactor = Zeroizing::new([0u8; 32]);
    scrypt_derive(pass.as_bytes(), owner_salt, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, &mut passfactor[..])?;
    if lot_sequence {
        let mut prefactor = Zeroizing::new([0u8; 40]);
        prefactor[..32].copy_from_slice(&passfactor[..]);
        prefactor[32..].copy_from_slice(owner_entropy);
        passfactor.copy_from_slice(&sha256d(&prefactor[..]));
    }

    let secp = Secp256k1::new();
    let passfactor_key =
        SecretKey::from_slice(&passfactor[..]).map_err(|_| Error::WrongPassphrase)?;
    // The passpoint is always the compressed encoding, independent of
    // the key pair's own compression flag.
    let passpoint = PublicKey::from_secret_key(&secp, &passfactor_key).serialize();

    let (half1, cipher) = derive_ec_cipher(&passpoint, address_hash, owner_entropy)?;

    // encryptedPart2 unwinds first: its plaintext carries the tail of
    // encryptedPart1 alongside the tail of seedb.
    let mut block2 = decrypt_block(&cipher, &payload[23..39]);
    xor_in_place(&mut block2, &half1[16..]);

    let mut block1 = [0u8; 16];
    block1[..8].copy_from_slice(&payload[15..23]);
    block1[8..].copy_from_slice(&block2[..8]);
    let mut block1 = decrypt_block(&cipher, &block1);
    xor_in_place(&mut block1, &half1[..16]);

    let mut seedb = Zeroizing::new([0u8; 24]);
    seedb[..16].copy_from_slice(&block1);
    seedb[16..].copy_from_slice(&block2[8..]);

    let factorb = Zeroizing::new(sha256d(&seedb[..]));
    let factorb_key = SecretKey::from_slice(&factorb[..]).map_err(|_| Error::WrongPassphrase)?;
    let secret = passfactor_key
        .mul_tweak(&Scalar::from(factorb_key))
        .map_err(|_| Error::WrongPassphrase)?;

    let key = KeyPair::from_secret_key(secret, compressed);
    verify_address_hash(&key, address_hash, network)?;
    Ok(key)
}

/// Build an EC-multiply intermediate code from caller-supplied entropy.
///
/// With lot/sequence numbers (`lot ≤ 1048575`, `sequence ≤ 4095`) only
/// the first four entropy bytes are used as the owner salt; without
/// them all eight are.
pub fn intermediate_code(
    passphrase: &str,
    entropy: [u8; 8],
    lot_sequence: Option<(u32, u32)>,
) -> Result<String> {
    let pass = normalized(passphrase);
    let mut owner_entropy = [0u8; 8];
    let mut passfactor = Zeroizing::new([0u8; 32]);

    match lot_sequence {
        Some((lot, sequence)) => {
            if lot > 1_048_575 || sequence > 4_095 {
                return Err(Error::InvalidParameter("lot or sequence number out of range"));
            }
            owner_entropy[..4].copy_from_slice(&entropy[..4]);
            owner_entropy[4..].copy_from_slice(&(lot * 4096 + sequence).to_be_bytes());

            scrypt_derive(pass.as_bytes(), &entropy[..4], SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, &mut passfactor[..])?;
            let mut prefactor = Zeroizing::new([0u8; 40]);
            prefactor[..32].copy_from_slice(&passfactor[..]);
            prefactor[32..].copy_from_slice(&owner_entropy);
            passfactor.copy_from_slice(&sha256d(&prefactor[..]));
        }
        None => {
            owner_entropy = entropy;
            scrypt_derive(pass.as_bytes(), &entropy, SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, &mut passfactor[..])?;
        }
    }

    let secp = Secp256k1::new();
    let passfactor_key = SecretKey::from_slice(&passfactor[..])?;
    let passpoint = PublicKey::from_secret_key(&secp, &passfactor_key).serialize();

    let mut data = Vec::with_capacity(INTERMEDIATE_LEN);
    data.extend_from_slice(if lot_sequence.is_some() {
        &MAGIC_INTERMEDIATE_LOT
    } else {
        &MAGIC_INTERMEDIATE
    });
    data.extend_from_slice(&owner_entropy);
    data.extend_from_slice(&passpoint);
    Ok(encode_base58check(&data))
}

/// Build an intermediate code with fresh random owner entropy.
pub fn generate_intermediate_code(
    passphrase: &str,
    lot_sequence: Option<(u32, u32)>,
) -> Result<String> {
    let mut entropy = [0u8; 8];
    rand::thread_rng().fill(&mut entropy[..]);
    intermediate_code(passphrase, entropy, lot_sequence)
}

/// Encrypt a new key from an intermediate code and a 24-byte seed.
///
/// This is the untrusted-party side of the EC-multiply protocol: the
/// resulting text decrypts (under the owner's passphrase) to the
/// private scalar `passfactor · sha256d(seedb) mod n`, which this
/// function never sees.
pub fn encrypt_with_intermediate(
    intermediate: &str,
    seedb: &[u8; 24],
    compressed: bool,
    network: &NetworkParams,
) -> Result<String> {
    let data = decode_base58check(intermediate)?;
    if data.len() != INTERMEDIATE_LEN {
        return Err(Error::InvalidLength(data.len()));
    }
    let lot_sequence = if data[..8] == MAGIC_INTERMEDIATE_LOT {
        true
    } else if data[..8] == MAGIC_INTERMEDIATE {
        false
    } else {
        return Err(Error::UnsupportedVariant("unknown intermediate code magic"));
    };
    let owner_entropy = &data[8..16];
    let passpoint_bytes = &data[16..49];
    let passpoint = PublicKey::from_slice(passpoint_bytes)?;

    let factorb = Zeroizing::new(sha256d(&seedb[..]));
    let factorb_key = SecretKey::from_slice(&factorb[..]).map_err(|_| Error::KeyDerivation)?;
    let secp = Secp256k1::new();
    let public = passpoint.mul_tweak(&secp, &Scalar::from(factorb_key))?;
    let public_bytes = if compressed {
        public.serialize().to_vec()
    } else {
        public.serialize_uncompressed().to_vec()
    };
    let address_hash = address::address_checksum(&public_bytes, network.address_version);

    let (half1, cipher) = derive_ec_cipher(passpoint_bytes, &address_hash, owner_entropy)?;

    let mut block1 = [0u8; 16];
    block1.copy_from_slice(&seedb[..16]);
    xor_in_place(&mut block1, &half1[..16]);
    let part1 = encrypt_block(&cipher, &block1);

    let mut block2 = [0u8; 16];
    block2[..8].copy_from_slice(&part1[8..]);
    block2[8..].copy_from_slice(&seedb[16..]);
    xor_in_place(&mut block2, &half1[16..]);
    let part2 = encrypt_block(&cipher, &block2);

    let mut flag = 0u8;
    if compressed {
        flag |= FLAG_COMPRESSED;
    }
    if lot_sequence {
        flag |= FLAG_LOT_SEQUENCE;
    }

    let mut out = Vec::with_capacity(PAYLOAD_LEN);
    out.extend_from_slice(&PREFIX_EC);
    out.push(flag);
    out.extend_from_slice(&address_hash);
    out.extend_from_slice(owner_entropy);
    out.extend_from_slice(&part1[..8]);
    out.extend_from_slice(&part2);
    Ok(encode_base58check(&out))
}

/// Encrypt a new key from an intermediate code and a fresh random seed.
pub fn generate_with_intermediate(
    intermediate: &str,
    compressed: bool,
    network: &NetworkParams,
) -> Result<String> {
    let mut seedb = [0u8; 24];
    rand::thread_rng().fill(&mut seedb[..]);
    encrypt_with_intermediate(intermediate, &seedb, compressed, network)
}

// Helper functions

/// NFC-normalize a passphrase before key derivation.
fn normalized(passphrase: &str) -> Zeroizing<String> {
    Zeroizing::new(passphrase.nfc().collect())
}

fn scrypt_derive(
    passphrase: &[u8],
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
    out: &mut [u8],
) -> Result<()> {
    let params =
        scrypt::Params::new(log_n, r, p, out.len()).map_err(|_| Error::KeyDerivation)?;
    scrypt::scrypt(passphrase, salt, &params, out).map_err(|_| Error::KeyDerivation)
}

/// Second-stage scrypt of the EC variant: passpoint keyed, salted with
/// `addressHash ‖ ownerEntropy`. Returns the XOR mask half and the AES
/// cipher keyed with the upper half.
fn derive_ec_cipher(
    passpoint: &[u8],
    address_hash: &[u8],
    owner_entropy: &[u8],
) -> Result<(Zeroizing<[u8; 32]>, Aes256)> {
    let mut salt = [0u8; 12];
    salt[..4].copy_from_slice(address_hash);
    salt[4..].copy_from_slice(owner_entropy);

    let mut derived = Zeroizing::new([0u8; 64]);
    scrypt_derive(passpoint, &salt, SCRYPT_EC_LOG_N, 1, 1, &mut derived[..])?;

    let mut half1 = Zeroizing::new([0u8; 32]);
    half1.copy_from_slice(&derived[..32]);
    let cipher = Aes256::new(GenericArray::from_slice(&derived[32..]));
    Ok((half1, cipher))
}

fn verify_address_hash(key: &KeyPair, address_hash: &[u8], network: &NetworkParams) -> Result<()> {
    let computed = address::address_checksum(&key.public_bytes(), network.address_version);
    if computed != address_hash {
        return Err(Error::WrongPassphrase);
    }
    Ok(())
}

fn encrypt_block(cipher: &Aes256, data: &[u8]) -> [u8; 16] {
    let mut block = GenericArray::clone_from_slice(data);
    cipher.encrypt_block(&mut block);
    let mut out = [0u8; 16];
    out.copy_from_slice(&block);
    out
}

fn decrypt_block(cipher: &Aes256, data: &[u8]) -> [u8; 16] {
    let mut block = GenericArray::clone_from_slice(data);
    cipher.decrypt_block(&mut block);
    let mut out = [0u8; 16];
    out.copy_from_slice(&block);
    out
}
