//! Network parameters consumed by the codec
//!
//! The codec only needs the address version bytes and the production
//! flag; the remaining chain-consensus fields live elsewhere and are
//! deliberately kept out of this crate.

/// Version bytes and production flag for one network.
///
/// Fixed for the lifetime of a codec instance, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkParams {
    /// Version byte for P2PKH addresses
    pub address_version: u8,
    /// Version byte for P2SH (multisig) addresses
    pub multisig_version: u8,
    /// Whether this is the production network
    pub production: bool,
}

impl NetworkParams {
    /// Bitcoin mainnet parameters
    pub const MAINNET: Self = Self {
        address_version: 0x00,
        multisig_version: 0x05,
        production: true,
    };

    /// Bitcoin testnet parameters
    pub const TESTNET: Self = Self {
        address_version: 0x6F,
        multisig_version: 0xC4,
        production: false,
    };

    /// WIF version byte, derived from the production flag.
    pub fn wif_version(&self) -> u8 {
        if self.production {
            0x80
        } else {
            0xEF
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wif_version_follows_production_flag() {
        assert_eq!(NetworkParams::MAINNET.wif_version(), 0x80);
        assert_eq!(NetworkParams::TESTNET.wif_version(), 0xEF);

        let custom = NetworkParams {
            address_version: 0x30,
            multisig_version: 0x32,
            production: true,
        };
        assert_eq!(custom.wif_version(), 0x80);
    }
}
