//! Native contracts with fixed script hashes.

use contractc_core::Hash160;

/// Decode a `0x`-prefixed big-endian hash string at compile time.
const fn hash160(text: &str) -> Hash160 {
    let digits = text.as_bytes();
    assert!(digits.len() == 42 && digits[0] == b'0' && digits[1] == b'x');

    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => panic!("invalid hex digit"),
        }
    }

    let mut bytes = [0u8; 20];
    let mut i = 0;
    while i < 20 {
        let hi = nibble(digits[2 + i * 2]);
        let lo = nibble(digits[3 + i * 2]);
        // display order is big-endian; scripts store little-endian
        bytes[19 - i] = (hi << 4) | lo;
        i += 1;
    }
    Hash160::from_le_bytes(bytes)
}

macro_rules! natives {
    ($( $variant:ident => $hash:literal, )*) => {
        /// Contracts built into the target chain.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NativeContract {
            $( $variant, )*
        }

        impl NativeContract {
            pub const ALL: &'static [NativeContract] = &[$(NativeContract::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NativeContract::$variant => stringify!($variant),)*
                }
            }

            /// Hash as written in the table above.
            #[cfg(test)]
            fn literal(self) -> &'static str {
                match self {
                    $(NativeContract::$variant => $hash,)*
                }
            }

            pub fn hash(self) -> Hash160 {
                match self {
                    $(NativeContract::$variant => {
                        const HASH: Hash160 = hash160($hash);
                        HASH
                    })*
                }
            }
        }
    };
}

natives! {
    ContractManagement => "0xfffdc93764dbaddd97c48f252a53ea4643faa3fd",
    StdLib => "0xacce6fd80d44e1796aa0c2c625e9e4e0ce39efc0",
    CryptoLib => "0x726cb6e0cd8628a1350a611384688911ab75f51b",
    LedgerContract => "0xda65b600f7124ce6c79950c1772a36403104f2be",
    NeoToken => "0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5",
    GasToken => "0xd2a4cff31913016155e38e474a2c06d08be276cf",
    PolicyContract => "0xcc5e4edd9f5f8dba8bb65734541df7a1c081c67b",
    RoleManagement => "0x49cf4e5378ffcd4dec034fd98a174c5491e395e2",
    OracleContract => "0xfe924b7cfe89ddd271abaf7210a80a7e11178758",
}

impl NativeContract {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.name() == name)
    }
}
