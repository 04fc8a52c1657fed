use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Compressed secp256k1 point.
pub const PUBLIC_KEY_LEN: usize = 33;
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ParseBytesError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected {want} bytes, got {got}")]
    Length { want: usize, got: usize },
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseBytesError> {
    let raw = hex::decode(s.trim_start_matches("0x"))?;
    let got = raw.len();
    raw.try_into()
        .map_err(|_| ParseBytesError::Length { want: N, got })
}

// Fixed-size byte newtypes with a "0x…" hex representation in Display, serde
// and FromStr. JSON views and TOML config both carry these as hex strings.
macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl $name {
            pub fn zero() -> Self {
                Self([0u8; $len])
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseBytesError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed::<$len>(s).map(Self)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = ParseBytesError;
            fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
                let got = raw.len();
                <[u8; $len]>::try_from(raw)
                    .map(Self)
                    .map_err(|_| ParseBytesError::Length { want: $len, got })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(PublicKey, PUBLIC_KEY_LEN);
fixed_bytes!(Address, ADDRESS_LEN);
fixed_bytes!(Hash32, 32);

/// Keccak-256 of `bytes`. Epoch fingerprints are 32-byte keccak digests of
/// the encoded peer list.
pub fn keccak256(bytes: &[u8]) -> Hash32 {
    let mut h = Keccak256::new();
    h.update(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&h.finalize());
    Hash32(out)
}

/// One validator in an epoch peer list: a compressed public key plus the
/// 20-byte account acting on its behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub public_key: PublicKey,
    pub address: Address,
}

/// A versioned validator set, effective from `start_height`.
///
/// Peer order is significant (it defines validator indexing), so it is
/// preserved through encoding and hashing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    pub id: u64,
    pub peers: Vec<PeerRecord>,
    pub start_height: u64,
    pub hash: Hash32,
}

impl Epoch {
    /// Number of peers; voting weight for the *next* epoch is defined by the
    /// group size of the current active one.
    pub fn group_size(&self) -> u64 {
        self.peers.len() as u64
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.peers.iter().any(|p| &p.address == addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let a: Address = "0x2d3913c12aca0e4a2278f829fb78a682123c0125".parse().unwrap();
        assert_eq!(a.to_string(), "0x2d3913c12aca0e4a2278f829fb78a682123c0125");
        let back: Address = a.to_string().parse().unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(err, ParseBytesError::Length { want: 20, got: 2 });
        assert!(format!("0x{}", "00".repeat(40)).parse::<PublicKey>().is_err());
    }

    #[test]
    fn keccak_is_deterministic() {
        assert_eq!(keccak256(b"oryn"), keccak256(b"oryn"));
        assert_ne!(keccak256(b"oryn"), keccak256(b"oryn2"));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let h = keccak256(b"x");
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.starts_with("\"0x"));
        let back: Hash32 = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
