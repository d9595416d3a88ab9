//! Fixed-width domain types shared by every stage of the ingestion pipeline.
//!
//! Mirrors the newtype-over-fixed-bytes style of `eth-domain-types` /
//! `bytes-hex`: wire-compatible with `0x`-prefixed lowercase hex, cheap to
//! copy, and ordered so they can be used directly as sort/partition keys.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

mod fixed_bytes;
mod range;

pub use {
    fixed_bytes::{Address, ParseFixedBytesError, StorageSlot},
    range::{range_bounds, range_of, RangeNumber},
};

/// A block number. Block 0 is genesis.
pub type BlockNumber = u64;

/// Serializes/deserializes a value as `0x`-prefixed lowercase hex.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

pub(crate) fn hex_decode_exact<const N: usize>(s: &str) -> Result<[u8; N], ParseFixedBytesError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() != N * 2 {
        return Err(ParseFixedBytesError::WrongLength {
            expected: N * 2,
            found: stripped.len(),
        });
    }
    let mut out = [0u8; N];
    for (i, chunk) in out.iter_mut().enumerate() {
        *chunk = u8::from_str_radix(&stripped[i * 2..i * 2 + 2], 16)
            .map_err(|_| ParseFixedBytesError::InvalidHex)?;
    }
    Ok(out)
}

pub(crate) fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex_encode(bytes))
}

pub(crate) fn deserialize_hex_exact<'de, D, const N: usize>(
    deserializer: D,
) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex_decode_exact::<N>(&s).map_err(D::Error::custom)
}
