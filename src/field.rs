use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DecodeError;

/// Width of one calldata word in bytes.
pub const WORD_BYTES: usize = 32;

/// An exact-precision, non-negative field element.
///
/// Serialized as a decimal string on the wire so that no JSON consumer ever
/// sees it as a (lossy) floating-point number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// Parse a raw numeric token: all decimal digits, or `0x` followed by
    /// hex digits. Anything else is not numeric and yields `None`.
    pub fn parse_raw(s: &str) -> Option<Self> {
        if is_decimal(s) {
            return BigUint::from_str_radix(s, 10).ok().map(Self);
        }
        let digits = s.strip_prefix("0x")?;
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return BigUint::from_str_radix(digits, 16).ok().map(Self);
        }
        None
    }

    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Big-endian 32-byte word, or `None` if the value is wider than 256 bits.
    pub fn to_word(&self) -> Option<[u8; WORD_BYTES]> {
        let bytes = self.0.to_bytes_be();
        if bytes.len() > WORD_BYTES {
            return None;
        }
        let mut word = [0u8; WORD_BYTES];
        word[WORD_BYTES - bytes.len()..].copy_from_slice(&bytes);
        Some(word)
    }

    /// `0x` followed by exactly 64 hex digits.
    pub fn to_hex_word(&self) -> Option<String> {
        self.to_word().map(|w| format!("0x{}", hex::encode(w)))
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl FromStr for FieldElement {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_raw(s).ok_or_else(|| DecodeError::InvalidToken {
            token: s.to_string(),
        })
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
