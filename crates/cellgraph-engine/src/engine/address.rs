//! Cell address parsing and formatting.
//!
//! An [`Address`] is the canonical, upper-cased spelling of an A1-style
//! reference: one or more column letters followed by a row number that
//! starts with a non-zero digit.
//!
//! # Examples
//!
//! ```ignore
//! let addr: Address = "b12".parse().unwrap();
//! assert_eq!(addr.to_string(), "B12");
//! assert_eq!(addr.column(), "B");
//! assert_eq!(addr.row(), "12");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Returned when text is not a well-formed cell address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid cell address: {0:?}")]
pub struct AddressError(pub String);

/// Canonical identifier of a cell (e.g. `A1`, `AB203`).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Address {
    text: String,
    /// Byte offset where the row digits begin.
    split: usize,
}

impl Address {
    /// Parse a cell address (case-insensitive). Returns an error if the
    /// text is not letters followed by a row number without leading zeros.
    pub fn parse(text: &str) -> Result<Address, AddressError> {
        let caps = address_re()
            .captures(text)
            .ok_or_else(|| AddressError(text.to_string()))?;
        let letters = &caps["letters"];
        let digits = &caps["digits"];
        Ok(Address::from_parts(letters, digits))
    }

    /// Build from already-validated parts. Letters are upper-cased.
    pub(crate) fn from_parts(letters: &str, digits: &str) -> Address {
        let mut text = letters.to_ascii_uppercase();
        let split = text.len();
        text.push_str(digits);
        Address { text, split }
    }

    /// Column letters, e.g. `"AB"` for `AB12`.
    pub fn column(&self) -> &str {
        &self.text[..self.split]
    }

    /// Row digits, e.g. `"12"` for `AB12`.
    pub fn row(&self) -> &str {
        &self.text[self.split..]
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn address_re() -> &'static Regex {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<digits>[1-9][0-9]*)$")
            .expect("address regex must compile")
    })
}

/// Compare numeric digit strings without parsing (rows may exceed any integer type).
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for Address {
    /// Column-major spreadsheet order: `A2 < A10 < B1 < Z9 < AA1`.
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_digits(self.column(), other.column())
            .then_with(|| cmp_digits(self.row(), other.row()))
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Address::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let addr = Address::parse("ab12").unwrap();
        assert_eq!(addr.to_string(), "AB12");
        assert_eq!(addr.column(), "AB");
        assert_eq!(addr.row(), "12");
        assert_eq!(addr, Address::parse("aB12").unwrap());
    }

    #[test]
    fn test_parse_invalid_inputs() {
        for bad in ["", "123", "ABC", "A0", "A01", "1A", "A 1", "A1 ", "$A$1"] {
            assert!(Address::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_huge_addresses_do_not_overflow() {
        let text = format!("{}{}", "Z".repeat(40), "9".repeat(40));
        let addr = Address::parse(&text).unwrap();
        assert_eq!(addr.as_str(), text);
    }

    #[test]
    fn test_ordering_is_column_major() {
        let mut addrs: Vec<Address> = ["AA1", "B1", "A10", "A2", "Z9"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        addrs.sort();
        let names: Vec<String> = addrs.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["A2", "A10", "B1", "Z9", "AA1"]);
    }

    #[test]
    fn test_deserialize_validates_and_normalizes() {
        use serde::de::value::{Error, StrDeserializer};

        let addr = Address::deserialize(StrDeserializer::<Error>::new("c3")).unwrap();
        assert_eq!(addr.as_str(), "C3");
        assert!(Address::deserialize(StrDeserializer::<Error>::new("C0")).is_err());
    }
}
