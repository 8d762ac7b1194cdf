// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `Uuid64`: a 64-bit identifier serialized big-endian, ordered so its string forms sort the
//! same way the underlying integer does — including its base62 encoding, which uses the
//! digit order `0-9 A-Z a-z` rather than the more common `a-z A-Z 0-9` for exactly that
//! reason.

use std::fmt;

use crate::error::FdbBindingError;

/// The base62 digit alphabet this type encodes with: ordered `0-9 A-Z a-z` so that comparing
/// two encoded strings byte-wise agrees with comparing the two `u64` values numerically.
const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The fixed width of the zero-padded base62 form: `62^11 > 2^64`, so 11 digits always
/// suffice and padding with the alphabet's lowest digit (`0`) preserves ordering.
const BASE62_PADDED_WIDTH: usize = 11;

/// A 64-bit identifier whose wire form is 8 big-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid64(u64);

impl Uuid64 {
    /// Wraps a raw `u64` value.
    pub fn new(value: u64) -> Self {
        Uuid64(value)
    }

    /// The wrapped integer value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Decodes the 8-byte big-endian wire form.
    pub fn from_wire_bytes(bytes: &[u8; 8]) -> Self {
        Uuid64(u64::from_be_bytes(*bytes))
    }

    /// Encodes this value into its 8-byte big-endian wire form.
    pub fn to_wire_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Encodes as base62, either zero-padded to [`BASE62_PADDED_WIDTH`] characters (preserving
    /// numeric ordering) or in the shortest form that round-trips (no leading padding digits).
    pub fn to_base62(&self, padded: bool) -> String {
        let mut digits = [0u8; BASE62_PADDED_WIDTH];
        let mut v = self.0;
        for slot in digits.iter_mut().rev() {
            *slot = BASE62_ALPHABET[(v % 62) as usize];
            v /= 62;
        }
        if padded {
            String::from_utf8(digits.to_vec()).expect("alphabet is ascii")
        } else {
            let first_significant = digits
                .iter()
                .position(|&c| c != BASE62_ALPHABET[0])
                .unwrap_or(BASE62_PADDED_WIDTH - 1);
            String::from_utf8(digits[first_significant..].to_vec()).expect("alphabet is ascii")
        }
    }

    /// Decodes a base62 string produced by [`Uuid64::to_base62`] (either padded or compact).
    pub fn from_base62(text: &str) -> Result<Self, FdbBindingError> {
        if text.is_empty() || text.len() > BASE62_PADDED_WIDTH {
            return Err(FdbBindingError::InvalidFormat("base62 uuid64 has the wrong length"));
        }
        let mut value: u64 = 0;
        for c in text.bytes() {
            let digit = BASE62_ALPHABET
                .iter()
                .position(|&d| d == c)
                .ok_or(FdbBindingError::InvalidFormat("invalid base62 digit"))?;
            value = value
                .checked_mul(62)
                .and_then(|v| v.checked_add(digit as u64))
                .ok_or(FdbBindingError::InvalidFormat("base62 uuid64 overflows u64"))?;
        }
        Ok(Uuid64(value))
    }

    /// Renders this value in one of the textual forms other FoundationDB bindings use for a
    /// `Uuid64` key: `D`/`d` (dashed hex, upper/lower), `N` (hex, no dashes), `B`/`b` (braced),
    /// `C`/`c` (compact base62), `Z`/`z` (zero-padded base62), `R`/`r` (decimal), `V`/`v` (hex
    /// pairs, dash-separated), `M`/`m` (hex pairs, colon-separated).
    pub fn format(&self, form: char) -> String {
        let b = self.to_wire_bytes();
        match form {
            'D' => format!("{}-{}", hex(&b[0..4], false), hex(&b[4..8], false)),
            'd' => format!("{}-{}", hex(&b[0..4], true), hex(&b[4..8], true)),
            'N' => hex(&b, false),
            'B' => format!("{{{}-{}}}", hex(&b[0..4], false), hex(&b[4..8], false)),
            'b' => format!("{{{}-{}}}", hex(&b[0..4], true), hex(&b[4..8], true)),
            'C' => self.to_base62(false),
            'c' => self.to_base62(false).to_lowercase(),
            'Z' => self.to_base62(true),
            'z' => self.to_base62(true).to_lowercase(),
            'R' | 'r' => self.0.to_string(),
            'V' => byte_pairs(&b, false, '-'),
            'v' => byte_pairs(&b, true, '-'),
            'M' => byte_pairs(&b, false, ':'),
            'm' => byte_pairs(&b, true, ':'),
            _ => hex(&b, false),
        }
    }

    /// Parses the `D` textual form: `XXXXXXXX-XXXXXXXX`, case-insensitively.
    pub fn parse(text: &str) -> Result<Self, FdbBindingError> {
        let hex_digits: String = text.chars().filter(|c| *c != '-').collect();
        if hex_digits.len() != 16 {
            return Err(FdbBindingError::InvalidFormat("uuid64 must have 16 hex digits"));
        }
        let value = u64::from_str_radix(&hex_digits, 16)
            .map_err(|_| FdbBindingError::InvalidFormat("uuid64 contains non-hex digits"))?;
        Ok(Uuid64(value))
    }
}

fn hex(bytes: &[u8], lower: bool) -> String {
    if lower {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    } else {
        bytes.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

fn byte_pairs(bytes: &[u8], lower: bool, sep: char) -> String {
    bytes
        .iter()
        .map(|b| {
            if lower {
                format!("{:02x}", b)
            } else {
                format!("{:02X}", b)
            }
        })
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}

impl fmt::Display for Uuid64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format('D'))
    }
}

impl fmt::Debug for Uuid64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid64({})", self.format('D'))
    }
}

impl From<u64> for Uuid64 {
    fn from(v: u64) -> Self {
        Uuid64(v)
    }
}

impl From<Uuid64> for u64 {
    fn from(u: Uuid64) -> Self {
        u.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d_form_matches_spec_example() {
        let u = Uuid64::new(0x0123456789ABCDEF);
        assert_eq!(u.format('D'), "01234567-89ABCDEF");
    }

    #[test]
    fn padded_base62_round_trips_through_d_form_value() {
        let u = Uuid64::new(0x0123456789ABCDEF);
        let encoded = u.to_base62(true);
        assert_eq!(encoded.len(), BASE62_PADDED_WIDTH);
        assert_eq!(Uuid64::from_base62(&encoded).unwrap(), u);
    }

    #[test]
    fn compact_base62_round_trips() {
        for v in [0u64, 1, 61, 62, 999_999_999, u64::MAX] {
            let u = Uuid64::new(v);
            let encoded = u.to_base62(false);
            assert_eq!(Uuid64::from_base62(&encoded).unwrap(), u);
        }
    }

    #[test]
    fn padded_base62_preserves_numeric_ordering() {
        let values = [0u64, 1, 61, 62, 63, 3843, 1_000_000, u64::MAX / 2, u64::MAX];
        let mut pairs: Vec<(u64, String)> = values
            .iter()
            .map(|&v| (v, Uuid64::new(v).to_base62(true)))
            .collect();

        let mut by_value = pairs.clone();
        by_value.sort_by_key(|(v, _)| *v);
        pairs.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(pairs, by_value);
    }

    #[test]
    fn base62_rejects_invalid_digits() {
        assert!(Uuid64::from_base62("!!!").is_err());
    }

    #[test]
    fn decimal_form_is_the_plain_integer() {
        assert_eq!(Uuid64::new(42).format('R'), "42");
    }

    #[test]
    fn hex_pair_forms_are_dash_or_colon_separated() {
        let u = Uuid64::new(0x0123456789ABCDEF);
        assert_eq!(u.format('V'), "01-23-45-67-89-AB-CD-EF");
        assert_eq!(u.format('M'), "01:23:45:67:89:AB:CD:EF");
        assert_eq!(u.format('v'), "01-23-45-67-89-ab-cd-ef");
    }

    #[test]
    fn parse_round_trips_d_form() {
        let u = Uuid64::new(0x0123456789ABCDEF);
        assert_eq!(Uuid64::parse(&u.format('D')).unwrap(), u);
    }
}
