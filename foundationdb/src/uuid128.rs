// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `Uuid128`: a 16-byte UUID whose wire representation is always RFC 4122 big-endian,
//! regardless of host endianness, plus the `D`/`N`/`B`/`X` textual forms other FoundationDB
//! bindings render UUID keys as.
//!
//! This is distinct from the `uuid` crate's `Uuid` already used by the tuple layer
//! ([`crate::tuple::pack`]): that type is the interop type external callers pass in;
//! `Uuid128` is this binding's own decomposed view over the same 16 bytes, with field-level
//! accessors (`version`, `clock_seq`, ...) the RFC 4122 layout calls for.

use std::convert::TryInto;
use std::fmt;

use crate::error::FdbBindingError;

/// A 128-bit UUID, decomposed into its RFC 4122 fields.
///
/// The wire form (see [`Uuid128::to_wire_bytes`]) is always big-endian: `time_low(4) |
/// time_mid(2) | time_hi_and_version(2) | clk_seq_hi_res(1) | clk_seq_low(1) | node(6)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uuid128 {
    time_low: u32,
    time_mid: u16,
    time_hi_and_version: u16,
    clk_seq_hi_res: u8,
    clk_seq_low: u8,
    node: [u8; 6],
}

impl Uuid128 {
    /// The all-zero ("nil") UUID.
    pub const NIL: Uuid128 = Uuid128 {
        time_low: 0,
        time_mid: 0,
        time_hi_and_version: 0,
        clk_seq_hi_res: 0,
        clk_seq_low: 0,
        node: [0; 6],
    };

    /// Builds a `Uuid128` from its individual RFC 4122 fields.
    pub fn from_fields(
        time_low: u32,
        time_mid: u16,
        time_hi_and_version: u16,
        clk_seq_hi_res: u8,
        clk_seq_low: u8,
        node: [u8; 6],
    ) -> Self {
        Uuid128 {
            time_low,
            time_mid,
            time_hi_and_version,
            clk_seq_hi_res,
            clk_seq_low,
            node,
        }
    }

    /// Decodes the 16-byte RFC 4122 big-endian wire form produced by [`Uuid128::to_wire_bytes`].
    pub fn from_wire_bytes(bytes: &[u8; 16]) -> Self {
        let time_low = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        let time_mid = u16::from_be_bytes(bytes[4..6].try_into().unwrap());
        let time_hi_and_version = u16::from_be_bytes(bytes[6..8].try_into().unwrap());
        let clk_seq_hi_res = bytes[8];
        let clk_seq_low = bytes[9];
        let mut node = [0u8; 6];
        node.copy_from_slice(&bytes[10..16]);
        Uuid128 {
            time_low,
            time_mid,
            time_hi_and_version,
            clk_seq_hi_res,
            clk_seq_low,
            node,
        }
    }

    /// Encodes this UUID into its 16-byte RFC 4122 big-endian wire form.
    pub fn to_wire_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.time_low.to_be_bytes());
        out[4..6].copy_from_slice(&self.time_mid.to_be_bytes());
        out[6..8].copy_from_slice(&self.time_hi_and_version.to_be_bytes());
        out[8] = self.clk_seq_hi_res;
        out[9] = self.clk_seq_low;
        out[10..16].copy_from_slice(&self.node);
        out
    }

    /// The host-native 128-bit GUID byte layout: the first three fields (`time_low`,
    /// `time_mid`, `time_hi_and_version`) are written native-endian rather than big-endian,
    /// matching the in-memory layout other platforms' native GUID type uses; the clock
    /// sequence and node bytes are unaffected since they're byte arrays on the wire already.
    pub fn to_guid_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        if cfg!(target_endian = "little") {
            out[0..4].copy_from_slice(&self.time_low.to_le_bytes());
            out[4..6].copy_from_slice(&self.time_mid.to_le_bytes());
            out[6..8].copy_from_slice(&self.time_hi_and_version.to_le_bytes());
        } else {
            out[0..4].copy_from_slice(&self.time_low.to_be_bytes());
            out[4..6].copy_from_slice(&self.time_mid.to_be_bytes());
            out[6..8].copy_from_slice(&self.time_hi_and_version.to_be_bytes());
        }
        out[8] = self.clk_seq_hi_res;
        out[9] = self.clk_seq_low;
        out[10..16].copy_from_slice(&self.node);
        out
    }

    /// Inverse of [`Uuid128::to_guid_bytes`]: decodes a host-native GUID byte layout back into
    /// a `Uuid128` whose wire form is always big-endian.
    pub fn from_guid_bytes(bytes: &[u8; 16]) -> Self {
        let (time_low, time_mid, time_hi_and_version) = if cfg!(target_endian = "little") {
            (
                u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
                u16::from_le_bytes(bytes[4..6].try_into().unwrap()),
                u16::from_le_bytes(bytes[6..8].try_into().unwrap()),
            )
        } else {
            (
                u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
                u16::from_be_bytes(bytes[4..6].try_into().unwrap()),
                u16::from_be_bytes(bytes[6..8].try_into().unwrap()),
            )
        };
        let mut node = [0u8; 6];
        node.copy_from_slice(&bytes[10..16]);
        Uuid128 {
            time_low,
            time_mid,
            time_hi_and_version,
            clk_seq_hi_res: bytes[8],
            clk_seq_low: bytes[9],
            node,
        }
    }

    /// The high 4 bits of `time_hi_and_version`.
    pub fn version(&self) -> u8 {
        (self.time_hi_and_version >> 12) as u8
    }

    /// The 14-bit clock sequence: `clk_seq_hi_res`'s low 6 bits, followed by all of
    /// `clk_seq_low`.
    pub fn clock_seq(&self) -> u16 {
        (((self.clk_seq_hi_res & 0x3f) as u16) << 8) | self.clk_seq_low as u16
    }

    /// Parses the canonical `D` form: `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`.
    pub fn parse(text: &str) -> Result<Self, FdbBindingError> {
        let hex: String = text.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return Err(FdbBindingError::InvalidFormat("uuid must have 32 hex digits"));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| FdbBindingError::InvalidFormat("uuid contains non-hex digits"))?;
        }
        Ok(Uuid128::from_wire_bytes(&bytes))
    }

    /// Renders this UUID using the requested textual form: `D` (dashed), `N` (no dashes), `B`
    /// (braced), or `X` (0x-prefixed groups).
    pub fn format(&self, form: char) -> String {
        let b = self.to_wire_bytes();
        let hex = |r: std::ops::Range<usize>| hex_lower(&b[r]);
        match form {
            'D' => format!(
                "{}-{}-{}-{}-{}",
                hex(0..4),
                hex(4..6),
                hex(6..8),
                hex(8..10),
                hex(10..16)
            ),
            'N' => hex(0..16),
            'B' => format!(
                "{{{}-{}-{}-{}-{}}}",
                hex(0..4),
                hex(4..6),
                hex(6..8),
                hex(8..10),
                hex(10..16)
            ),
            'X' => format!(
                "{{0x{},0x{},0x{},{{0x{},0x{},0x{},0x{},0x{},0x{},0x{},0x{}}}}}",
                hex(0..4),
                hex(4..6),
                hex(6..8),
                hex_lower(&b[8..9]),
                hex_lower(&b[9..10]),
                hex_lower(&b[10..11]),
                hex_lower(&b[11..12]),
                hex_lower(&b[12..13]),
                hex_lower(&b[13..14]),
                hex_lower(&b[14..15]),
                hex_lower(&b[15..16]),
            ),
            _ => hex(0..16),
        }
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl fmt::Display for Uuid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format('D'))
    }
}

impl fmt::Debug for Uuid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid128({})", self.format('D'))
    }
}

impl PartialOrd for Uuid128 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Uuid128 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_wire_bytes().cmp(&other.to_wire_bytes())
    }
}

#[cfg(feature = "uuid")]
mod interop {
    use super::Uuid128;

    impl From<uuid::Uuid> for Uuid128 {
        fn from(u: uuid::Uuid) -> Self {
            Uuid128::from_wire_bytes(u.as_bytes())
        }
    }

    impl From<Uuid128> for uuid::Uuid {
        fn from(u: Uuid128) -> Self {
            uuid::Uuid::from_bytes(u.to_wire_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_wire_bytes_matches_rfc4122_order() {
        let uuid = Uuid128::parse("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(
            uuid.to_wire_bytes(),
            [
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
    }

    #[test]
    fn d_form_round_trips() {
        let text = "00112233-4455-6677-8899-aabbccddeeff";
        let uuid = Uuid128::parse(text).unwrap();
        assert_eq!(uuid.format('D'), text);
    }

    #[test]
    fn n_form_has_no_dashes() {
        let uuid = Uuid128::parse("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(uuid.format('N'), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn braced_form_wraps_dashed_form() {
        let uuid = Uuid128::parse("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(
            uuid.format('B'),
            "{00112233-4455-6677-8899-aabbccddeeff}"
        );
    }

    #[test]
    fn version_and_clock_seq_are_extracted_from_wire_fields() {
        let uuid = Uuid128::from_fields(0, 0, 0x4123, 0x81, 0x23, [0; 6]);
        assert_eq!(uuid.version(), 4);
        assert_eq!(uuid.clock_seq(), (0x01 << 8) | 0x23);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(Uuid128::parse("not-a-uuid").is_err());
    }

    #[test]
    fn ordering_matches_wire_byte_order() {
        let a = Uuid128::parse("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid128::parse("00000000-0000-0000-0000-000000000002").unwrap();
        assert!(a < b);
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn interops_with_the_uuid_crate_through_wire_bytes() {
        let external = uuid::Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let ours: Uuid128 = external.into();
        assert_eq!(ours.to_wire_bytes(), *external.as_bytes());
        let back: uuid::Uuid = ours.into();
        assert_eq!(back, external);
    }
}
