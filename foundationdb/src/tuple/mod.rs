// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The tuple layer: order-preserving binary encoding for Rust values, matching the wire format
//! the other FoundationDB language bindings use.
//!
//! https://github.com/apple/foundationdb/blob/master/design/tuple.md
//!
//! Values are encoded through [`TuplePack`]/[`TupleUnpack`], implemented for the primitive
//! types, `String`/`&str`, `Vec<u8>`/`&[u8]`/[`Bytes`], `Vec<T>`/`&[T]` (nested tuples),
//! `Option<T>`, tuples of up to 12 elements, [`Versionstamp`], and (behind the `uuid` feature)
//! `uuid::Uuid`. [`Element`] is a dynamically-typed tuple value for when the shape isn't known
//! at compile time. [`pack`]/[`unpack`] encode/decode a whole tuple at once; [`Subspace`]
//! prefixes a tuple encoding to define a keyspace region.
//!
//! An alternate encoding path bridges arbitrary `serde::Serialize`/`Deserialize` types onto the
//! same wire format via [`to_bytes`]/[`from_bytes`] ([`ser`]/[`de`]).

mod de;
pub mod hca;
mod pack;
mod ser;
mod subspace;
mod versionstamp;

use std::borrow::Cow;
use std::fmt;

pub use de::{from_bytes, Deserializer};
pub use hca::{HcaError, HighContentionAllocator};
pub use pack::{TuplePack, TupleUnpack};
pub use ser::{into_bytes, to_bytes, Serializer};
pub use subspace::Subspace;
pub use versionstamp::Versionstamp;

const NIL: u8 = 0x00;
const BYTES: u8 = 0x01;
const STRING: u8 = 0x02;
const NESTED: u8 = 0x05;
const INTZERO: u8 = 0x14;
const POSINTEND: u8 = 0x1d;
const NEGINTSTART: u8 = 0x0b;
const FLOAT: u8 = 0x20;
const DOUBLE: u8 = 0x21;
const FALSE: u8 = 0x26;
const TRUE: u8 = 0x27;
const UUID: u8 = 0x30;
// Not part of the FoundationDB tuple typecode space proper: used only by this binding's
// serde bridge (`ser`/`de`) to tag Rust enum variants, never emitted by `Element`/`pack`.
const ENUM: u8 = 0x17;
const VERSIONSTAMP: u8 = 0x33;
const ESCAPE: u8 = 0xff;

/// Tracks the nesting depth of a tuple being packed or unpacked.
///
/// A depth of 0 means "top-level tuple": its elements are not wrapped in `NESTED`/`NIL`
/// markers. Anything packed at depth > 0 is a nested tuple, and its elements are.
#[derive(Copy, Clone, Debug, Default)]
pub struct TupleDepth(usize);

impl TupleDepth {
    /// A fresh, top-level depth.
    pub fn new() -> Self {
        TupleDepth(0)
    }

    /// The depth one level further into a nested tuple.
    pub fn increment(&self) -> Self {
        TupleDepth(self.0 + 1)
    }

    /// The current depth, 0 at the top level.
    pub fn depth(&self) -> usize {
        self.0
    }
}

/// An owned-or-borrowed byte string, tagged so it packs/unpacks as the tuple layer's `Bytes`
/// typecode rather than as a nested tuple of integers.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes<'a>(Cow<'a, [u8]>);

impl<'a> Bytes<'a> {
    /// Detaches this value from the input it was unpacked from.
    pub fn into_owned(self) -> Bytes<'static> {
        Bytes(Cow::Owned(self.0.into_owned()))
    }
}

impl<'a> fmt::Debug for Bytes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Bytes({:?})", self.0.as_ref())
    }
}

impl<'a> AsRef<[u8]> for Bytes<'a> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> From<&'a [u8]> for Bytes<'a> {
    fn from(v: &'a [u8]) -> Self {
        Bytes(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for Bytes<'static> {
    fn from(v: Vec<u8>) -> Self {
        Bytes(Cow::Owned(v))
    }
}

impl<'a> serde::Serialize for Bytes<'a> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(self.0.as_ref())
    }
}

impl<'de> serde::Deserialize<'de> for Bytes<'de> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Bytes<'de>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BytesVisitor;
        impl<'de> serde::de::Visitor<'de> for BytesVisitor {
            type Value = Bytes<'de>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("bytes")
            }

            fn visit_borrowed_bytes<E>(self, v: &'de [u8]) -> std::result::Result<Self::Value, E> {
                Ok(Bytes(Cow::Borrowed(v)))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> std::result::Result<Self::Value, E> {
                Ok(Bytes(Cow::Owned(v)))
            }
        }
        deserializer.deserialize_bytes(BytesVisitor)
    }
}

/// A dynamically-typed tuple element, for packing/unpacking tuples whose shape is only known at
/// runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Element<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    String(Cow<'a, str>),
    Bytes(Bytes<'a>),
    Versionstamp(Versionstamp),
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    Tuple(Vec<Element<'a>>),
}

impl<'a> Element<'a> {
    /// Detaches this value (and, recursively, any nested values) from the input it was
    /// unpacked from.
    pub fn into_owned(self) -> Element<'static> {
        match self {
            Element::Nil => Element::Nil,
            Element::Bool(v) => Element::Bool(v),
            Element::Int(v) => Element::Int(v),
            Element::Float(v) => Element::Float(v),
            Element::Double(v) => Element::Double(v),
            Element::String(v) => Element::String(Cow::Owned(v.into_owned())),
            Element::Bytes(v) => Element::Bytes(v.into_owned()),
            Element::Versionstamp(v) => Element::Versionstamp(v),
            #[cfg(feature = "uuid")]
            Element::Uuid(v) => Element::Uuid(v),
            Element::Tuple(v) => Element::Tuple(v.into_iter().map(Element::into_owned).collect()),
        }
    }
}

/// Errors produced while packing or unpacking a tuple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A byte sequence decoded to a value whose representation needed more bytes than this
    /// binding supports for the target type.
    #[error("tuple integer is too large for the requested type")]
    UnsupportedIntLength,
    /// Fewer bytes remained in the input than the value being decoded requires.
    #[error("not enough bytes remained to decode a tuple element")]
    MissingBytes,
    /// Bytes remained after decoding a value that was expected to consume the whole input.
    #[error("trailing bytes after a fully-decoded tuple")]
    TrailingBytes,
    /// A typecode byte did not match what was expected at that position.
    #[error("bad tuple typecode: found {found}, expected {expected:?}")]
    BadCode {
        found: u8,
        expected: Option<u8>,
    },
    /// Decoded bytes were not valid UTF-8 where a string was expected.
    #[error("tuple string is not valid utf-8")]
    BadStringFormat,
    /// Decoded bytes were not a well-formed UUID.
    #[error("tuple element is not a valid uuid")]
    BadUuid,
    /// A key was unpacked against a `Subspace` it is not prefixed by.
    #[error("key is not in the expected subspace")]
    BadPrefix,
    /// A codepoint decoded while deserializing a `char` was not a valid Unicode scalar value.
    #[error("{0:#x} is not a valid unicode scalar value")]
    BadCharValue(u32),
    /// A versionstamp marked complete (or incomplete) didn't match the context it was packed in.
    #[error("versionstamp is not valid for this operation")]
    BadVersionstamp,
    /// An operation the serde bridge does not implement for the tuple wire format.
    #[error("{0} is not supported by the tuple encoding")]
    NotSupported(&'static str),
    /// A catch-all produced by `serde::ser::Error::custom`/`serde::de::Error::custom`.
    #[error("{0}")]
    Message(String),
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

/// The error type returned by [`TuplePack`]/[`TupleUnpack`]; an alias of [`Error`] kept for
/// parity with the naming other FoundationDB bindings use for this layer.
pub type PackError = Error;

/// The result type returned by [`TuplePack`]/[`TupleUnpack`] operations.
pub type PackResult<T> = std::result::Result<T, Error>;

/// The result type returned by the serde bridge ([`to_bytes`]/[`from_bytes`]).
pub type Result<T> = std::result::Result<T, Error>;

/// Packs `v` into a freshly allocated byte vector.
pub fn pack<T: TuplePack>(v: &T) -> Vec<u8> {
    v.pack_to_vec()
}

/// Packs `v`, appending the encoding to `out`.
pub fn pack_into<T: TuplePack>(v: &T, out: &mut Vec<u8>) {
    v.pack_root(out)
        .expect("tuple encoding should never fail");
}

/// Unpacks a complete tuple value from `input`, failing if any bytes remain afterwards.
pub fn unpack<'de, T: TupleUnpack<'de>>(input: &'de [u8]) -> PackResult<T> {
    T::unpack_root(input)
}
