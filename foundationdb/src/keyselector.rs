// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A `KeySelector` identifies a key in the database not by its exact value but by its position
//! relative to a reference key: "the first key greater than X", for instance. They are how
//! `Transaction::get_key` and range reads describe their boundaries.

use std::borrow::Cow;

/// Selects a key relative to a reference key: the `offset`-th key following (or preceding) the
/// first key that is, or is not, equal to `key`, as controlled by `or_equal`.
#[derive(Clone, Debug)]
pub struct KeySelector<'a> {
    key: Cow<'a, [u8]>,
    or_equal: bool,
    offset: usize,
}

impl<'a> KeySelector<'a> {
    pub fn new(key: Cow<'a, [u8]>, or_equal: bool, offset: usize) -> Self {
        Self {
            key,
            or_equal,
            offset,
        }
    }

    pub fn key(&self) -> &[u8] {
        self.key.as_ref()
    }

    pub fn or_equal(&self) -> bool {
        self.or_equal
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Converts this selector into one that owns its key, detaching it from `'a`.
    pub fn into_owned(self) -> KeySelector<'static> {
        KeySelector {
            key: Cow::Owned(self.key.into_owned()),
            or_equal: self.or_equal,
            offset: self.offset,
        }
    }

    pub fn last_less_than(key: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::new(key.into(), false, 0)
    }

    pub fn last_less_or_equal(key: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::new(key.into(), true, 0)
    }

    pub fn first_greater_than(key: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::new(key.into(), true, 1)
    }

    pub fn first_greater_or_equal(key: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::new(key.into(), false, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_greater_or_equal_has_offset_one() {
        let sel = KeySelector::first_greater_or_equal(&b"foo"[..]);
        assert_eq!(sel.key(), b"foo");
        assert!(!sel.or_equal());
        assert_eq!(sel.offset(), 1);
    }

    #[test]
    fn owned_key_detaches_lifetime() {
        let bytes = vec![1, 2, 3];
        let sel = KeySelector::first_greater_than(Cow::Owned(bytes)).into_owned();
        assert_eq!(sel.key(), &[1, 2, 3]);
    }
}
