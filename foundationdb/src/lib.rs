// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A Rust binding for the [FoundationDB](https://www.foundationdb.org) client API.
//!
//! This crate wraps the native `libfdb_c` client in a safe, async API:
//!
//! - [`api`] boots the FDB network thread and configures the client.
//! - [`Database`] opens a cluster and runs transactions against it, optionally scoped to a
//!   [`Tenant`].
//! - [`Transaction`] is the unit of work; [`Database::transact`]/[`Tenant::transact`] drive it
//!   through FDB's retry loop automatically.
//! - [`tuple`] implements the order-preserving binary encoding the other FDB bindings share, plus
//!   [`tuple::Subspace`] and the directory layer's [`tuple::HighContentionAllocator`].
//! - [`Slice`], [`uuid128::Uuid128`] and [`uuid64::Uuid64`] are the lower-level byte-view and
//!   identifier encoders keys and values are built from; [`asn1`] carries the two ASN.1 binary
//!   primitives ([`asn1::encode_length`], [`asn1::encode_oid_subidentifier`]) this crate needs
//!   without pulling in a full ASN.1 codec.
//! - [`Watch`] resolves when a key's value changes.
//!
//! `libfdb_c` is only safe to use from behind a single, once-only-initialized network thread;
//! start it with [`api::FdbApiBuilder`] before calling anything else in this crate.

extern crate foundationdb_sys;

pub mod api;
pub mod asn1;
pub mod cancellation;
pub mod context;
pub mod database;
pub mod error;
pub mod future;
pub mod keyselector;
pub mod options;
pub mod slice;
pub mod tenant;
pub mod transaction;
pub mod tuple;
pub mod uuid128;
pub mod uuid64;
pub mod watch;

pub use api::boot;
pub use cancellation::CancellationToken;
pub use context::{TransactOption, TransactionSource};
pub use database::{Database, DatabaseTransact, TransactError};
pub use error::{FdbBindingError, FdbBindingResult, FdbError};
pub use keyselector::KeySelector;
pub use slice::Slice;
pub use tenant::Tenant;
pub use transaction::{
    RangeOption, RangeOptionBuilder, Transaction, TransactionCommitError, TransactionState,
};
pub use uuid128::Uuid128;
pub use uuid64::Uuid64;
pub use watch::Watch;

/// The result type most of this crate's native-client-facing operations return.
pub type FdbResult<T = ()> = std::result::Result<T, FdbError>;
