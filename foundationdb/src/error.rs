// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types for the Fdb crate

use std::ffi::CStr;

use foundationdb_sys as fdb_sys;

use crate::options;

pub(crate) fn eval(error_code: fdb_sys::fdb_error_t) -> Result<()> {
    let rust_code = error_code as i32;
    if rust_code == 0 {
        Ok(())
    } else {
        Err(FdbError::from(error_code))
    }
}

/// An Fdb Result type
pub type Result<T> = std::result::Result<T, FdbError>;

/// An error from a native FoundationDB C API call.
///
/// Carries the raw error code together with the message the native client
/// associates with it, plus the two native predicates used to decide whether
/// the failed operation should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdbError {
    error_code: i32,
}

impl FdbError {
    /// Converts from the raw Fdb error code into an `FdbError`
    pub fn from_code(error_code: fdb_sys::fdb_error_t) -> Self {
        FdbError {
            error_code: error_code as i32,
        }
    }

    /// Converts from the raw Fdb error code into an `FdbError`
    pub fn from(error_code: fdb_sys::fdb_error_t) -> Self {
        Self::from_code(error_code)
    }

    /// The message the native client associates with this error code.
    pub fn message(&self) -> &'static str {
        let error_str = unsafe { CStr::from_ptr(fdb_sys::fdb_get_error(self.error_code as i32)) };
        error_str
            .to_str()
            .expect("bad error string from FoundationDB")
    }

    /// Indicates the transaction may have succeeded, though not in a way the system can verify.
    pub fn is_maybe_committed(&self) -> bool {
        self.predicate(options::ErrorPredicate::MaybeCommitted)
    }

    /// Indicates the operations in the transactions should be retried because of transient error.
    pub fn is_retryable(&self) -> bool {
        self.predicate(options::ErrorPredicate::Retryable)
    }

    /// Indicates the transaction has not committed, though in a way that can be retried.
    pub fn is_retryable_not_committed(&self) -> bool {
        self.predicate(options::ErrorPredicate::RetryableNotCommitted)
    }

    fn predicate(&self, predicate: options::ErrorPredicate) -> bool {
        let check = unsafe {
            fdb_sys::fdb_error_predicate(predicate.code() as i32, self.error_code as fdb_sys::fdb_error_t)
        };
        check != 0
    }

    /// Error code
    pub fn code(&self) -> i32 {
        self.error_code
    }
}

impl std::fmt::Display for FdbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FoundationDB error({}): {}", self.error_code, self.message())
    }
}

impl std::error::Error for FdbError {}

/// The binding-level error surfaced by the public API.
///
/// `FdbError` only ever represents a failure reported by the native client.
/// A number of failure modes belong purely to this binding (misuse of a
/// disposed object, a cancelled operation, an option value the binding
/// itself rejects) and have no native error code to wrap; those are the
/// remaining variants here.
///
/// [`FdbBindingError::is_retryable`], [`is_fatal`](FdbBindingError::is_fatal) and
/// [`is_cancellation`](FdbBindingError::is_cancellation) implement the three-way
/// classification the retry loop in [`crate::database::Database::transact`] relies on.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FdbBindingError {
    /// A failure reported by the native FoundationDB client.
    #[error(transparent)]
    Fdb(#[from] FdbError),

    /// The operation was cancelled, either explicitly or because a timeout elapsed.
    #[error("operation was cancelled")]
    Cancelled,

    /// A method was called on an object (`Transaction`, `Watch`, `Database`, ...) that has
    /// already been disposed.
    #[error("object has already been disposed")]
    ObjectDisposed,

    /// The transaction captured by a retry-loop handler outlived the attempt it belonged to.
    #[error("transaction is no longer the current attempt and cannot be used")]
    TransactionDisposed,

    /// A transaction method that is illegal once `commit` has been called was invoked.
    #[error("transaction used during or after commit")]
    UsedDuringCommit,

    /// An argument supplied by the caller was rejected before it ever reached the native client.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The requested API version is not supported by the linked native client.
    #[error("unsupported api version")]
    UnsupportedApiVersion,

    /// A caller-supplied buffer was too small to hold the native result.
    #[error("buffer too small")]
    BufferTooSmall,

    /// Bytes that were expected to decode into a particular wire format did not.
    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),
}

impl FdbBindingError {
    /// `true` if the retry loop should attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FdbBindingError::Fdb(e) if e.is_retryable())
    }

    /// `true` if this error can never be resolved by retrying.
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable() && !self.is_cancellation()
    }

    /// `true` if this error represents a cancellation rather than a store-level failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FdbBindingError::Cancelled)
    }

    /// The wrapped native error, if any.
    pub fn fdb_error(&self) -> Option<FdbError> {
        match self {
            FdbBindingError::Fdb(e) => Some(*e),
            _ => None,
        }
    }
}

/// An Fdb binding Result type
pub type FdbBindingResult<T> = std::result::Result<T, FdbBindingError>;
