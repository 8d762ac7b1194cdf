// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The retry-loop driver shared by [`crate::Database::transact`] and
//! [`crate::Tenant::transact`].
//!
//! An `OperationContext` owns everything a single logical operation needs
//! across however many attempts it takes: the cancellation token, the retry
//! budget, and the transaction for the attempt currently in flight. A new
//! `Transaction` is created for every attempt; the previous one is dropped
//! (and with it, disposed) before the next is created.

use std::time::{Duration, Instant};

use crate::cancellation::CancellationToken;
use crate::database::{DatabaseTransact, TransactError};
use crate::transaction::Transaction;
use crate::{FdbError, FdbResult};

/// Anything capable of producing a fresh [`Transaction`] for each attempt of a
/// retry loop: a [`crate::Database`] or a [`crate::Tenant`].
pub trait TransactionSource {
    /// Create a new transaction rooted at this source.
    fn create_trx(&self) -> FdbResult<Transaction>;

    /// The cancellation token that governs every transaction this source produces.
    fn cancellation_token(&self) -> &CancellationToken;
}

/// A set of options that controls the behavior of a retry loop.
#[derive(Default, Clone)]
pub struct TransactOption {
    pub retry_limit: Option<u32>,
    pub time_out: Option<Duration>,
    pub max_retry_delay: Option<Duration>,
    pub is_idempotent: bool,
}

impl TransactOption {
    /// An idempotent TransactOption
    pub fn idempotent() -> Self {
        Self {
            is_idempotent: true,
            ..TransactOption::default()
        }
    }
}

/// Drives the retry loop for a single logical operation against a `TransactionSource`.
///
/// Created fresh for every call to `transact`; not reused across operations.
pub(crate) struct OperationContext<'s, S: TransactionSource> {
    source: &'s S,
    options: TransactOption,
    attempt: u32,
    deadline: Option<Instant>,
}

impl<'s, S: TransactionSource> OperationContext<'s, S> {
    pub(crate) fn new(source: &'s S, options: TransactOption) -> Self {
        let deadline = options.time_out.map(|d| Instant::now() + d);
        Self {
            source,
            options,
            attempt: 0,
            deadline,
        }
    }

    /// `true` if another attempt is still within the retry budget. Mirrors the teacher's own
    /// `can_retry` closure in `Database::transact`: with no `retry_limit`/`time_out` configured
    /// both `filter(..).is_none()` terms are `true`, so the default behavior is to retry
    /// indefinitely.
    fn can_retry(&mut self) -> bool {
        self.attempt += 1;
        self.options
            .retry_limit
            .filter(|&limit| self.attempt < limit)
            .is_none()
            && self
                .deadline
                .filter(|&deadline| Instant::now() < deadline)
                .is_none()
    }

    /// Runs `f` to completion, retrying on retriable failures until it succeeds, the
    /// cancellation token fires, or the retry budget (`retry_limit`/`time_out`) is exhausted.
    ///
    /// Mirrors the contract of `Database::transact`: `f` is invoked at least once; on success
    /// the resulting transaction is committed automatically; `CommitUnknownResult` is never
    /// silently retried.
    pub(crate) async fn run<F>(&mut self, mut f: F) -> Result<F::Item, F::Error>
    where
        F: DatabaseTransact,
    {
        let mut trx = self.source.create_trx()?;
        loop {
            if self.source.cancellation_token().is_cancelled() {
                tracing::debug!("operation context observed cancellation before attempt");
                return Err(F::Error::from(cancelled_error()));
            }

            tracing::trace!(attempt = self.attempt, "starting transaction attempt");
            let r = f.transact(trx).await;
            f = r.0;
            trx = r.1;
            trx = match r.2 {
                Ok(item) => match trx.commit().await {
                    Ok(_) => {
                        tracing::trace!(attempt = self.attempt, "commit succeeded");
                        break Ok(item);
                    }
                    Err(e) => {
                        if (self.options.is_idempotent || !e.is_maybe_committed())
                            && self.can_retry()
                        {
                            tracing::debug!(error = %e, "commit failed, retrying");
                            e.on_error().await?
                        } else {
                            break Err(F::Error::from(e.into()));
                        }
                    }
                },
                Err(user_err) => match user_err.try_into_fdb_error() {
                    Ok(e) => {
                        if (self.options.is_idempotent || !e.is_maybe_committed())
                            && self.can_retry()
                        {
                            tracing::debug!(error = %e, "handler failed, retrying");
                            trx.on_error(e).await?
                        } else {
                            break Err(F::Error::from(e));
                        }
                    }
                    Err(user_err) => break Err(user_err),
                },
            };
        }
    }
}

/// The native error code FoundationDB uses for an externally cancelled operation.
const FDB_ERROR_CANCELLED: i32 = 1101;

fn cancelled_error() -> FdbError {
    FdbError::from_code(FDB_ERROR_CANCELLED as foundationdb_sys::fdb_error_t)
}
