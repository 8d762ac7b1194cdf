// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Implementations of the FDBTransaction C API
//!
//! https://apple.github.io/foundationdb/api-c.html#transaction

use std::borrow::Cow;
use std::convert::TryFrom;
use std::ops::{Range, RangeInclusive};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use foundationdb_sys as fdb_sys;
use futures::prelude::*;

use crate::cancellation::CancellationToken;
use crate::error;
use crate::future::*;
use crate::keyselector::KeySelector;
use crate::options;
use crate::watch::Watch;
use crate::{FdbError, FdbResult};

/// Converts Rust `bool` into `fdb_sys::fdb_bool_t`
fn fdb_bool(v: bool) -> fdb_sys::fdb_bool_t {
    if v {
        1
    } else {
        0
    }
}

/// Foundationdb API uses `c_int` as a length, while Rust uses `usize`. A naive `as i32` cast
/// would wrap large `usize` values into a negative length, so clamp instead.
fn usize_trunc(v: usize) -> std::os::raw::c_int {
    if v > std::i32::MAX as usize {
        std::i32::MAX
    } else {
        v as i32
    }
}

/// A native transaction handle, stashed in a [`Database`](crate::Database)'s or
/// [`Tenant`](crate::Tenant)'s live-transaction registry so `Database::cancel_all` can reach
/// every in-flight transaction and call `fdb_transaction_cancel` on it directly, rather than
/// only flipping the shared [`CancellationToken`] and waiting for the next retry-loop boundary
/// to notice.
pub(crate) struct RawTrxHandle(pub(crate) NonNull<fdb_sys::FDBTransaction>);
// `fdb_transaction_cancel` is documented safe to call from any thread concurrently with the
// transaction's own use, which is the only thing this handle is ever used for.
unsafe impl Send for RawTrxHandle {}
unsafe impl Sync for RawTrxHandle {}

/// A registry of every live transaction's id and native handle, shared between a
/// [`Database`](crate::Database)/[`Tenant`](crate::Tenant) and every [`Transaction`] it creates.
pub(crate) type TransactionRegistry =
    Arc<Mutex<std::collections::HashMap<u64, RawTrxHandle>>>;

/// The lifecycle state of a [`Transaction`], tracked purely at the binding level: the native
/// client has no notion of it beyond "does the handle still exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Created, not yet used for a read or write.
    Ready,
    /// At least one operation has been issued against this attempt.
    Executing,
    /// `commit` succeeded.
    Committed,
    /// `cancel` was called.
    Rolledback,
    /// `commit` failed with a non-retriable error.
    Failed,
}

/// In FoundationDB, a transaction is a mutable snapshot of a database.
///
/// All read and write operations on a transaction see and modify an otherwise-unchanging version
/// of the database and only change the underlying database if and when the transaction is
/// committed. Read operations do see the effects of previous write operations on the same
/// transaction. Committing a transaction usually succeeds in the absence of conflicts.
///
/// Applications must provide error handling and an appropriate retry loop around the application
/// code for a transaction; see [`crate::Database::transact`].
///
/// Transactions group operations into a unit with the properties of atomicity, isolation, and
/// durability, together known as ACID. They are also causally consistent: once a transaction has
/// been successfully committed, all subsequently created transactions will see its effects.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<TransactionInner>,
}

struct TransactionInner {
    id: u64,
    handle: NonNull<fdb_sys::FDBTransaction>,
    cancellation: CancellationToken,
    registry: TransactionRegistry,
    state: Mutex<TransactionState>,
    committed: AtomicBool,
}
unsafe impl Send for TransactionInner {}
unsafe impl Sync for TransactionInner {}
impl Drop for TransactionInner {
    fn drop(&mut self) {
        self.registry.lock().unwrap().remove(&self.id);
        unsafe {
            fdb_sys::fdb_transaction_destroy(self.handle.as_ptr());
        }
    }
}

/// Options controlling a single `Transaction::get_range`/`get_ranges` call.
pub struct RangeOption<'a> {
    pub begin: KeySelector<'a>,
    pub end: KeySelector<'a>,
    pub limit: usize,
    pub target_bytes: usize,
    pub mode: options::StreamingMode,
    pub snapshot: bool,
    pub reverse: bool,
}

impl<'a> Default for RangeOption<'a> {
    fn default() -> Self {
        Self {
            begin: KeySelector::first_greater_or_equal(&[][..]),
            end: KeySelector::first_greater_or_equal(&[][..]),
            limit: std::usize::MAX,
            target_bytes: 0,
            mode: options::StreamingMode::Iterator,
            snapshot: false,
            reverse: false,
        }
    }
}

/// Builder for [`RangeOption`].
pub struct RangeOptionBuilder<'a>(RangeOption<'a>);
impl<'a> RangeOptionBuilder<'a> {
    pub fn new(begin: KeySelector<'a>, end: KeySelector<'a>) -> Self {
        RangeOptionBuilder(RangeOption {
            begin,
            end,
            ..RangeOption::default()
        })
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.0.limit = limit;
        self
    }

    pub fn target_bytes(mut self, target_bytes: usize) -> Self {
        self.0.target_bytes = target_bytes;
        self
    }

    pub fn mode(mut self, mode: options::StreamingMode) -> Self {
        self.0.mode = mode;
        self
    }

    pub fn snapshot(mut self, snapshot: bool) -> Self {
        self.0.snapshot = snapshot;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.0.reverse = reverse;
        self
    }

    pub fn build(self) -> RangeOption<'a> {
        self.0
    }
}

impl<'a> From<(KeySelector<'a>, KeySelector<'a>)> for RangeOption<'a> {
    fn from((begin, end): (KeySelector<'a>, KeySelector<'a>)) -> Self {
        RangeOptionBuilder::new(begin, end).build()
    }
}

impl<'a, K> From<(K, K)> for RangeOption<'a>
where
    K: Into<Cow<'a, [u8]>>,
{
    fn from((begin, end): (K, K)) -> Self {
        RangeOptionBuilder::new(
            KeySelector::first_greater_or_equal(begin),
            KeySelector::first_greater_or_equal(end),
        )
        .build()
    }
}

impl<'a> From<Range<KeySelector<'a>>> for RangeOption<'a> {
    fn from(r: Range<KeySelector<'a>>) -> Self {
        RangeOptionBuilder::new(r.start, r.end).build()
    }
}

impl<'a, K> From<Range<K>> for RangeOption<'a>
where
    K: Into<Cow<'a, [u8]>>,
{
    fn from(r: Range<K>) -> Self {
        RangeOptionBuilder::new(
            KeySelector::first_greater_or_equal(r.start),
            KeySelector::first_greater_or_equal(r.end),
        )
        .build()
    }
}

impl<'a, K> From<RangeInclusive<K>> for RangeOption<'a>
where
    K: Into<Cow<'a, [u8]>>,
{
    fn from(r: RangeInclusive<K>) -> Self {
        let (start, end) = r.into_inner();
        RangeOptionBuilder::new(
            KeySelector::first_greater_or_equal(start),
            KeySelector::first_greater_than(end),
        )
        .build()
    }
}

impl Transaction {
    pub(crate) fn new(
        id: u64,
        handle: NonNull<fdb_sys::FDBTransaction>,
        cancellation: CancellationToken,
        registry: TransactionRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(TransactionInner {
                id,
                handle,
                cancellation,
                registry,
                state: Mutex::new(TransactionState::Ready),
                committed: AtomicBool::new(false),
            }),
        }
    }

    /// This transaction's process-wide unique id, assigned when it was created.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The current lifecycle state of this attempt.
    pub fn state(&self) -> TransactionState {
        *self.inner.state.lock().unwrap()
    }

    fn mark_executing(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if *state == TransactionState::Ready {
            *state = TransactionState::Executing;
        }
    }

    fn raw(&self) -> *mut fdb_sys::FDBTransaction {
        self.inner.handle.as_ptr()
    }

    /// Called to set an option on an FDBTransaction.
    pub fn set_option(&self, opt: options::TransactionOption) -> FdbResult<()> {
        unsafe { opt.apply(self.raw()) }
    }

    /// Modify the database snapshot represented by transaction to change the given key to have
    /// the given value.
    ///
    /// If the given key was not previously present in the database it is inserted. The
    /// modification affects the actual database only if the transaction is later committed.
    pub fn set(&self, key: &[u8], value: &[u8]) {
        self.mark_executing();
        unsafe {
            fdb_sys::fdb_transaction_set(
                self.raw(),
                key.as_ptr(),
                key.len() as i32,
                value.as_ptr(),
                value.len() as i32,
            )
        }
    }

    /// Modify the database snapshot represented by transaction to remove the given key from the
    /// database.
    pub fn clear(&self, key: &[u8]) {
        self.mark_executing();
        unsafe { fdb_sys::fdb_transaction_clear(self.raw(), key.as_ptr(), key.len() as i32) }
    }

    /// Reads a value from the database snapshot represented by transaction.
    pub fn get(&self, key: &[u8], snapshot: bool) -> impl Future<Output = FdbResult<Option<FdbSlice>>> {
        self.mark_executing();
        let f = unsafe {
            fdb_sys::fdb_transaction_get(
                self.raw(),
                key.as_ptr() as *const _,
                key.len() as i32,
                fdb_bool(snapshot),
            )
        };
        FdbFuture::new(f)
    }

    /// An atomic operation is a single database command that carries out several logical
    /// steps: reading the value of a key, performing a transformation on that value, and
    /// writing the result. Because the client never observes the intermediate value, an
    /// atomic operation cannot cause the transaction to conflict on its own.
    pub fn atomic_op(&self, key: &[u8], param: &[u8], op_type: options::MutationType) {
        self.mark_executing();
        unsafe {
            fdb_sys::fdb_transaction_atomic_op(
                self.raw(),
                key.as_ptr() as *const _,
                key.len() as i32,
                param.as_ptr() as *const _,
                param.len() as i32,
                op_type.code(),
            )
        }
    }

    /// Resolves a key selector against the keys in the database snapshot represented by
    /// transaction.
    pub fn get_key(
        &self,
        selector: &KeySelector<'_>,
        snapshot: bool,
    ) -> impl Future<Output = FdbResult<FdbSlice>> {
        self.mark_executing();
        let key = selector.key();
        let f = unsafe {
            fdb_sys::fdb_transaction_get_key(
                self.raw(),
                key.as_ptr() as *const _,
                key.len() as i32,
                fdb_bool(selector.or_equal()),
                selector.offset() as i32,
                fdb_bool(snapshot),
            )
        };
        FdbFuture::new(f)
    }

    /// Adds a range of keys to a transaction's read or write conflict ranges as if the range had
    /// been read from or written to.
    pub fn add_conflict_range(
        &self,
        begin: &[u8],
        end: &[u8],
        kind: options::ConflictRangeType,
    ) -> FdbResult<()> {
        error::eval(unsafe {
            fdb_sys::fdb_transaction_add_conflict_range(
                self.raw(),
                begin.as_ptr() as *const _,
                begin.len() as i32,
                end.as_ptr() as *const _,
                end.len() as i32,
                kind.code(),
            )
        })
    }

    /// Reads a single batch of key-value pairs matching the given range.
    ///
    /// `iteration` identifies which batch this is within a multi-batch read using the native
    /// iterator protocol (see [`Transaction::get_ranges`] for the streaming version that drives
    /// this automatically).
    pub fn get_range(
        &self,
        opt: &RangeOption<'_>,
        iteration: usize,
    ) -> impl Future<Output = FdbResult<FdbValues>> {
        self.get_range_inner(opt, iteration)
    }

    fn get_range_inner(&self, opt: &RangeOption<'_>, iteration: usize) -> impl Future<Output = FdbResult<FdbValues>> {
        self.mark_executing();
        let key_begin = opt.begin.key();
        let key_end = opt.end.key();

        let f = unsafe {
            fdb_sys::fdb_transaction_get_range(
                self.raw(),
                key_begin.as_ptr() as *const _,
                key_begin.len() as i32,
                fdb_bool(opt.begin.or_equal()),
                opt.begin.offset() as i32,
                key_end.as_ptr() as *const _,
                key_end.len() as i32,
                fdb_bool(opt.end.or_equal()),
                opt.end.offset() as i32,
                usize_trunc(opt.limit),
                usize_trunc(opt.target_bytes),
                opt.mode.code(),
                iteration as i32,
                fdb_bool(opt.snapshot),
                fdb_bool(opt.reverse),
            )
        };
        FdbFuture::new(f)
    }

    /// Reads all key-value pairs in the database snapshot represented by transaction matching
    /// the given range, as a stream of batches. Each batch re-issues the underlying range read
    /// with the key selectors advanced past the last key returned, exactly as the native
    /// iterator protocol requires.
    pub fn get_ranges(&self, opt: RangeOption<'_>) -> KeyValuesStream<'_> {
        let mut stream = KeyValuesStream {
            trx: self,
            begin: opt.begin,
            end: opt.end,
            limit: opt.limit,
            target_bytes: opt.target_bytes,
            mode: opt.mode,
            snapshot: opt.snapshot,
            reverse: opt.reverse,
            iteration: 0,
            index: 0,
            inner: None,
        };
        stream.restart();
        stream
    }

    /// Modify the database snapshot represented by transaction to remove all keys (if any) which
    /// are lexicographically greater than or equal to the given begin key and lexicographically
    /// less than the given end key.
    pub fn clear_range(&self, begin: &[u8], end: &[u8]) {
        self.mark_executing();
        unsafe {
            fdb_sys::fdb_transaction_clear_range(
                self.raw(),
                begin.as_ptr() as *const _,
                begin.len() as i32,
                end.as_ptr() as *const _,
                end.len() as i32,
            )
        }
    }

    /// Attempts to commit the sets and clears previously applied to the database snapshot
    /// represented by transaction to the actual database.
    ///
    /// On failure, the returned [`TransactionCommitError`] hands back this same transaction so
    /// that it can be passed into [`TransactionCommitError::on_error`] to decide whether the
    /// caller's retry loop should try again.
    pub async fn commit(self) -> Result<Transaction, TransactionCommitError> {
        let f = unsafe { fdb_sys::fdb_transaction_commit(self.raw()) };
        let fut: FdbFuture<()> = FdbFuture::new(f);
        match fut.await {
            Ok(()) => {
                self.inner.committed.store(true, Ordering::SeqCst);
                *self.inner.state.lock().unwrap() = TransactionState::Committed;
                Ok(self)
            }
            Err(err) => {
                *self.inner.state.lock().unwrap() = TransactionState::Failed;
                Err(TransactionCommitError { trx: self, err })
            }
        }
    }

    /// Implements the retry logic appropriate for an error as returned by a call to
    /// `Transaction::commit`. If the error was not retriable, returns the error it was given,
    /// otherwise resets the transaction and returns a transaction ready to be reused.
    pub async fn on_error(self, err: FdbError) -> FdbResult<Transaction> {
        let f =
            unsafe { fdb_sys::fdb_transaction_on_error(self.raw(), err.code() as fdb_sys::fdb_error_t) };
        let fut: FdbFuture<()> = FdbFuture::new(f);
        fut.await?;
        *self.inner.state.lock().unwrap() = TransactionState::Ready;
        Ok(self)
    }

    /// Cancels the transaction. All pending or future uses of the transaction will return a
    /// `transaction_cancelled` error. The transaction can be used again after it is reset.
    ///
    /// Be careful mixing `reset`/`cancel` concurrently on clones of the same transaction: since
    /// they negate each other's effects, a race between the two calls leaves the transaction in
    /// an unknown state.
    pub fn cancel(self) {
        *self.inner.state.lock().unwrap() = TransactionState::Rolledback;
        unsafe { fdb_sys::fdb_transaction_cancel(self.raw()) }
    }

    /// `true` once the database this transaction belongs to (or the transaction itself) has
    /// been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Retrieves the database version number at which this transaction was committed.
    /// `commit` must have succeeded before this is called.
    pub fn committed_version(&self) -> FdbResult<i64> {
        let mut version: i64 = 0;
        error::eval(unsafe {
            fdb_sys::fdb_transaction_get_committed_version(self.raw(), &mut version as *mut _)
        })?;
        Ok(version)
    }

    /// Returns a list of public network addresses as strings, one for each of the storage
    /// servers responsible for storing `key` and its associated value.
    pub fn get_addresses_for_key(
        &self,
        key: &[u8],
    ) -> impl Future<Output = FdbResult<FdbAddresses>> {
        self.mark_executing();
        let f = unsafe {
            fdb_sys::fdb_transaction_get_addresses_for_key(
                self.raw(),
                key.as_ptr() as *const _,
                key.len() as i32,
            )
        };
        FdbFuture::new(f)
    }

    /// A watch's behavior is relative to the transaction that created it. A watch will report a
    /// change in relation to the key's value as readable by that transaction. Until the
    /// transaction that created it has been committed, a watch will not report changes made by
    /// other transactions; it will immediately report changes made by the transaction itself.
    ///
    /// By default, each database connection can have no more than 10,000 watches that have not
    /// yet reported a change (`MAX_WATCHES` database option).
    pub fn watch(&self, key: &[u8]) -> Watch {
        self.mark_executing();
        let f = unsafe {
            fdb_sys::fdb_transaction_watch(self.raw(), key.as_ptr() as *const _, key.len() as i32)
        };
        Watch::new(FdbFuture::new(f), self.inner.cancellation.clone())
    }

    /// Sets the snapshot read version used by a transaction. Implementations should throw an
    /// error if the transaction has already set a read version.
    pub fn set_read_version(&self, version: i64) {
        unsafe { fdb_sys::fdb_transaction_set_read_version(self.raw(), version) }
    }

    /// Returns the transaction snapshot read version.
    pub fn get_read_version(&self) -> impl Future<Output = FdbResult<i64>> {
        self.mark_executing();
        let f = unsafe { fdb_sys::fdb_transaction_get_read_version(self.raw()) };
        FdbFuture::new(f)
    }

    /// Returns a future that resolves to the versionstamp which was used by any versionstamp
    /// operations in this transaction, once the transaction has been successfully committed.
    ///
    /// Must be called before [`Transaction::commit`], but the returned future only resolves
    /// after the commit future does.
    pub fn get_versionstamp(&self) -> impl Future<Output = FdbResult<FdbSlice>> {
        self.mark_executing();
        let f = unsafe { fdb_sys::fdb_transaction_get_versionstamp(self.raw()) };
        FdbFuture::new(f)
    }

    /// Returns an estimate for the number of bytes stored in the given range.
    pub fn get_approximate_size(&self) -> impl Future<Output = FdbResult<i64>> {
        let f = unsafe { fdb_sys::fdb_transaction_get_approximate_size(self.raw()) };
        FdbFuture::new(f)
    }
}

/// The error returned by [`Transaction::commit`]. Carries both the native error and the
/// transaction it failed on, so the caller (normally [`crate::context::OperationContext`]) can
/// decide whether to retry via [`TransactionCommitError::on_error`].
pub struct TransactionCommitError {
    trx: Transaction,
    err: FdbError,
}

impl TransactionCommitError {
    /// Indicates the transaction may have succeeded, though not in a way the system can verify;
    /// callers must not blindly retry in this case unless the operation is known idempotent.
    pub fn is_maybe_committed(&self) -> bool {
        self.err.is_maybe_committed()
    }

    /// Indicates the operation should be retried because of a transient error.
    pub fn is_retryable(&self) -> bool {
        self.err.is_retryable()
    }

    /// Indicates the transaction has not committed, though in a way that can be retried.
    pub fn is_retryable_not_committed(&self) -> bool {
        self.err.is_retryable_not_committed()
    }

    /// The message the native client associates with the underlying error code.
    pub fn message(&self) -> &'static str {
        self.err.message()
    }

    /// The native error that caused the commit to fail.
    pub fn error(&self) -> FdbError {
        self.err
    }

    /// Runs the native retry-eligibility check and, if the engine says this error can be
    /// retried, returns the transaction reset and ready for another attempt.
    pub async fn on_error(self) -> FdbResult<Transaction> {
        self.trx.on_error(self.err).await
    }
}

impl From<TransactionCommitError> for FdbError {
    fn from(e: TransactionCommitError) -> Self {
        e.err
    }
}

impl std::fmt::Display for TransactionCommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err.message())
    }
}

impl std::fmt::Debug for TransactionCommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionCommitError({})", self.err.message())
    }
}

impl std::error::Error for TransactionCommitError {}

/// A stream of range-read batches, re-issuing the underlying `fdb_transaction_get_range` call
/// with the key selectors advanced past the last key returned each time the native client
/// reports more data is available.
pub struct KeyValuesStream<'a> {
    trx: &'a Transaction,
    begin: KeySelector<'a>,
    end: KeySelector<'a>,
    limit: usize,
    target_bytes: usize,
    mode: options::StreamingMode,
    snapshot: bool,
    reverse: bool,
    iteration: usize,
    index: usize,
    inner: Option<std::pin::Pin<Box<dyn Future<Output = FdbResult<FdbValues>> + 'a>>>,
}

impl<'a> KeyValuesStream<'a> {
    fn restart(&mut self) {
        self.iteration += 1;
        let opt = RangeOption {
            begin: self.begin.clone(),
            end: self.end.clone(),
            limit: self.limit.saturating_sub(self.index),
            target_bytes: self.target_bytes,
            mode: self.mode,
            snapshot: self.snapshot,
            reverse: self.reverse,
        };
        self.inner = Some(Box::pin(self.trx.get_range_inner(&opt, self.iteration)));
    }

    fn advance(&mut self, values: &FdbValues) {
        if !values.more() || values.is_empty() {
            self.inner = None;
            return;
        }
        self.index += values.len();
        let last = values.last().expect("checked non-empty above");
        if self.reverse {
            self.end = KeySelector::first_greater_or_equal(last.key().to_vec());
        } else {
            self.begin = KeySelector::first_greater_than(last.key().to_vec());
        }
        self.restart();
    }
}

impl<'a> Stream for KeyValuesStream<'a> {
    type Item = FdbResult<FdbValues>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let inner = match self.inner.as_mut() {
            None => return std::task::Poll::Ready(None),
            Some(inner) => inner,
        };
        match inner.as_mut().poll(cx) {
            std::task::Poll::Pending => std::task::Poll::Pending,
            std::task::Poll::Ready(Err(e)) => {
                self.inner = None;
                std::task::Poll::Ready(Some(Err(e)))
            }
            std::task::Poll::Ready(Ok(values)) => {
                self.advance(&values);
                std::task::Poll::Ready(Some(Ok(values)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_option_default_is_unbounded() {
        let opt = RangeOption::default();
        assert_eq!(opt.limit, std::usize::MAX);
        assert!(!opt.reverse);
    }
}
