// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A `Watch` is a future that becomes ready when a key's value changes, as created by
//! [`crate::Transaction::watch`].
//!
//! Besides being directly `.await`-able, a `Watch` exposes the predicates every FDB binding's
//! watch object offers: [`Watch::is_alive`] (still pending), [`Watch::has_changed`] (resolved
//! because the key changed), plus explicit [`Watch::cancel`]/[`Watch::dispose`] for callers that
//! want to give up on a watch without waiting for it.

use std::cell::Cell;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::prelude::*;

use crate::cancellation::CancellationToken;
use crate::future::FdbFuture;
use crate::{FdbBindingError, FdbResult};

/// The lifecycle state backing [`Watch::is_alive`]/[`Watch::has_changed`].
#[derive(Clone, Copy, PartialEq, Eq)]
enum WatchState {
    Alive,
    Changed,
    Cancelled,
    Disposed,
    /// The native future resolved with an error other than cancellation (e.g.
    /// `watches_disabled`, `too_many_watches`). `is_alive`/`has_changed` still need a
    /// well-defined (`false`/`false`) answer for this case.
    Failed,
}

/// A future that resolves once the watched key's value changes, the watch is cancelled, or the
/// database the watch belongs to is cancelled.
///
/// Dropping a `Watch` before it resolves cancels it at the native client; this mirrors
/// `fdb_future_destroy`'s documented behavior of implicitly cancelling the future it destroys.
pub struct Watch {
    inner: Option<FdbFuture<()>>,
    cancellation: CancellationToken,
    state: Cell<WatchState>,
}

impl Watch {
    pub(crate) fn new(inner: FdbFuture<()>, cancellation: CancellationToken) -> Self {
        Self {
            inner: Some(inner),
            cancellation,
            state: Cell::new(WatchState::Alive),
        }
    }

    /// `true` while the watch is still pending: the key has not changed, and the watch has been
    /// neither cancelled nor disposed.
    pub fn is_alive(&self) -> bool {
        self.state.get() == WatchState::Alive
    }

    /// `true` once the watched key's value has actually changed (as opposed to the watch ending
    /// via cancellation, disposal, or some other native error).
    pub fn has_changed(&self) -> bool {
        self.state.get() == WatchState::Changed
    }

    /// Cancels this watch: the underlying native future is told to stop, and any pending or
    /// future `.await` on this watch resolves with [`FdbBindingError::Cancelled`]. A no-op if
    /// the watch has already resolved, been cancelled, or been disposed.
    pub fn cancel(&mut self) {
        if self.state.get() == WatchState::Alive {
            // Dropping the handle calls `fdb_future_destroy`, which cancels the future it
            // destroys if it hasn't completed yet.
            self.inner = None;
            self.state.set(WatchState::Cancelled);
        }
    }

    /// Releases this watch's resources. Idempotent: disposing an already-disposed watch is a
    /// no-op. Awaiting a disposed watch fails with [`FdbBindingError::ObjectDisposed`].
    pub fn dispose(&mut self) {
        if self.state.get() == WatchState::Disposed {
            return;
        }
        self.inner = None;
        self.state.set(WatchState::Disposed);
    }
}

impl Future for Watch {
    type Output = Result<(), FdbBindingError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.state.get() {
            WatchState::Disposed => return Poll::Ready(Err(FdbBindingError::ObjectDisposed)),
            WatchState::Cancelled => return Poll::Ready(Err(FdbBindingError::Cancelled)),
            WatchState::Changed => return Poll::Ready(Ok(())),
            WatchState::Failed => return Poll::Ready(Err(FdbBindingError::Cancelled)),
            WatchState::Alive => {}
        }
        if this.cancellation.is_cancelled() {
            this.inner = None;
            this.state.set(WatchState::Cancelled);
            return Poll::Ready(Err(FdbBindingError::Cancelled));
        }
        let inner = this
            .inner
            .as_mut()
            .expect("an Alive watch always retains its native future");
        match Pin::new(inner).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(r) => {
                let mapped = map_watch_result(r);
                this.state.set(match &mapped {
                    Ok(()) => WatchState::Changed,
                    Err(FdbBindingError::Cancelled) => WatchState::Cancelled,
                    Err(_) => WatchState::Failed,
                });
                Poll::Ready(mapped)
            }
        }
    }
}

fn map_watch_result(r: FdbResult<()>) -> Result<(), FdbBindingError> {
    match r {
        Ok(()) => Ok(()),
        Err(e) if e.code() == 1101 => Err(FdbBindingError::Cancelled),
        Err(e) => Err(FdbBindingError::Fdb(e)),
    }
}
