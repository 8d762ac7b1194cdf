// Copyright 2019 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use foundationdb::future::FdbSlice;
use foundationdb::*;
use std::pin::Pin;
use std::task::{Context, Poll};

mod common;

/// Polls its inner future exactly once, then reports ready regardless of the inner future's
/// state. Used to exercise dropping a still-pending native future.
struct AbortingFuture {
    inner: Pin<Box<dyn Future<Output = FdbResult<Option<FdbSlice>>>>>,
    polled: bool,
}

impl Future for AbortingFuture {
    type Output = FdbResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.polled {
            self.polled = true;
            let _ = self.inner.as_mut().poll(cx);
        }

        Poll::Ready(Ok(()))
    }
}

#[test]
// dropping a future while it's in the pending state should not crash
fn test_future_discard() {
    futures::executor::block_on(test_future_discard_async()).expect("failed to run");
}

async fn test_future_discard_async() -> FdbResult<()> {
    let db = common::database().await?;

    for _ in 0..=1000 {
        let trx = db.create_trx()?;
        AbortingFuture {
            inner: Box::pin(trx.get(b"key", false)),
            polled: false,
        }
        .await?;
    }

    Ok(())
}
