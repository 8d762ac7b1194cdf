// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use foundationdb::*;
use futures::FutureExt;

mod common;

#[test]
fn test_context_retry_limit_is_honored() {
    futures::executor::block_on(test_context_retry_limit_is_honored_async()).expect("failed to run");
}

async fn test_context_retry_limit_is_honored_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-context-retry-limit";
    const RETRY_COUNT: usize = 3;

    let db = common::database().await?;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts0 = attempts.clone();

    let res: FdbResult<()> = db
        .transact_boxed(
            &db,
            move |trx, db| {
                let attempts0 = attempts0.clone();
                async move {
                    attempts0.fetch_add(1, Ordering::SeqCst);
                    trx.set_option(options::TransactionOption::RetryLimit(RETRY_COUNT as u32))
                        .expect("failed to set retry limit");

                    // force a conflict on every attempt
                    trx.get(KEY, false).await?;
                    let other = db.create_trx()?;
                    other.set(KEY, common::random_str(4).as_bytes());
                    other.commit().await?;

                    trx.set(KEY, common::random_str(4).as_bytes());
                    Ok(())
                }
                .boxed()
            },
            TransactOption::default(),
        )
        .await;

    res.expect_err("a permanently conflicting operation should eventually fail");
    // `TransactionOption::RetryLimit` does not count the first attempt.
    assert_eq!(attempts.load(Ordering::SeqCst), RETRY_COUNT + 1);
    Ok(())
}

#[test]
fn test_context_timeout_is_honored() {
    futures::executor::block_on(test_context_timeout_is_honored_async()).expect("failed to run");
}

async fn test_context_timeout_is_honored_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-context-timeout";

    let db = common::database().await?;

    let res: FdbResult<()> = db
        .transact_boxed(
            &db,
            move |trx, db| {
                async move {
                    // force a conflict on every attempt so the context keeps retrying
                    // until the timeout elapses.
                    trx.get(KEY, false).await?;
                    let other = db.create_trx()?;
                    other.set(KEY, common::random_str(4).as_bytes());
                    other.commit().await?;
                    trx.set(KEY, common::random_str(4).as_bytes());
                    Ok(())
                }
                .boxed()
            },
            TransactOption {
                time_out: Some(Duration::from_millis(200)),
                ..TransactOption::default()
            },
        )
        .await;

    res.expect_err("a permanently conflicting operation should time out");
    Ok(())
}

#[test]
fn test_context_observes_database_cancellation() {
    futures::executor::block_on(test_context_observes_database_cancellation_async())
        .expect("failed to run");
}

async fn test_context_observes_database_cancellation_async() -> FdbResult<()> {
    let db = common::database().await?;
    db.cancel_all();

    let res: FdbResult<()> = db
        .transact_boxed(
            (),
            |_trx, ()| async { Ok(()) }.boxed(),
            TransactOption::default(),
        )
        .await;

    // Mirrors `context::FDB_ERROR_CANCELLED`: the native code the operation context raises
    // when it observes cancellation before ever starting an attempt.
    const FDB_ERROR_CANCELLED: i32 = 1101;
    let err = res.expect_err("a cancelled database must fail any new operation");
    assert_eq!(err.code(), FDB_ERROR_CANCELLED);
    Ok(())
}

#[test]
fn test_context_cancellation_interrupts_in_flight_attempt() {
    futures::executor::block_on(test_context_cancellation_interrupts_in_flight_attempt_async())
        .expect("failed to run");
}

async fn test_context_cancellation_interrupts_in_flight_attempt_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-context-cancel-in-flight";

    let db = Arc::new(common::database().await?);
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts0 = attempts.clone();

    // Signals the canceller thread only once an attempt's transaction has actually been
    // created and registered, so `cancel_all` has a live handle to reach rather than racing
    // `create_trx` itself.
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let canceller_db = db.clone();
    let canceller = std::thread::spawn(move || {
        rx.recv().expect("the attempt should signal before it resolves");
        canceller_db.cancel_all();
    });

    let res: FdbResult<()> = db
        .transact_boxed(
            tx,
            move |trx, tx| {
                attempts0.fetch_add(1, Ordering::SeqCst);
                let tx = tx.clone();
                async move {
                    let _ = tx.send(());
                    // Never resolves on its own if the native layer doesn't cancel it:
                    // the point of this test is that `cancel_all` is what unblocks it.
                    trx.get(KEY, false).await?;
                    Ok(())
                }
                .boxed()
            },
            TransactOption::default(),
        )
        .await;

    canceller.join().expect("canceller thread should not panic");
    res.expect_err("an attempt cancelled while in flight must fail rather than hang or succeed");
    // The native cancellation is not retryable, so the context must not start a second attempt.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_context_idempotent_option_allows_retry_after_maybe_committed() {
    futures::executor::block_on(
        test_context_idempotent_option_allows_retry_after_maybe_committed_async(),
    )
    .expect("failed to run");
}

async fn test_context_idempotent_option_allows_retry_after_maybe_committed_async() -> FdbResult<()>
{
    // `TransactOption::idempotent()` marks the operation retryable even when the native
    // client reports a possibly-committed commit failure; a non-idempotent operation with
    // the same shape is expected to stop retrying in that case instead. This exercises the
    // option plumbing end to end rather than a specific native error path.
    let db = common::database().await?;

    let res: FdbResult<()> = db
        .transact_boxed(
            (),
            |trx, ()| {
                async move {
                    trx.set(b"test-context-idempotent", b"1");
                    Ok(())
                }
                .boxed()
            },
            TransactOption::idempotent(),
        )
        .await;

    res.expect("an ordinary idempotent operation still succeeds");
    Ok(())
}
