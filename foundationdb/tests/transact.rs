// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use foundationdb::*;
use futures::executor::block_on;
use futures::FutureExt;

mod common;

#[test]
fn test_transact_error() {
    let db = futures::executor::block_on(common::database()).unwrap();

    let res = block_on(db.transact_boxed(
        (),
        |_trx, ()| {
            async { Err(FdbBindingError::InvalidArgument("boom")) }.boxed()
        },
        TransactOption::default(),
    ));
    assert!(res.is_err());
}

#[test]
fn test_transact_success() {
    let db = futures::executor::block_on(common::database()).unwrap();

    let res: FdbResult<()> = block_on(db.transact_boxed(
        (),
        |trx, ()| {
            async move {
                trx.set(b"test", b"1");
                assert_eq!(trx.get(b"test", false).await?.unwrap().as_ref(), b"1");

                Ok(())
            }
            .boxed()
        },
        TransactOption::default(),
    ));
    assert!(res.is_ok());
}

// Makes the key dirty. It will abort transactions which perform a non-snapshot read on the `key`.
async fn make_dirty(db: &Database, key: &[u8]) {
    let trx = db.create_trx().unwrap();
    trx.set(key, b"");
    trx.commit().await.unwrap();
}

#[test]
fn test_transact_conflict() {
    use std::sync::{atomic::*, Arc};

    const KEY: &[u8] = b"test-transact";
    const RETRY_COUNT: usize = 5;

    let try_count = Arc::new(AtomicUsize::new(0));
    let try_count0 = try_count.clone();

    let db = futures::executor::block_on(common::database()).unwrap();

    let fut: _ = db.transact_boxed(
        &db,
        move |trx, db| {
            let try_count0 = try_count0.clone();
            async move {
                // increment try counter
                try_count0.fetch_add(1, Ordering::SeqCst);

                trx.set_option(options::TransactionOption::RetryLimit(RETRY_COUNT as u32))
                    .expect("failed to set retry limit");

                // update conflict range
                trx.get(KEY, false).await?;

                // make current transaction invalid by making conflict
                make_dirty(db, KEY).await;

                trx.set(KEY, common::random_str(10).as_bytes());

                Ok(())
            }
            .boxed()
        },
        TransactOption::default(),
    );

    let res: FdbResult<()> = block_on(fut);
    res.expect_err("commit should have failed");

    // `TransactionOption::RetryLimit` does not count the first try, so `try_count` should be
    // equal to `RETRY_COUNT+1`
    assert_eq!(try_count.load(Ordering::SeqCst), RETRY_COUNT + 1);
}
