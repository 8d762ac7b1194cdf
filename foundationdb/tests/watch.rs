// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use foundationdb::*;

mod common;

#[test]
fn test_watch() {
    futures::executor::block_on(test_watch_async()).expect("failed to run");
    futures::executor::block_on(test_watch_without_commit_async()).expect("failed to run");
    futures::executor::block_on(test_watch_is_alive_then_has_changed_async())
        .expect("failed to run");
    futures::executor::block_on(test_watch_cancel_async()).expect("failed to run");
    futures::executor::block_on(test_watch_dispose_async()).expect("failed to run");
}

async fn test_watch_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-watch";

    let db = common::database().await?;

    eprintln!("setting watch");
    let trx = db.create_trx()?;
    let watch = trx.watch(KEY);
    trx.commit().await?;
    eprintln!("watch committed");

    eprintln!("writing value");
    let trx = db.create_trx()?;
    let value = common::random_str(10);
    trx.set(KEY, value.as_bytes());
    trx.commit().await?;
    eprintln!("write committed");

    watch.await?;

    Ok(())
}

async fn test_watch_without_commit_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-watch-2";

    let db = common::database().await?;

    eprintln!("setting watch");
    let trx = db.create_trx()?;
    let watch = trx.watch(KEY);

    drop(trx);
    assert!(watch.await.is_err());

    Ok(())
}

async fn test_watch_is_alive_then_has_changed_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-watch-is-alive";

    let db = common::database().await?;

    let trx = db.create_trx()?;
    let mut watch = trx.watch(KEY);
    trx.commit().await?;
    assert!(watch.is_alive());
    assert!(!watch.has_changed());

    let trx = db.create_trx()?;
    trx.set(KEY, common::random_str(10).as_bytes());
    trx.commit().await?;

    (&mut watch).await.expect("watch should resolve");
    assert!(!watch.is_alive());
    assert!(watch.has_changed());

    Ok(())
}

async fn test_watch_cancel_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-watch-cancel";

    let db = common::database().await?;
    let trx = db.create_trx()?;
    let mut watch = trx.watch(KEY);
    trx.commit().await?;
    assert!(watch.is_alive());

    watch.cancel();
    assert!(!watch.is_alive());
    assert!(!watch.has_changed());
    let err = watch.await.expect_err("a cancelled watch resolves as an error");
    assert!(matches!(err, foundationdb::FdbBindingError::Cancelled));

    Ok(())
}

async fn test_watch_dispose_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-watch-dispose";

    let db = common::database().await?;
    let trx = db.create_trx()?;
    let mut watch = trx.watch(KEY);
    trx.commit().await?;

    watch.dispose();
    watch.dispose(); // idempotent
    let err = watch
        .await
        .expect_err("awaiting a disposed watch must fail");
    assert!(matches!(err, foundationdb::FdbBindingError::ObjectDisposed));

    Ok(())
}
