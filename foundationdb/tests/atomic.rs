// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use byteorder::ByteOrder;
use foundationdb::*;
use futures::future::join_all;

mod common;

async fn atomic_add(db: &Database, key: &[u8], value: i64) -> FdbResult<()> {
    let trx = db.create_trx()?;

    let val = {
        let mut buf = [0u8; 8];
        byteorder::LE::write_i64(&mut buf, value);
        buf
    };
    trx.atomic_op(key, &val, options::MutationType::Add);
    trx.commit().await?;

    Ok(())
}

#[test]
fn test_atomic() {
    futures::executor::block_on(example_atomic()).expect("failed to run");
}

async fn example_atomic() -> FdbResult<()> {
    const KEY: &[u8] = b"test-atomic";
    const N: usize = 1000;

    let db = common::database().await?;

    // clear key before running the example
    let trx = db.create_trx()?;
    trx.clear(KEY);
    trx.commit().await?;

    // Run `N` add(1) operations in parallel
    let fut_add_list = (0..N).map(|_| atomic_add(&db, KEY, 1)).collect::<Vec<_>>();
    // Run `N` add(-1) operations in parallel
    let fut_sub_list = (0..N)
        .map(|_| atomic_add(&db, KEY, -1))
        .collect::<Vec<_>>();

    let (add_results, sub_results) =
        futures::future::join(join_all(fut_add_list), join_all(fut_sub_list)).await;
    add_results.into_iter().collect::<FdbResult<()>>()?;
    sub_results.into_iter().collect::<FdbResult<()>>()?;

    let trx = db.create_trx()?;
    let value = trx.get(KEY, false).await?.expect("value should exist");

    // The value should be zero, as the same number of atomic add/sub operations were done.
    let v: i64 = byteorder::LE::read_i64(&value);
    assert_eq!(v, 0);

    Ok(())
}
