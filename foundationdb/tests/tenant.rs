// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use foundationdb::*;
use futures::FutureExt;

mod common;

#[test]
fn test_tenant_pack_unpack_key() {
    futures::executor::block_on(test_tenant_pack_unpack_key_async()).expect("failed to run");
}

async fn test_tenant_pack_unpack_key_async() -> FdbResult<()> {
    let db = common::database().await?;
    let tenant = db.open_tenant(b"test-tenant")?;

    let packed = tenant.pack_key(b"my-key");
    assert!(packed.starts_with(b"test-tenant"));
    assert_eq!(tenant.unpack_key(&packed), Some(&b"my-key"[..]));

    // A key from an unrelated namespace doesn't unpack.
    assert_eq!(tenant.unpack_key(b"other-tenant\x00my-key"), None);

    Ok(())
}

#[test]
fn test_tenant_isolated_from_raw_database_key() {
    futures::executor::block_on(test_tenant_isolated_from_raw_database_key_async())
        .expect("failed to run");
}

async fn test_tenant_isolated_from_raw_database_key_async() -> FdbResult<()> {
    const RAW_KEY: &[u8] = b"test-tenant-isolation";

    let db = common::database().await?;
    let tenant = db.open_tenant(b"isolation-tenant")?;
    let value = common::random_str(10);

    let trx = tenant.create_trx()?;
    trx.set(&tenant.pack_key(RAW_KEY), value.as_bytes());
    trx.commit().await?;

    // Reading the unprefixed key directly from the database must not see the tenant's write.
    let trx = db.create_trx()?;
    let direct = trx.get(RAW_KEY, false).await?;
    assert!(direct.is_none());

    // Reading through the tenant's own prefix does.
    let trx = db.create_trx()?;
    let scoped = trx.get(&tenant.pack_key(RAW_KEY), false).await?;
    assert_eq!(scoped.unwrap().as_ref(), value.as_bytes());

    Ok(())
}

#[test]
fn test_tenant_transact() {
    futures::executor::block_on(test_tenant_transact_async()).expect("failed to run");
}

async fn test_tenant_transact_async() -> FdbResult<()> {
    const KEY: &[u8] = b"test-tenant-transact";

    let db = common::database().await?;
    let tenant = db.open_tenant(b"transact-tenant")?;
    let value = common::random_str(10);

    let packed_key = tenant.pack_key(KEY);
    let res: FdbResult<()> = tenant
        .transact_boxed(
            (packed_key.clone(), value.clone()),
            |trx, (key, value)| {
                let key = key.clone();
                let value = value.clone();
                async move {
                    trx.set(&key, value.as_bytes());
                    Ok(())
                }
                .boxed()
            },
            TransactOption::default(),
        )
        .await;
    res.expect("tenant transact should succeed");

    let trx = db.create_trx()?;
    let stored = trx.get(&packed_key, false).await?;
    assert_eq!(stored.unwrap().as_ref(), value.as_bytes());

    Ok(())
}
