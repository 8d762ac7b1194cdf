// Copyright 2018 foundationdb-rs developers, https://github.com/Clikengo/foundationdb-rs/graphs/contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use foundationdb::api::NetworkAutoStop;
use foundationdb::*;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generates a random string. FoundationDB watches only fire when a value actually changes, so
/// re-using the same value across multiple test runs would never fire. Using a random string
/// keeps repeated runs of the same test independent.
#[allow(unused)]
pub fn random_str(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Boots the FoundationDB network thread, once per process.
#[allow(unused)]
pub fn boot() {
    let _env = &*ENV;
}

#[allow(unused)]
pub fn setup_static() {
    boot();
}

/// Opens the default cluster's default database, booting the network thread first if needed.
#[allow(unused)]
pub async fn database() -> FdbResult<Database> {
    boot();
    Database::default()
}

lazy_static::lazy_static! {
    static ref ENV: TestEnv = TestEnv::new();
}

struct TestEnv {
    _network: NetworkAutoStop,
}

impl TestEnv {
    fn new() -> Self {
        let network_builder = api::FdbApiBuilder::default()
            .build()
            .expect("failed to initialize fdb api");
        let network = unsafe { network_builder.boot() }.expect("failed to start network thread");

        Self { _network: network }
    }
}
