// Copyright 2018 foundationdb-rs developers, https://github.com/bluejekyll/foundationdb-rs/graphs/contributors
// Copyright 2013-2018 Apple, Inc and the FoundationDB project authors.
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A named, isolated key-space inside a [`crate::Database`].
//!
//! The native client this crate links against predates tenant isolation at the FDBTenant layer
//! of the C API, so a `Tenant` here namespaces keys instead: every key the caller supplies is
//! prefixed with the tenant's packed name before it reaches an ordinary transaction of the
//! owning database, and every key handed back is stripped of that prefix. Callers otherwise use
//! `Tenant` exactly like a `Database`.

use std::collections::HashSet;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use foundationdb_sys as fdb_sys;

use crate::cancellation::CancellationToken;
use crate::context::{OperationContext, TransactOption, TransactionSource};
use crate::database::{boxed, boxed_local, next_transaction_id, TransactError};
use crate::transaction::{RawTrxHandle, Transaction, TransactionRegistry};
use crate::{error, FdbResult};

/// A handle onto a named tenant's key-space within a [`crate::Database`].
///
/// A `Tenant` borrows its owning database's native handle non-owning: it must not outlive the
/// `Database` it was opened from.
pub struct Tenant {
    database: NonNull<fdb_sys::FDBDatabase>,
    cancellation: CancellationToken,
    name: Vec<u8>,
    registry: Arc<Mutex<HashSet<Vec<u8>>>>,
    live_transactions: TransactionRegistry,
}
unsafe impl Send for Tenant {}
unsafe impl Sync for Tenant {}

impl Drop for Tenant {
    fn drop(&mut self) {
        self.registry.lock().unwrap().remove(&self.name);
    }
}

impl TransactionSource for Tenant {
    fn create_trx(&self) -> FdbResult<Transaction> {
        Tenant::create_trx(self)
    }

    fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Tenant {
    pub(crate) fn new(
        database: NonNull<fdb_sys::FDBDatabase>,
        cancellation: CancellationToken,
        name: Vec<u8>,
        registry: Arc<Mutex<HashSet<Vec<u8>>>>,
    ) -> Self {
        Self {
            database,
            cancellation,
            name,
            registry,
            live_transactions: Arc::new(Mutex::new(std::collections::HashMap::new())),
        }
    }

    /// This tenant's name, as given to [`crate::Database::open_tenant`].
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Prefixes `key` with this tenant's namespace.
    pub fn pack_key(&self, key: &[u8]) -> Vec<u8> {
        let mut packed = Vec::with_capacity(self.name.len() + 1 + key.len());
        packed.extend_from_slice(&self.name);
        packed.push(0x00);
        packed.extend_from_slice(key);
        packed
    }

    /// Strips this tenant's namespace prefix from `key`, if present.
    pub fn unpack_key<'k>(&self, key: &'k [u8]) -> Option<&'k [u8]> {
        let prefix_len = self.name.len() + 1;
        if key.len() >= prefix_len
            && key[..self.name.len()] == self.name[..]
            && key[self.name.len()] == 0x00
        {
            Some(&key[prefix_len..])
        } else {
            None
        }
    }

    /// Creates a new transaction scoped to this tenant's owning database.
    ///
    /// Every operation on it must be addressed through [`Tenant::pack_key`]/[`Tenant::unpack_key`]
    /// by the caller, or via the higher-level wrappers in [`crate::tuple::Subspace`].
    pub fn create_trx(&self) -> FdbResult<Transaction> {
        let mut trx: *mut fdb_sys::FDBTransaction = std::ptr::null_mut();
        let err =
            unsafe { fdb_sys::fdb_database_create_transaction(self.database.as_ptr(), &mut trx) };
        error::eval(err)?;
        let id = next_transaction_id();
        let handle = NonNull::new(trx)
            .expect("fdb_database_create_transaction to not return null if there is no error");
        // Registered against this tenant's own live-transaction set rather than the database's,
        // so a transaction born of a `Tenant` is deregistered from the `Tenant` on drop, and
        // `Tenant::drop` (not `Database::cancel_all`) is what reaches it.
        self.live_transactions
            .lock()
            .unwrap()
            .insert(id, RawTrxHandle(handle));
        Ok(Transaction::new(
            id,
            handle,
            self.cancellation.clone(),
            self.live_transactions.clone(),
        ))
    }

    /// Equivalent of [`crate::Database::transact`], scoped to this tenant.
    pub async fn transact<F>(&self, f: F, options: TransactOption) -> Result<F::Item, F::Error>
    where
        F: crate::database::DatabaseTransact,
    {
        OperationContext::new(self, options).run(f).await
    }

    /// Equivalent of [`crate::Database::transact_boxed`], scoped to this tenant.
    pub fn transact_boxed<'trx, F, D, T, E>(
        &'trx self,
        data: D,
        f: F,
        options: TransactOption,
    ) -> impl Future<Output = Result<T, E>> + Send + 'trx
    where
        for<'a> F: FnMut(
            &'a Transaction,
            &'a mut D,
        ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
        E: TransactError,
        F: Send + 'trx,
        T: Send + 'trx,
        E: Send + 'trx,
        D: Send + 'trx,
    {
        self.transact(
            boxed::FnMutBoxed {
                f,
                d: data,
                m: PhantomData,
            },
            options,
        )
    }

    /// Equivalent of [`crate::Database::transact_boxed_local`], scoped to this tenant.
    pub fn transact_boxed_local<'trx, F, D, T, E>(
        &'trx self,
        data: D,
        f: F,
        options: TransactOption,
    ) -> impl Future<Output = Result<T, E>> + 'trx
    where
        for<'a> F:
            FnMut(&'a Transaction, &'a mut D) -> Pin<Box<dyn Future<Output = Result<T, E>> + 'a>>,
        E: TransactError,
        F: 'trx,
        T: 'trx,
        E: 'trx,
        D: 'trx,
    {
        self.transact(
            boxed_local::FnMutBoxedLocal {
                f,
                d: data,
                m: PhantomData,
            },
            options,
        )
    }
}
