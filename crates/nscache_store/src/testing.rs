// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides `MockStore`, an in-memory store that records all
//! operations and supports failure injection for testing error paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{Error, KeyValueStore};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A get operation was performed with the given key.
    Get(String),
    /// A set operation was performed.
    Set {
        /// The key that was written.
        key: String,
        /// The bytes that were written.
        value: Vec<u8>,
    },
    /// An expire operation was performed.
    Expire {
        /// The key whose expiry was set.
        key: String,
        /// The requested time-to-live.
        ttl: Duration,
    },
    /// A delete operation was performed with the given key.
    Delete(String),
}

impl StoreOp {
    /// Returns the key this operation targeted.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(key) | Self::Delete(key) | Self::Set { key, .. } | Self::Expire { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone)]
struct MockEntry {
    value: Vec<u8>,
    ttl: Option<Duration>,
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// Values live in memory. Expiry is recorded but never enforced, so tests decide
/// when a key "expires" by calling [`evict`](Self::evict). Every operation is
/// recorded for later verification. Clones share the same data.
///
/// The store keeps the provided `set_with_ttl`, so writes show up as a `Set`
/// followed by an `Expire`.
///
/// # Examples
///
/// ```
/// use nscache_store::{KeyValueStore, testing::{MockStore, StoreOp}};
/// use std::time::Duration;
///
/// # futures::executor::block_on(async {
/// let store = MockStore::new();
///
/// store.set_with_ttl("app:k", b"v".to_vec(), Duration::from_secs(5)).await?;
/// assert_eq!(store.get("app:k").await?, Some(b"v".to_vec()));
///
/// assert_eq!(store.operations(), vec![
///     StoreOp::Set { key: "app:k".into(), value: b"v".to_vec() },
///     StoreOp::Expire { key: "app:k".into(), ttl: Duration::from_secs(5) },
///     StoreOp::Get("app:k".into()),
/// ]);
/// # Ok::<(), nscache_store::Error>(())
/// # });
/// ```
///
/// # Failure Injection
///
/// ```
/// use nscache_store::{KeyValueStore, testing::{MockStore, StoreOp}};
///
/// # futures::executor::block_on(async {
/// let store = MockStore::new();
///
/// store.fail_when(|op| matches!(op, StoreOp::Get(k) if k == "forbidden"));
/// assert!(store.get("forbidden").await.is_err());
/// assert!(store.get("allowed").await.is_ok());
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockStore {
    data: Arc<Mutex<HashMap<String, MockEntry>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock store with pre-populated values and no expiry.
    #[must_use]
    pub fn with_data<I, K>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        let data = data
            .into_iter()
            .map(|(key, value)| (key.into(), MockEntry { value, ttl: None }))
            .collect();
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Self::default()
        }
    }

    /// Returns the number of keys in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store holds the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the bytes stored under `key` without recording an operation.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Returns the expiry last applied to `key`, if any.
    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.data.lock().get(key).and_then(|entry| entry.ttl)
    }

    /// Removes `key` as if it had expired, without recording an operation.
    pub fn evict(&self, key: &str) {
        self.data.lock().remove(key);
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should fail.
    /// Failed operations are still recorded but do not touch the data.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) -> Result<(), Error> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let message = match &op {
            StoreOp::Get(_) => "mock: get failed",
            StoreOp::Set { .. } => "mock: set failed",
            StoreOp::Expire { .. } => "mock: expire failed",
            StoreOp::Delete(_) => "mock: delete failed",
        };
        self.operations.lock().push(op);
        if fail { Err(Error::store_unavailable(message)) } else { Ok(()) }
    }
}

impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.record(StoreOp::Get(key.to_owned()))?;
        Ok(self.value_of(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        self.record(StoreOp::Set {
            key: key.to_owned(),
            value: value.clone(),
        })?;
        self.data.lock().insert(key.to_owned(), MockEntry { value, ttl: None });
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), Error> {
        self.record(StoreOp::Expire { key: key.to_owned(), ttl })?;
        if let Some(entry) = self.data.lock().get_mut(key) {
            entry.ttl = Some(ttl);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.record(StoreOp::Delete(key.to_owned()))?;
        self.data.lock().remove(key);
        Ok(())
    }
}
