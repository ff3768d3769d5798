// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use moka::{future::Cache, ops::compute::Op};
use nscache_store::{Error, KeyValueStore};
use tick::Clock;

use crate::builder::MemoryStoreBuilder;

/// A stored value and the instant at which it stops being visible.
#[derive(Debug, Clone)]
struct Slot {
    bytes: Arc<[u8]>,
    deadline: Option<Instant>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// An in-process key-value store with per-key expiry.
///
/// Expiry is evaluated lazily against the store's [`Clock`]: a key read at or after its
/// deadline is reported absent and evicted. Clones share the same data.
///
/// Following the usual remote-store semantics, [`set`](KeyValueStore::set) clears any
/// previous deadline and [`expire`](KeyValueStore::expire) on an absent key does nothing.
///
/// # Examples
///
/// ```
/// use nscache_memory::MemoryStore;
/// use nscache_store::KeyValueStore;
/// use tick::Clock;
///
/// # futures::executor::block_on(async {
/// let store = MemoryStore::new(Clock::new_frozen());
///
/// store.set("key", b"value".to_vec()).await?;
/// assert_eq!(store.get("key").await?, Some(b"value".to_vec()));
/// # Ok::<(), nscache_store::Error>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Cache<String, Slot>,
    clock: Clock,
}

impl MemoryStore {
    /// Creates a new unbounded store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::builder(clock).build()
    }

    /// Creates a builder for configuring a store.
    #[must_use]
    pub fn builder(clock: Clock) -> MemoryStoreBuilder {
        MemoryStoreBuilder::new(clock)
    }

    pub(crate) fn from_builder(builder: MemoryStoreBuilder) -> Self {
        let mut cache = Cache::<String, Slot>::builder();
        if let Some(capacity) = builder.max_capacity {
            cache = cache.max_capacity(capacity);
        }
        if let Some(capacity) = builder.initial_capacity {
            cache = cache.initial_capacity(capacity);
        }
        Self {
            inner: cache.build(),
            clock: builder.clock,
        }
    }

    /// Returns the clock used to evaluate expiry.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns the approximate number of keys, including expired keys not yet evicted.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Returns `true` if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies pending evictions so that [`len`](Self::len) is up to date.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    fn deadline(&self, ttl: Duration) -> Option<Instant> {
        self.clock.instant().checked_add(ttl)
    }

    async fn evict_if_expired(&self, key: &str) {
        let now = self.clock.instant();
        let _ = self
            .inner
            .entry_by_ref(key)
            .and_compute_with(|entry| async move {
                match entry {
                    Some(entry) if entry.value().is_expired(now) => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let Some(slot) = self.inner.get(key).await else {
            return Ok(None);
        };

        if slot.is_expired(self.clock.instant()) {
            self.evict_if_expired(key).await;
            return Ok(None);
        }

        Ok(Some(slot.bytes.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        let slot = Slot {
            bytes: value.into(),
            deadline: None,
        };
        self.inner.insert(key.to_owned(), slot).await;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), Error> {
        let now = self.clock.instant();
        let deadline = self.deadline(ttl);
        let _ = self
            .inner
            .entry_by_ref(key)
            .and_compute_with(|entry| async move {
                match entry {
                    Some(entry) if entry.value().is_expired(now) => Op::Remove,
                    Some(entry) => Op::Put(Slot {
                        deadline,
                        ..entry.into_value()
                    }),
                    None => Op::Nop,
                }
            })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        let slot = Slot {
            bytes: value.into(),
            deadline: self.deadline(ttl),
        };
        self.inner.insert(key.to_owned(), slot).await;
        Ok(())
    }
}
