// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.

use tick::Clock;

use crate::store::MemoryStore;

/// Builder for configuring a [`MemoryStore`].
///
/// # Examples
///
/// ```
/// use nscache_memory::MemoryStore;
/// use tick::Clock;
///
/// let store = MemoryStore::builder(Clock::new_frozen())
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .build();
/// ```
#[derive(Debug)]
pub struct MemoryStoreBuilder {
    pub(crate) clock: Clock,
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
}

impl MemoryStoreBuilder {
    /// Creates a new builder for an unbounded store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            max_capacity: None,
            initial_capacity: None,
        }
    }

    /// Sets the maximum number of keys.
    ///
    /// Once the capacity is reached, moka evicts keys using its `TinyLFU` policy.
    /// If not set, the store is bounded only by available memory.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the number of keys to pre-allocate space for.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Builds the store.
    #[must_use]
    pub fn build(self) -> MemoryStore {
        MemoryStore::from_builder(self)
    }
}
