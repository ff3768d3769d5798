// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coalescing of concurrent lookups for the same store key.

use std::{collections::HashMap, fmt, sync::Arc};

use async_once_cell::OnceCell;
use parking_lot::Mutex;

use crate::Result;

type Slot = Arc<OnceCell<Result<Vec<u8>>>>;

/// Shares one in-flight lookup per key between concurrent callers.
///
/// The first caller for a key becomes the leader and drives its future; callers that arrive
/// while it runs wait for the leader's result instead of running their own. If the leader is
/// dropped or panics before finishing, one of the waiters drives its own future in its place.
/// A slot is removed once its result is available or once every caller waiting on it is
/// gone, so later callers start a fresh lookup.
///
/// Results are encoded bytes rather than values, which lets callers that expect different
/// value types share a flight.
#[derive(Default)]
pub(crate) struct FlightGroup {
    slots: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    slot: Slot,
    callers: usize,
}

/// Result of [`FlightGroup::run`].
#[derive(Debug)]
pub(crate) struct Flight {
    pub result: Result<Vec<u8>>,
    /// `true` if this caller's own future produced the result.
    pub led: bool,
}

impl FlightGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` for `key` unless another caller is already doing so, and returns the
    /// shared result.
    pub async fn run<F>(&self, key: &str, work: F) -> Flight
    where
        F: Future<Output = Result<Vec<u8>>>,
    {
        let caller = Caller::join(self, key);

        let mut led = false;
        let result = caller
            .slot
            .get_or_init(async {
                led = true;
                work.await
            })
            .await
            .clone();

        Flight { result, led }
    }

    /// Number of keys with a lookup in flight.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// One caller's membership in a slot. Leaving, by completion or cancellation, releases the
/// slot once it has a result or no callers remain.
struct Caller<'a> {
    group: &'a FlightGroup,
    key: &'a str,
    slot: Slot,
}

impl<'a> Caller<'a> {
    fn join(group: &'a FlightGroup, key: &'a str) -> Self {
        let mut slots = group.slots.lock();
        let entry = slots.entry(key.to_owned()).or_insert_with(|| Entry {
            slot: Arc::new(OnceCell::new()),
            callers: 0,
        });
        entry.callers += 1;
        let slot = Arc::clone(&entry.slot);
        drop(slots);

        Self { group, key, slot }
    }
}

impl Drop for Caller<'_> {
    fn drop(&mut self) {
        let mut slots = self.group.slots.lock();
        let Some(entry) = slots.get_mut(self.key) else {
            return;
        };
        // A newer slot for the same key belongs to a later flight.
        if !Arc::ptr_eq(&entry.slot, &self.slot) {
            return;
        }

        entry.callers -= 1;
        if entry.callers == 0 || self.slot.get().is_some() {
            slots.remove(self.key);
        }
    }
}

impl fmt::Debug for FlightGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightGroup").field("in_flight", &self.slots.lock().len()).finish()
    }
}
