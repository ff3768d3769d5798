// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for key-value store backends.

use std::{sync::Arc, time::Duration};

use crate::Result;

/// A key-value store the cache reads from and writes to.
///
/// Keys and values are opaque: the store is not expected to understand namespacing
/// or the serialization format. Implementations must be safe to share between many
/// caches and tasks; the cache never locks around store calls.
///
/// The four required methods mirror the primitives of a typical remote store. Only
/// [`set_with_ttl`](Self::set_with_ttl) is provided, and backends with a native
/// atomic set-with-expiry should override it.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Stores `value` under `key` without an expiry, replacing any previous value.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Sets the expiry of an existing key. Expiring an absent key is not an error.
    fn expire(&self, key: &str, ttl: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Stores `value` under `key` and makes it expire after `ttl`.
    ///
    /// The provided implementation calls [`set`](Self::set) then [`expire`](Self::expire).
    /// These are two separate operations: if the process dies, or `expire` fails, between
    /// them, the value stays in the store with no expiry at all.
    fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.set(key, value).await?;
            self.expire(key, ttl).await
        }
    }
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        (**self).set(key, value)
    }

    fn expire(&self, key: &str, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).expire(key, ttl)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(key)
    }

    fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).set_with_ttl(key, value, ttl)
    }
}

impl<S> KeyValueStore for &S
where
    S: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        (**self).set(key, value)
    }

    fn expire(&self, key: &str, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).expire(key, ttl)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(key)
    }

    fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).set_with_ttl(key, value, ttl)
    }
}
