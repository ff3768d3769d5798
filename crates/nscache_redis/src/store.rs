// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`KeyValueStore`] over a Redis connection manager.

use std::{fmt, time::Duration};

use nscache_store::{Error, KeyValueStore};
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use crate::RedisConfig;

/// A [`KeyValueStore`] backed by a Redis server.
///
/// Cloning is cheap and clones share the underlying connection manager, which reconnects
/// on its own after a failure. Every failed command surfaces as
/// [`ErrorKind::StoreUnavailable`](nscache_store::ErrorKind::StoreUnavailable) with the
/// redis error as its cause; the store does not retry.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects to the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfig`](nscache_store::ErrorKind::InvalidConfig) if the URL
    /// cannot be parsed and [`ErrorKind::StoreUnavailable`](nscache_store::ErrorKind::StoreUnavailable)
    /// if the server cannot be reached.
    pub async fn connect(config: &RedisConfig) -> Result<Self, Error> {
        let client = Client::open(config.url.as_str()).map_err(Error::invalid_config)?;
        let address = client.get_connection_info().addr.to_string();

        let connection = client.get_connection_manager().await.map_err(|e| {
            tracing::error!(redis.address = %address, error = %e, "failed to connect to redis");
            Error::store_unavailable(e)
        })?;

        tracing::info!(redis.address = %address, "connected to redis");
        Ok(Self::from_connection(connection))
    }

    /// Wraps an existing connection manager.
    #[must_use]
    pub fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

/// Converts a TTL to whole milliseconds, rounding sub-millisecond remainders up.
fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

fn ttl_millis_signed(ttl: Duration) -> i64 {
    i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX)
}

impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.connection()
            .get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(Error::store_unavailable)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        self.connection()
            .set::<_, _, ()>(key, value)
            .await
            .map_err(Error::store_unavailable)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), Error> {
        self.connection()
            .pexpire::<_, ()>(key, ttl_millis_signed(ttl))
            .await
            .map_err(Error::store_unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.connection()
            .del::<_, ()>(key)
            .await
            .map_err(Error::store_unavailable)
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        // PSETEX rejects a zero expiry; a value that expires immediately is simply not stored.
        if ttl.is_zero() {
            return self.delete(key).await;
        }

        self.connection()
            .pset_ex::<_, _, ()>(key, value, ttl_millis(ttl))
            .await
            .map_err(Error::store_unavailable)
    }
}
