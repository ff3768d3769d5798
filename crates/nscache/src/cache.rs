// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The namespaced read-through cache.

use std::{convert::Infallible, fmt, sync::Arc, time::Duration};

use nscache_store::KeyValueStore;
use serde::{Serialize, de::DeserializeOwned};
use tick::Stopwatch;

use crate::{
    Error, Result,
    builder::NamespacedCacheBuilder,
    codec::{Codec, JsonCodec},
    config::CacheConfig,
    flight::FlightGroup,
    namespace::Namespace,
    telemetry::{CacheActivity, CacheOperation, CacheTelemetry},
};

/// A read-through cache that scopes every key under a namespace.
///
/// Each logical key `k` is stored under `namespace:k`. Values are computed on a miss,
/// encoded with the cache's [`Codec`] and written with an expiry; later lookups decode the
/// stored bytes without running the computation again.
///
/// The cache holds no per-key state. Everything durable lives in the store, which is shared
/// by every cache derived from the same root. Deriving a child with
/// [`derive_child`](Self::derive_child) is cheap and never touches the parent.
///
/// # Concurrency
///
/// By default concurrent misses on the same key are not deduplicated: each caller runs its
/// own computation and writes its own result, and the store's last write wins. Build the
/// cache with [`coalesce_misses(true)`](NamespacedCacheBuilder::coalesce_misses) to have
/// concurrent callers share one lookup instead.
///
/// # Examples
///
/// ```
/// use nscache::NamespacedCache;
/// use nscache_memory::MemoryStore;
/// use std::sync::Arc;
/// use tick::ClockControl;
///
/// # futures::executor::block_on(async {
/// let store = Arc::new(MemoryStore::new(ClockControl::new().to_clock()));
/// let cache = NamespacedCache::builder(store).namespace("app").build();
///
/// let name: String = cache.fetch_or_compute("user:42", || async { "Ann".to_owned() }).await?;
/// assert_eq!(name, "Ann");
///
/// // Served from the store; the computation is not run.
/// let name: String = cache.fetch_or_compute("user:42", || async { "Bob".to_owned() }).await?;
/// assert_eq!(name, "Ann");
/// # Ok::<(), nscache::Error>(())
/// # });
/// ```
pub struct NamespacedCache<S, C = JsonCodec> {
    namespace: Namespace,
    store: Arc<S>,
    default_ttl: Duration,
    codec: C,
    telemetry: CacheTelemetry,
    flights: Option<Arc<FlightGroup>>,
}

impl<S> NamespacedCache<S, JsonCodec>
where
    S: KeyValueStore,
{
    /// Creates a cache with the default namespace (`"nscache"`), a one hour TTL and the JSON
    /// codec.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::builder(store).build()
    }

    /// Starts building a cache over `store`.
    pub fn builder(store: Arc<S>) -> NamespacedCacheBuilder<S> {
        NamespacedCacheBuilder::new(store)
    }

    /// Creates a cache using the namespace and TTL of a loaded [`CacheConfig`].
    #[must_use]
    pub fn from_config(store: Arc<S>, config: &CacheConfig) -> Self {
        Self::builder(store).config(config).build()
    }
}

impl<S, C> NamespacedCache<S, C>
where
    S: KeyValueStore,
    C: Codec,
{
    pub(crate) fn from_parts(
        namespace: Namespace,
        store: Arc<S>,
        default_ttl: Duration,
        codec: C,
        telemetry: CacheTelemetry,
        flights: Option<Arc<FlightGroup>>,
    ) -> Self {
        Self {
            namespace,
            store,
            default_ttl,
            codec,
            telemetry,
            flights,
        }
    }

    /// Returns the namespace keys are stored under.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the expiry applied when a call does not pass one.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the codec used for stored values.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the store key for `key`, i.e. `namespace:key`.
    #[must_use]
    pub fn full_key(&self, key: &str) -> String {
        self.namespace.qualify(key)
    }

    /// Returns a cache scoped one level below this one.
    ///
    /// The child's namespace is `self.namespace() + ":" + segment`. It shares the store,
    /// codec, default TTL, telemetry settings and miss coalescing with this cache. The segment
    /// is used verbatim; a segment containing `':'` yields the same keys as the equivalent
    /// chain of single-segment children.
    ///
    /// # Examples
    ///
    /// ```
    /// use nscache::NamespacedCache;
    /// use nscache_store::testing::MockStore;
    /// use std::sync::Arc;
    ///
    /// let base = NamespacedCache::builder(Arc::new(MockStore::new())).namespace("base").build();
    /// let tenant = base.derive_child("tenant-7").derive_child("orders");
    ///
    /// assert_eq!(tenant.full_key("17"), "base:tenant-7:orders:17");
    /// assert_eq!(base.namespace().as_str(), "base");
    /// ```
    #[must_use]
    pub fn derive_child(&self, segment: &str) -> Self {
        Self {
            namespace: self.namespace.child(segment),
            ..self.clone()
        }
    }

    /// Same as [`derive_child`](Self::derive_child).
    #[must_use]
    pub fn with_namespace(&self, segment: &str) -> Self {
        self.derive_child(segment)
    }

    /// Returns the value cached under `key`, computing and storing it on a miss.
    ///
    /// On a hit the stored bytes are decoded and `compute` is not called. On a miss `compute`
    /// runs exactly once, its value is encoded and written with the default TTL, and the value
    /// is returned.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable) if reading or
    ///   writing the store fails.
    /// - [`ErrorKind::Decode`](crate::ErrorKind::Decode) if the stored bytes cannot be decoded
    ///   into `V`. The entry is left in place and `compute` is not called.
    /// - [`ErrorKind::Encode`](crate::ErrorKind::Encode) if the computed value cannot be
    ///   encoded. Nothing is written.
    pub async fn fetch_or_compute<V, F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        self.fetch_or_compute_with_ttl(key, self.default_ttl, compute).await
    }

    /// Like [`fetch_or_compute`](Self::fetch_or_compute), with an explicit expiry for a
    /// computed value.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_or_compute`](Self::fetch_or_compute).
    pub async fn fetch_or_compute_with_ttl<V, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        self.try_fetch_or_compute_with_ttl(key, ttl, move || async move { Ok::<_, Infallible>(compute().await) })
            .await
    }

    /// Like [`fetch_or_compute`](Self::fetch_or_compute), for computations that can fail.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`fetch_or_compute`](Self::fetch_or_compute), returns an
    /// [`ErrorKind::Compute`](crate::ErrorKind::Compute) error whose source is the error
    /// returned by `compute`. Nothing is written, so the next call computes again.
    pub async fn try_fetch_or_compute<V, E, F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        self.try_fetch_or_compute_with_ttl(key, self.default_ttl, compute).await
    }

    /// Like [`try_fetch_or_compute`](Self::try_fetch_or_compute), with an explicit expiry for
    /// a computed value.
    ///
    /// # Errors
    ///
    /// Same as [`try_fetch_or_compute`](Self::try_fetch_or_compute).
    pub async fn try_fetch_or_compute_with_ttl<V, E, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let full_key = self.full_key(key);
        let stopwatch = self.telemetry.clock().stopwatch();

        let result = match &self.flights {
            None => self.resolve(key, &full_key, ttl, compute, &stopwatch).await,
            Some(flights) => {
                let mut hit = false;
                let flight = flights
                    .run(&full_key, self.resolve_encoded(key, &full_key, ttl, compute, &stopwatch, &mut hit))
                    .await;
                let value = flight.result.and_then(|bytes| self.codec.decode(&bytes));

                let activity = match (flight.led, hit) {
                    (false, _) => Some(CacheActivity::Coalesced),
                    (true, true) => Some(CacheActivity::Hit),
                    (true, false) => None,
                };
                if let (Ok(_), Some(activity)) = (&value, activity) {
                    self.record(key, CacheOperation::Fetch, activity, &stopwatch);
                }
                value
            }
        };

        if let Err(error) = &result {
            self.telemetry
                .record_error(&self.namespace, key, CacheOperation::Fetch, error, Some(stopwatch.elapsed()));
        }
        result
    }

    /// Removes the value cached under `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::StoreUnavailable`](crate::ErrorKind::StoreUnavailable) error if
    /// the store fails to delete the key.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        let stopwatch = self.telemetry.clock().stopwatch();
        match self.store.delete(&self.full_key(key)).await {
            Ok(()) => {
                self.record(key, CacheOperation::Invalidate, CacheActivity::Invalidated, &stopwatch);
                Ok(())
            }
            Err(error) => {
                self.telemetry.record_error(
                    &self.namespace,
                    key,
                    CacheOperation::Invalidate,
                    &error,
                    Some(stopwatch.elapsed()),
                );
                Err(error)
            }
        }
    }

    async fn resolve<V, E, F, Fut>(&self, key: &str, full_key: &str, ttl: Duration, compute: F, stopwatch: &Stopwatch) -> Result<V>
    where
        V: Serialize + DeserializeOwned,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(bytes) = self.store.get(full_key).await? {
            let value = self.codec.decode(&bytes)?;
            self.record(key, CacheOperation::Fetch, CacheActivity::Hit, stopwatch);
            return Ok(value);
        }

        self.record(key, CacheOperation::Fetch, CacheActivity::Miss, stopwatch);
        let value = compute().await.map_err(Error::compute)?;
        let bytes = self.codec.encode(&value)?;
        self.store.set_with_ttl(full_key, bytes, ttl).await?;
        self.record(key, CacheOperation::Fetch, CacheActivity::Stored, stopwatch);
        Ok(value)
    }

    /// Same steps as [`resolve`](Self::resolve), yielding the bytes so coalesced callers can
    /// decode them into their own value type.
    ///
    /// A hit is not recorded here; `hit` is set instead so the caller records it once the
    /// bytes decode.
    async fn resolve_encoded<V, E, F, Fut>(
        &self,
        key: &str,
        full_key: &str,
        ttl: Duration,
        compute: F,
        stopwatch: &Stopwatch,
        hit: &mut bool,
    ) -> Result<Vec<u8>>
    where
        V: Serialize,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(bytes) = self.store.get(full_key).await? {
            *hit = true;
            return Ok(bytes);
        }

        self.record(key, CacheOperation::Fetch, CacheActivity::Miss, stopwatch);
        let value = compute().await.map_err(Error::compute)?;
        let bytes = self.codec.encode(&value)?;
        self.store.set_with_ttl(full_key, bytes.clone(), ttl).await?;
        self.record(key, CacheOperation::Fetch, CacheActivity::Stored, stopwatch);
        Ok(bytes)
    }

    fn record(&self, key: &str, operation: CacheOperation, activity: CacheActivity, stopwatch: &Stopwatch) {
        self.telemetry
            .record(&self.namespace, key, operation, activity, Some(stopwatch.elapsed()));
    }
}

impl<S, C> Clone for NamespacedCache<S, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            store: Arc::clone(&self.store),
            default_ttl: self.default_ttl,
            codec: self.codec.clone(),
            telemetry: self.telemetry.clone(),
            flights: self.flights.clone(),
        }
    }
}

impl<S, C> fmt::Debug for NamespacedCache<S, C>
where
    C: Codec,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("namespace", &self.namespace.as_str())
            .field("default_ttl", &self.default_ttl)
            .field("codec", &self.codec.name())
            .field("coalesce_misses", &self.flights.is_some())
            .finish_non_exhaustive()
    }
}
