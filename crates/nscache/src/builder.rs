// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`NamespacedCache`].

use std::{sync::Arc, time::Duration};

use nscache_store::KeyValueStore;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};
use tick::{Clock, runtime::InactiveClock};

use crate::{
    NamespacedCache,
    codec::{Codec, JsonCodec},
    config::{CacheConfig, DEFAULT_TTL_SECS},
    flight::FlightGroup,
    namespace::Namespace,
    telemetry::CacheTelemetry,
};
#[cfg(any(feature = "metrics", test))]
use crate::telemetry::{CacheMetrics, metrics::create_meter};

/// Builder for a root [`NamespacedCache`].
///
/// Created by [`NamespacedCache::builder`]. Every setting has a default, so
/// `NamespacedCache::builder(store).build()` is equivalent to [`NamespacedCache::new`].
///
/// # Examples
///
/// ```
/// use nscache::{BincodeCodec, NamespacedCache};
/// use nscache_memory::MemoryStore;
/// use std::{sync::Arc, time::Duration};
/// use tick::ClockControl;
///
/// let clock = ClockControl::new().to_clock();
/// let store = Arc::new(MemoryStore::new(clock.clone()));
///
/// let cache = NamespacedCache::builder(store)
///     .namespace("billing")
///     .default_ttl(Duration::from_secs(300))
///     .codec(BincodeCodec)
///     .clock(clock)
///     .coalesce_misses(true)
///     .build();
///
/// assert_eq!(cache.namespace().as_str(), "billing");
/// ```
#[derive(Debug)]
#[must_use]
pub struct NamespacedCacheBuilder<S, C = JsonCodec> {
    store: Arc<S>,
    namespace: Namespace,
    default_ttl: Duration,
    codec: C,
    clock: Option<Clock>,
    #[cfg(feature = "logs")]
    logs: bool,
    #[cfg(any(feature = "metrics", test))]
    metrics: Option<CacheMetrics>,
    coalesce: bool,
}

impl<S> NamespacedCacheBuilder<S, JsonCodec>
where
    S: KeyValueStore,
{
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self {
            store,
            namespace: Namespace::default(),
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            codec: JsonCodec,
            clock: None,
            #[cfg(feature = "logs")]
            logs: false,
            #[cfg(any(feature = "metrics", test))]
            metrics: None,
            coalesce: false,
        }
    }
}

impl<S, C> NamespacedCacheBuilder<S, C>
where
    S: KeyValueStore,
    C: Codec,
{
    /// Sets the root namespace. Defaults to `"nscache"`.
    pub fn namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the expiry used when a call does not pass one. Defaults to one hour.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Applies the namespace and TTL from a loaded [`CacheConfig`].
    pub fn config(self, config: &CacheConfig) -> Self {
        self.namespace(config.namespace.as_str()).default_ttl(config.ttl_duration())
    }

    /// Replaces the codec. Defaults to [`JsonCodec`].
    pub fn codec<C2>(self, codec: C2) -> NamespacedCacheBuilder<S, C2>
    where
        C2: Codec,
    {
        NamespacedCacheBuilder {
            store: self.store,
            namespace: self.namespace,
            default_ttl: self.default_ttl,
            codec,
            clock: self.clock,
            #[cfg(feature = "logs")]
            logs: self.logs,
            #[cfg(any(feature = "metrics", test))]
            metrics: self.metrics,
            coalesce: self.coalesce,
        }
    }

    /// Sets the clock used to time operations for telemetry.
    ///
    /// Defaults to the system clock.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Emits a `tracing` event for every cache operation.
    #[cfg(feature = "logs")]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    pub fn enable_logs(mut self) -> Self {
        self.logs = true;
        self
    }

    /// Counts cache events on `meter`.
    ///
    /// Every hit, miss, store, coalesced wait, invalidation and error adds one to
    /// `cache.event.count`, and its duration is recorded on `cache.operation.duration`.
    /// Data points are tagged with `cache.namespace`, `cache.operation` and `cache.activity`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn meter(mut self, meter: &Meter) -> Self {
        self.metrics = Some(CacheMetrics::new(meter));
        self
    }

    /// Like [`meter`](Self::meter), using an `nscache` meter from `meter_provider`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn meter_provider(self, meter_provider: &dyn MeterProvider) -> Self {
        self.meter(&create_meter(meter_provider))
    }

    /// Coalesces concurrent lookups of the same key.
    ///
    /// When enabled, callers that miss on a key while another caller is already looking it
    /// up wait for that lookup instead of running their own computation. The flight group is
    /// shared with every cache derived from the one being built. Off by default.
    pub fn coalesce_misses(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    /// Builds the cache. No store I/O is performed.
    pub fn build(self) -> NamespacedCache<S, C> {
        let clock = self.clock.unwrap_or_else(|| InactiveClock::default().activate().0);
        let telemetry = CacheTelemetry::new(clock);
        #[cfg(feature = "logs")]
        let telemetry = telemetry.with_logs(self.logs);
        #[cfg(any(feature = "metrics", test))]
        let telemetry = telemetry.with_metrics(self.metrics);

        NamespacedCache::from_parts(
            self.namespace,
            self.store,
            self.default_ttl,
            self.codec,
            telemetry,
            self.coalesce.then(|| Arc::new(FlightGroup::new())),
        )
    }
}
