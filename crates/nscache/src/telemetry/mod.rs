// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Logs and metrics for cache operations.
//!
//! When the `logs` feature is compiled in and a cache is built with
//! [`enable_logs`](crate::NamespacedCacheBuilder::enable_logs), every operation emits one
//! `tracing` event named `cache.event`. The event level follows the activity: lookups at
//! debug, writes and invalidations at info, failures at error.
//!
//! With the `metrics` feature, a cache given a meter counts the same events on
//! `cache.event.count` and records their durations on `cache.operation.duration`.

use std::time::Duration;

use tick::Clock;

use crate::{Error, namespace::Namespace};

#[cfg(any(feature = "metrics", test))]
pub(crate) use metrics::CacheMetrics;

#[cfg(any(feature = "metrics", test))]
pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Fetch,
    Invalidate,
}

impl CacheOperation {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "only read when events are emitted")
    )]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "cache.fetch",
            Self::Invalidate => "cache.invalidate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Stored,
    Coalesced,
    Invalidated,
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "only constructed when events are emitted")
    )]
    Error,
}

impl CacheActivity {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "only read when events are emitted")
    )]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Stored => "cache.stored",
            Self::Coalesced => "cache.coalesced",
            Self::Invalidated => "cache.invalidated",
            Self::Error => "cache.error",
        }
    }

    #[cfg(feature = "logs")]
    fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Coalesced => Severity::Debug,
            Self::Stored | Self::Invalidated => Severity::Info,
            Self::Error => Severity::Error,
        }
    }
}

#[cfg(feature = "logs")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Debug,
    Info,
    Error,
}

/// Emits cache events and owns the clock used to time them.
#[derive(Clone, Debug)]
pub(crate) struct CacheTelemetry {
    clock: Clock,
    #[cfg(feature = "logs")]
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    metrics: Option<CacheMetrics>,
}

impl CacheTelemetry {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            #[cfg(feature = "logs")]
            logging_enabled: false,
            #[cfg(any(feature = "metrics", test))]
            metrics: None,
        }
    }

    #[cfg(feature = "logs")]
    #[must_use]
    pub fn with_logs(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_metrics(mut self, metrics: Option<CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Records a completed step of an operation on `key`.
    #[inline]
    #[cfg_attr(not(feature = "logs"), expect(unused_variables, reason = "keys only appear in log events"))]
    pub fn record(&self, namespace: &Namespace, key: &str, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(metrics) = &self.metrics {
            metrics.record(namespace, operation, activity, duration);
        }

        #[cfg(feature = "logs")]
        if self.logging_enabled {
            Self::emit(namespace, key, operation, activity, duration);
        }
    }

    /// Records a failed operation on `key`.
    #[inline]
    #[cfg_attr(not(feature = "logs"), expect(unused_variables, reason = "keys and errors only appear in log events"))]
    pub fn record_error(&self, namespace: &Namespace, key: &str, operation: CacheOperation, error: &Error, duration: Option<Duration>) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(metrics) = &self.metrics {
            metrics.record(namespace, operation, CacheActivity::Error, duration);
        }

        #[cfg(feature = "logs")]
        if self.logging_enabled {
            tracing::error!(
                cache.namespace = namespace.as_str(),
                cache.key = key,
                cache.operation = operation.as_str(),
                cache.activity = CacheActivity::Error.as_str(),
                cache.duration_ns = ?duration.map(|d| d.as_nanos()),
                cache.error = %error,
                "cache.event"
            );
        }
    }

    #[cfg(feature = "logs")]
    fn emit(namespace: &Namespace, key: &str, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let namespace = namespace.as_str();
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Field names must match attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.namespace = namespace,
                    cache.key = key,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
        }
    }
}

#[cfg(all(test, feature = "logs"))]
mod tests {
    use super::*;
    use crate::telemetry::testing::LogCapture;

    fn telemetry(enabled: bool) -> CacheTelemetry {
        CacheTelemetry::new(Clock::new_frozen()).with_logs(enabled)
    }

    #[test]
    fn emit_contains_all_fields_and_values() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        CacheTelemetry::emit(
            &Namespace::new("app:users"),
            "42",
            CacheOperation::Fetch,
            CacheActivity::Stored,
            Some(Duration::from_nanos(12345)),
        );

        for field in [
            attributes::CACHE_NAMESPACE,
            attributes::CACHE_KEY,
            attributes::CACHE_OPERATION,
            attributes::CACHE_ACTIVITY,
            attributes::CACHE_DURATION,
            attributes::CACHE_EVENT,
        ] {
            capture.assert_contains(field);
        }
        capture.assert_contains("app:users");
        capture.assert_contains(CacheOperation::Fetch.as_str());
        capture.assert_contains(CacheActivity::Stored.as_str());
        capture.assert_contains("12345");
    }

    #[test]
    fn emit_uses_activity_severity() {
        let cases = [
            (CacheActivity::Hit, "DEBUG"),
            (CacheActivity::Miss, "DEBUG"),
            (CacheActivity::Coalesced, "DEBUG"),
            (CacheActivity::Stored, "INFO"),
            (CacheActivity::Invalidated, "INFO"),
            (CacheActivity::Error, "ERROR"),
        ];

        for (activity, level) in cases {
            let capture = LogCapture::new();
            let _guard = tracing::subscriber::set_default(capture.subscriber());
            CacheTelemetry::emit(&Namespace::default(), "k", CacheOperation::Fetch, activity, None);
            capture.assert_contains(level);
        }
    }

    #[test]
    fn record_error_includes_error_text() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let error = Error::store_unavailable("connection reset");
        telemetry(true).record_error(&Namespace::default(), "k", CacheOperation::Invalidate, &error, None);

        capture.assert_contains("ERROR");
        capture.assert_contains(attributes::CACHE_ERROR);
        capture.assert_contains("connection reset");
        capture.assert_contains(CacheOperation::Invalidate.as_str());
    }

    #[test]
    fn disabled_telemetry_emits_nothing() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = telemetry(false);
        telemetry.record(&Namespace::default(), "k", CacheOperation::Fetch, CacheActivity::Hit, None);
        telemetry.record_error(
            &Namespace::default(),
            "k",
            CacheOperation::Fetch,
            &Error::decode("bad bytes"),
            None,
        );

        assert!(capture.output().is_empty());
    }
}
