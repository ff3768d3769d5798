// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! OpenTelemetry instruments for cache events.

use std::time::Duration;

use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter, MeterProvider},
};

use crate::{
    namespace::Namespace,
    telemetry::{CacheActivity, CacheOperation, attributes},
};

const METER_NAME: &str = "nscache";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
pub(crate) const CACHE_EVENT_COUNT_NAME: &str = "cache.event.count";
pub(crate) const CACHE_OPERATION_DURATION_NAME: &str = "cache.operation.duration";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

/// Event counter and duration histogram for one meter.
///
/// Data points carry the namespace, operation and activity. Keys are left out to keep the
/// attribute cardinality bounded.
#[derive(Clone, Debug)]
pub(crate) struct CacheMetrics {
    events: Counter<u64>,
    duration: Histogram<f64>,
}

impl CacheMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            events: meter
                .u64_counter(CACHE_EVENT_COUNT_NAME)
                .with_description("Cache events")
                .with_unit("{event}")
                .build(),
            duration: meter
                .f64_histogram(CACHE_OPERATION_DURATION_NAME)
                .with_description("Cache operation duration")
                .with_unit("s")
                .build(),
        }
    }

    pub fn record(&self, namespace: &Namespace, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let attrs = [
            KeyValue::new(attributes::CACHE_NAMESPACE, namespace.as_str().to_owned()),
            KeyValue::new(attributes::CACHE_OPERATION, operation.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY, activity.as_str()),
        ];

        self.events.add(1, &attrs);
        if let Some(duration) = duration {
            self.duration.record(duration.as_secs_f64(), &attrs);
        }
    }
}
