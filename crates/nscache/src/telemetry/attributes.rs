// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Attribute names shared by `cache.event` log fields and metric data points.

pub(crate) const CACHE_NAMESPACE: &str = "cache.namespace";

pub(crate) const CACHE_OPERATION: &str = "cache.operation";

pub(crate) const CACHE_ACTIVITY: &str = "cache.activity";

// Log-only fields, spelled out in the `tracing` macros of the parent module.

#[cfg(all(test, feature = "logs"))]
pub(crate) const CACHE_EVENT: &str = "cache.event";

#[cfg(all(test, feature = "logs"))]
pub(crate) const CACHE_KEY: &str = "cache.key";

#[cfg(all(test, feature = "logs"))]
pub(crate) const CACHE_DURATION: &str = "cache.duration_ns";

#[cfg(all(test, feature = "logs"))]
pub(crate) const CACHE_ERROR: &str = "cache.error";
