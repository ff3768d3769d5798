// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Namespaced read-through caching over a pluggable key-value store.
//!
//! A [`NamespacedCache`] scopes every key under a hierarchical [`Namespace`] and fills misses
//! from a caller-supplied computation:
//! - Values are encoded with a [`Codec`] ([`JsonCodec`] by default) and written with an expiry.
//! - Children derived with [`NamespacedCache::derive_child`] share the store but never see
//!   each other's keys.
//! - Any [`KeyValueStore`] works as a backend; see `nscache_memory` and `nscache_redis`.
//! - Concurrent misses can optionally be coalesced into one computation.
//! - Operations emit structured `tracing` events when logging is enabled, and count
//!   OpenTelemetry metrics when a meter is supplied.
//!
//! # Examples
//!
//! ## Read-through with namespaces
//!
//! ```
//! use nscache::NamespacedCache;
//! use nscache_memory::MemoryStore;
//! use std::{sync::Arc, time::Duration};
//! use tick::ClockControl;
//! # futures::executor::block_on(async {
//!
//! let control = ClockControl::new();
//! let store = Arc::new(MemoryStore::new(control.to_clock()));
//! let app = NamespacedCache::builder(store)
//!     .namespace("app")
//!     .default_ttl(Duration::from_secs(60))
//!     .build();
//! let tenant = app.derive_child("tenant-1");
//!
//! let plan: String = tenant.fetch_or_compute("plan", || async { "gold".to_owned() }).await?;
//! assert_eq!(plan, "gold");
//!
//! // The parent scope does not see the child's key.
//! let plan: String = app.fetch_or_compute("plan", || async { "none".to_owned() }).await?;
//! assert_eq!(plan, "none");
//!
//! // Once the TTL elapses the value is computed again.
//! control.advance(Duration::from_secs(60));
//! let plan: String = tenant.fetch_or_compute("plan", || async { "silver".to_owned() }).await?;
//! assert_eq!(plan, "silver");
//! # Ok::<(), nscache::Error>(())
//! # });
//! ```
//!
//! ## Loading settings
//!
//! ```no_run
//! use nscache::{CacheConfig, NamespacedCache};
//! use nscache_memory::MemoryStore;
//! use std::sync::Arc;
//! use tick::ClockControl;
//!
//! let config = CacheConfig::load_from("nscache.toml")?;
//! let store = Arc::new(MemoryStore::new(ClockControl::new().to_clock()));
//! let cache = NamespacedCache::from_config(store, &config);
//! # Ok::<(), nscache::Error>(())
//! ```

pub mod builder;
pub mod cache;
pub mod codec;
pub mod config;
mod flight;
pub mod namespace;
mod telemetry;

#[doc(inline)]
pub use builder::NamespacedCacheBuilder;
#[doc(inline)]
pub use cache::NamespacedCache;
#[cfg(feature = "bincode")]
#[doc(inline)]
pub use codec::BincodeCodec;
#[cfg(feature = "cbor")]
#[doc(inline)]
pub use codec::CborCodec;
#[doc(inline)]
pub use codec::{Codec, JsonCodec};
#[doc(inline)]
pub use config::CacheConfig;
#[doc(inline)]
pub use namespace::Namespace;
#[doc(inline)]
pub use nscache_store::{Error, ErrorKind, KeyValueStore, Result};
