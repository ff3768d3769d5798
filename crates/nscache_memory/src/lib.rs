// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process key-value store backed by moka.
//!
//! This crate provides [`MemoryStore`], a concurrent [`KeyValueStore`](nscache_store::KeyValueStore)
//! that honors per-key expiry against an injected [`tick::Clock`]. Use [`MemoryStoreBuilder`]
//! to bound capacity without exposing moka types.
//!
//! # Quick Start
//!
//! ```
//! use nscache_memory::MemoryStore;
//! use nscache_store::KeyValueStore;
//! use std::time::Duration;
//! use tick::ClockControl;
//!
//! # futures::executor::block_on(async {
//! let control = ClockControl::new();
//! let store = MemoryStore::builder(control.to_clock()).max_capacity(1000).build();
//!
//! store.set_with_ttl("app:key", b"42".to_vec(), Duration::from_secs(1)).await?;
//! assert_eq!(store.get("app:key").await?, Some(b"42".to_vec()));
//!
//! control.advance(Duration::from_secs(1));
//! assert_eq!(store.get("app:key").await?, None);
//! # Ok::<(), nscache_store::Error>(())
//! # });
//! ```

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::MemoryStoreBuilder;
#[doc(inline)]
pub use store::MemoryStore;
