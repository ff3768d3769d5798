// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Redis-backed key-value store for `nscache`.
//!
//! [`RedisStore`] implements [`KeyValueStore`](nscache_store::KeyValueStore) on top of a
//! [`redis::aio::ConnectionManager`]. Writes with a time-to-live use `PSETEX`, so a value
//! and its expiry land in one atomic command.
//!
//! # Examples
//!
//! ```no_run
//! use nscache_redis::{RedisConfig, RedisStore};
//! use nscache_store::KeyValueStore;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), nscache_store::Error> {
//! let config = RedisConfig::load()?;
//! let store = RedisStore::connect(&config).await?;
//!
//! store.set_with_ttl("app:greeting", b"hello".to_vec(), Duration::from_secs(60)).await?;
//! assert_eq!(store.get("app:greeting").await?, Some(b"hello".to_vec()));
//! # Ok(())
//! # }
//! ```

mod config;
mod store;

#[doc(inline)]
pub use config::RedisConfig;
#[doc(inline)]
pub use store::RedisStore;
