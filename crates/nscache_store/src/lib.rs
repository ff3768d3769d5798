// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storage contract for the `nscache` read-through cache.
//!
//! This crate defines the [`KeyValueStore`] trait that every backing store must satisfy,
//! along with the [`Error`] type shared by every crate in the `nscache` family.
//!
//! # Overview
//!
//! The store is deliberately dumb: it maps opaque string keys to opaque byte values and
//! knows how to expire and delete them. Namespacing, serialization and the read-through
//! protocol live in `nscache`, on top of this trait.
//!
//! # Implementing a Store
//!
//! Implement the four required methods of [`KeyValueStore`]:
//!
//! ```
//! use nscache_store::{Error, KeyValueStore};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//! use std::time::Duration;
//!
//! struct SimpleStore(RwLock<HashMap<String, Vec<u8>>>);
//!
//! impl KeyValueStore for SimpleStore {
//!     async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), value);
//!         Ok(())
//!     }
//!
//!     async fn expire(&self, _key: &str, _ttl: Duration) -> Result<(), Error> {
//!         // This store never forgets anything.
//!         Ok(())
//!     }
//!
//!     async fn delete(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Testing
//!
//! Enable the `test-util` feature for [`testing::MockStore`], which records every
//! operation and supports failure injection.

pub mod error;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use store::KeyValueStore;
