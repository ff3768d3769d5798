// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic read-through caching.
//!
//! Demonstrates namespaced lookups, derived scopes and invalidation over the in-memory store,
//! with cache events printed to stdout.

use std::{sync::Arc, time::Duration};

use nscache::{CacheConfig, NamespacedCache};
use nscache_memory::MemoryStore;
use serde::{Deserialize, Serialize};
use tick::Clock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: u64,
    plan: String,
}

async fn load_account(id: u64) -> Account {
    // Stand-in for a slow database query.
    tokio::time::sleep(Duration::from_millis(20)).await;
    Account {
        id,
        plan: "gold".to_owned(),
    }
}

#[tokio::main]
async fn main() -> Result<(), nscache::Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let clock = Clock::new_tokio();
    let config = CacheConfig::load()?;
    let store = Arc::new(MemoryStore::new(clock.clone()));

    let cache = NamespacedCache::builder(store)
        .config(&config)
        .clock(clock)
        .enable_logs()
        .build();
    let accounts = cache.derive_child("accounts");

    // Miss: computed and stored under "<namespace>:accounts:7".
    let first = accounts.fetch_or_compute("7", || load_account(7)).await?;

    // Hit: served from the store.
    let second = accounts.fetch_or_compute("7", || load_account(7)).await?;
    assert_eq!(first.id, second.id);
    tracing::info!(account = ?second, "loaded account");

    // A short-lived entry for a single key.
    let _trial = accounts
        .fetch_or_compute_with_ttl("8", Duration::from_secs(5), || load_account(8))
        .await?;

    // Drop the entry so the next lookup recomputes it.
    accounts.invalidate("7").await?;
    let _third = accounts.fetch_or_compute("7", || load_account(7)).await?;

    Ok(())
}
