// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `MemoryStore`.

use std::time::Duration;

use futures::executor::block_on;
use nscache_memory::MemoryStore;
use nscache_store::{Error, KeyValueStore};
use tick::{Clock, ClockControl};

type TestResult = Result<(), Error>;

#[test]
fn get_missing_returns_none() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        assert_eq!(store.get("missing").await?, None);
        Ok(())
    })
}

#[test]
fn set_then_get_round_trips_bytes() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.set("k", vec![1, 2, 3]).await?;
        assert_eq!(store.get("k").await?, Some(vec![1, 2, 3]));
        Ok(())
    })
}

#[test]
fn set_with_ttl_expires_after_ttl() -> TestResult {
    block_on(async {
        let control = ClockControl::new();
        let store = MemoryStore::new(control.to_clock());

        store.set_with_ttl("k", b"v".to_vec(), Duration::from_secs(1)).await?;

        control.advance(Duration::from_millis(999));
        assert_eq!(store.get("k").await?, Some(b"v".to_vec()));

        control.advance(Duration::from_millis(1));
        assert_eq!(store.get("k").await?, None);
        Ok(())
    })
}

#[test]
fn zero_ttl_is_immediately_absent() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.set_with_ttl("k", b"v".to_vec(), Duration::ZERO).await?;
        assert_eq!(store.get("k").await?, None);
        Ok(())
    })
}

#[test]
fn expire_applies_deadline_to_existing_key() -> TestResult {
    block_on(async {
        let control = ClockControl::new();
        let store = MemoryStore::new(control.to_clock());

        store.set("k", b"v".to_vec()).await?;
        store.expire("k", Duration::from_secs(5)).await?;

        control.advance(Duration::from_secs(4));
        assert!(store.get("k").await?.is_some());

        control.advance(Duration::from_secs(1));
        assert!(store.get("k").await?.is_none());
        Ok(())
    })
}

#[test]
fn expire_absent_key_is_noop() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.expire("missing", Duration::from_secs(5)).await?;
        assert_eq!(store.get("missing").await?, None);
        Ok(())
    })
}

#[test]
fn set_clears_previous_deadline() -> TestResult {
    block_on(async {
        let control = ClockControl::new();
        let store = MemoryStore::new(control.to_clock());

        store.set_with_ttl("k", b"old".to_vec(), Duration::from_secs(1)).await?;
        store.set("k", b"new".to_vec()).await?;

        control.advance(Duration::from_secs(10));
        assert_eq!(store.get("k").await?, Some(b"new".to_vec()));
        Ok(())
    })
}

#[test]
fn delete_removes_key_and_is_idempotent() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        store.set("k", b"v".to_vec()).await?;

        store.delete("k").await?;
        assert_eq!(store.get("k").await?, None);

        store.delete("k").await?;
        Ok(())
    })
}

#[test]
fn expired_keys_are_evicted_on_read() -> TestResult {
    block_on(async {
        let control = ClockControl::new();
        let store = MemoryStore::new(control.to_clock());

        store.set_with_ttl("k", b"v".to_vec(), Duration::from_secs(1)).await?;
        store.sync().await;
        assert_eq!(store.len(), 1);

        control.advance(Duration::from_secs(2));
        assert_eq!(store.get("k").await?, None);

        store.sync().await;
        assert!(store.is_empty());
        Ok(())
    })
}

#[test]
fn clones_share_data() -> TestResult {
    block_on(async {
        let store = MemoryStore::new(Clock::new_frozen());
        let clone = store.clone();

        clone.set("k", b"v".to_vec()).await?;
        assert_eq!(store.get("k").await?, Some(b"v".to_vec()));
        Ok(())
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_leave_one_value() -> TestResult {
    let store = MemoryStore::new(Clock::new_frozen());

    let tasks: Vec<_> = (0..16u8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.set("shared", vec![i]).await })
        })
        .collect();

    for task in tasks {
        task.await.expect("task panicked")?;
    }

    let value = store.get("shared").await?.expect("a writer should have won");
    assert_eq!(value.len(), 1);
    assert!(value[0] < 16);
    Ok(())
}
