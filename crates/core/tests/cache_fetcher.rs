//! Cache-aside semantics of the fetcher.

mod common;

use cloudscope_api::{CacheStore, CatalogError, CatalogResult, SyncOutcome};
use cloudscope_core::{CacheAsideFetcher, MemoryCacheStore, RecordingObserver};
use cloudscope_ingest::BackgroundRuntime;
use common::{FailingStore, runtime, wait_until};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

struct Fixture {
    store: Arc<MemoryCacheStore>,
    observer: Arc<RecordingObserver>,
    runtime: Arc<BackgroundRuntime>,
    fetcher: CacheAsideFetcher,
}

fn fixture_with_runtime(runtime: Arc<BackgroundRuntime>) -> Fixture {
    let store = Arc::new(MemoryCacheStore::new("app"));
    let observer = Arc::new(RecordingObserver::default());
    let fetcher = CacheAsideFetcher::new(
        store.clone(),
        Arc::clone(&runtime),
        observer.clone(),
        Duration::from_secs(60),
    );
    Fixture {
        store,
        observer,
        runtime,
        fetcher,
    }
}

fn fixture() -> Fixture {
    fixture_with_runtime(runtime(2, 16))
}

/// Loader returning `vec![value]` where value is the call number.
fn counting_loader(
    calls: &Arc<AtomicUsize>,
) -> impl FnOnce() -> std::future::Ready<CatalogResult<Vec<usize>>> + Send + 'static {
    let calls = Arc::clone(calls);
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        std::future::ready(Ok(vec![n]))
    }
}

/// Cold resolve blocks on load and stores the result; warm resolve serves the stored value
/// and refreshes it exactly once in the background.
#[tokio::test]
async fn test_cold_then_warm_resolve() {
    let fx = fixture();
    let calls = Arc::new(AtomicUsize::new(0));

    let cold = fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();
    assert_eq!(cold, vec![1]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(fx.store.get("k").await.unwrap().is_some());

    let warm = fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();
    assert_eq!(warm, vec![1]);

    wait_until(|| calls.load(Ordering::SeqCst) == 2).await;
    wait_until(|| {
        fx.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::Revalidated { stored: true, .. }))
    })
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // The refreshed value replaces the entry.
    let refreshed = fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();
    assert_eq!(refreshed, vec![2]);
}

/// Empty results are returned but never stored.
#[tokio::test]
async fn test_empty_results_are_not_cached() {
    let fx = fixture();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let counter = Arc::clone(&calls);
        let value: Vec<String> = fx
            .fetcher
            .resolve("empty", 1, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            })
            .await
            .unwrap();
        assert!(value.is_empty());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(fx.store.is_empty());

    let absent: Option<String> = fx
        .fetcher
        .resolve("none", 1, || async { Ok(None) })
        .await
        .unwrap();
    assert!(absent.is_none());
    assert!(fx.store.is_empty());
}

/// A failed load on a miss propagates and writes nothing.
#[tokio::test]
async fn test_miss_load_failure_propagates() {
    let fx = fixture();
    let result: CatalogResult<Vec<String>> = fx
        .fetcher
        .resolve("k", 1, || async {
            Err(CatalogError::Internal("provider down".to_string()))
        })
        .await;

    assert!(matches!(result, Err(CatalogError::Internal(_))));
    assert!(fx.store.is_empty());
}

/// Store failures degrade to a miss and a lost write, both reported.
#[tokio::test]
async fn test_failing_store_is_fail_open() {
    let observer = Arc::new(RecordingObserver::default());
    let fetcher = CacheAsideFetcher::new(
        Arc::new(FailingStore),
        runtime(1, 4),
        observer.clone(),
        Duration::from_secs(60),
    );

    let value = fetcher
        .resolve("k", 1, || async { Ok(vec!["fresh".to_string()]) })
        .await
        .unwrap();
    assert_eq!(value, ["fresh"]);

    let outcomes = observer.outcomes();
    assert!(matches!(outcomes[0], SyncOutcome::CacheReadFailed { .. }));
    assert!(matches!(outcomes[1], SyncOutcome::CacheWriteFailed { .. }));
}

/// An undecodable entry is treated as a miss and reported.
#[tokio::test]
async fn test_corrupt_entry_is_a_miss() {
    let fx = fixture();
    fx.store
        .set("k", b"not json", Duration::from_secs(60))
        .await
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let value = fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();
    assert_eq!(value, vec![1]);
    assert!(
        fx.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::CacheEntryCorrupt { key, .. } if key == "k"))
    );
}

/// Revalidation errors reach the observer, never the caller.
#[tokio::test]
async fn test_revalidation_failure_is_reported() {
    let fx = fixture();
    let calls = Arc::new(AtomicUsize::new(0));
    fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();

    let warm: Vec<usize> = fx
        .fetcher
        .resolve("k", 1, || async {
            Err(CatalogError::Internal("provider down".to_string()))
        })
        .await
        .unwrap();
    assert_eq!(warm, vec![1]);

    wait_until(|| {
        fx.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::RevalidationFailed { .. }))
    })
    .await;
    wait_until(|| fx.runtime.stats().failed == 1).await;
}

/// When the background queue is full the refresh is dropped and reported.
#[tokio::test]
async fn test_saturated_runtime_rejects_revalidation() {
    let fx = fixture_with_runtime(runtime(1, 1));
    let calls = Arc::new(AtomicUsize::new(0));
    fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();

    let gate = Arc::new(Notify::new());
    let blocker = {
        let gate = Arc::clone(&gate);
        fx.runtime
            .submit("blocker", async move {
                gate.notified().await;
                Ok(())
            })
            .unwrap()
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    fx.runtime.submit("filler", async { Ok(()) }).unwrap();

    let warm = fx.fetcher.resolve("k", 1, counting_loader(&calls)).await.unwrap();
    assert_eq!(warm, vec![1]);
    assert!(
        fx.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::TaskRejected { label, .. } if label == "revalidate:k"))
    );

    gate.notify_one();
    blocker.join().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ttl_scales_base_unit() {
    let fx = fixture();
    assert_eq!(fx.fetcher.ttl(3), Duration::from_secs(180));
    assert_eq!(fx.fetcher.ttl(0), Duration::ZERO);
}

/// A ttl too large for `Duration` is stored without expiry instead of failing the resolve.
#[tokio::test]
async fn test_overflowing_ttl_stores_without_expiry() {
    let runtime = runtime(2, 16);
    let store = Arc::new(MemoryCacheStore::new("app"));
    let fetcher = CacheAsideFetcher::new(
        store.clone(),
        Arc::clone(&runtime),
        Arc::new(RecordingObserver::default()),
        Duration::from_secs(u64::MAX / 2),
    );
    assert_eq!(fetcher.ttl(3), Duration::ZERO);

    let calls = Arc::new(AtomicUsize::new(0));
    let value = fetcher.resolve("k", 3, counting_loader(&calls)).await.unwrap();
    assert_eq!(value, vec![1]);
    assert!(store.get("k").await.unwrap().is_some());
}
