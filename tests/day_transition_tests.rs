use chrono::{NaiveDate, Utc};
use fixture_cache::clock::ManualClock;
use fixture_cache::data_fetcher::FixtureService;
use fixture_cache::data_fetcher::cache::{
    DayTransitionCoordinator, EntryId, FileStore, FixtureStore, FreshnessGate, Layout,
    MemoryStore, ObjectMetadata, ObjectStore, Partition, Strategy, TransitionAction,
};
use fixture_cache::data_fetcher::models::ResponseSource;
use fixture_cache::testing_utils::{ScriptedOrigin, TestDataBuilder};
use std::sync::Arc;
use tempfile::tempdir;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn coordinator_over(store: FixtureStore) -> DayTransitionCoordinator {
    let clock = Arc::new(ManualClock::at("2024-05-02", 0, 0).unwrap());
    DayTransitionCoordinator::new(store, Arc::new(FreshnessGate::new(clock)))
}

async fn put(store: &FixtureStore, id: EntryId, partition: Partition, count: usize) {
    store
        .write(
            id,
            partition,
            &TestDataBuilder::create_fixtures_on(id.date, count),
            ObjectMetadata::new(Utc::now(), Strategy::FrequentRefresh),
        )
        .await
        .unwrap();
}

/// Several instances sweeping the same store at once converge on one layout
#[tokio::test]
async fn test_racing_coordinators_converge() {
    for layout in [Layout::Single, Layout::Chunked { chunk_size: 2 }] {
        let backend = Arc::new(MemoryStore::new());
        let store = FixtureStore::new(backend.clone(), layout);
        let yesterday = EntryId::new(date("2024-05-01"), false);
        let yesterday_live = EntryId::new(date("2024-05-01"), true);
        let today = EntryId::new(date("2024-05-02"), false);
        put(&store, yesterday, Partition::Today, 5).await;
        put(&store, yesterday_live, Partition::Today, 1).await;
        put(&store, today, Partition::Future, 3).await;

        let a = coordinator_over(store.clone());
        let b = coordinator_over(store.clone());
        let c = coordinator_over(store.clone());
        tokio::join!(
            a.sweep(Some(date("2024-05-01")), date("2024-05-02")),
            b.sweep(Some(date("2024-05-01")), date("2024-05-02")),
            c.sweep(None, date("2024-05-02")),
        );

        // A follow-up sweep finds nothing left to do
        let settled = a.sweep(Some(date("2024-05-01")), date("2024-05-02")).await;
        assert!(settled.is_clean(), "{layout:?}: {settled:?}");
        assert!(settled.actions.is_empty(), "{layout:?}: {settled:?}");

        assert!(!store.exists(yesterday, Partition::Today).await.unwrap());
        assert!(!store.exists(yesterday_live, Partition::Today).await.unwrap());
        assert!(!store.exists(today, Partition::Future).await.unwrap());

        // Movers racing on one destination may leave it unreadable, which
        // refetches on the next read, but never a partial list
        for (id, partition, expected) in [
            (yesterday, Partition::Historical, 5),
            (today, Partition::Today, 3),
        ] {
            if let Some(entry) = store.read(id, partition).await.unwrap() {
                assert_eq!(entry.fixtures.len(), expected, "{layout:?}: {id}");
            } else {
                assert!(matches!(layout, Layout::Chunked { .. }), "{id} lost");
            }
        }
    }
}

/// Duplicates in FUTURE and TODAY heal to exactly one TODAY entry
#[tokio::test]
async fn test_duplicate_heals_to_single_today_entry() {
    let backend = Arc::new(MemoryStore::new());
    let store = FixtureStore::new(backend.clone(), Layout::Single);
    let today = EntryId::new(date("2024-05-02"), false);
    put(&store, today, Partition::Future, 1).await;
    put(&store, today, Partition::Today, 2).await;

    let report = coordinator_over(store.clone())
        .sweep(Some(date("2024-05-01")), date("2024-05-02"))
        .await;
    assert_eq!(
        report.anomalies().collect::<Vec<_>>(),
        vec![&TransitionAction::DroppedDuplicateFuture(today)]
    );
    assert_eq!(backend.keys().await, vec!["today/fixtures-2024-05-02.json"]);
}

/// Entries persisted by the file store move between partition directories
/// when a later process starts on the next day
#[tokio::test]
async fn test_file_store_rollover_across_processes() {
    let dir = tempdir().unwrap();

    // Evening of May 1st: today's and tomorrow's fixtures get cached
    {
        let clock = Arc::new(ManualClock::at("2024-05-01", 21, 0).unwrap());
        let origin = Arc::new(ScriptedOrigin::new());
        origin.push_fixtures(TestDataBuilder::create_fixtures_on(date("2024-05-01"), 4));
        origin.push_fixtures(TestDataBuilder::create_fixtures_on(date("2024-05-02"), 2));
        let service = FixtureService::new(
            FixtureStore::new(Arc::new(FileStore::new(dir.path())), Layout::Single),
            origin,
            clock,
        );
        service.get_fixtures(None, "UTC", false).await.unwrap();
        service
            .get_fixtures(Some("2024-05-02"), "UTC", false)
            .await
            .unwrap();
    }
    assert!(dir.path().join("today/fixtures-2024-05-01.json.entry").exists());
    assert!(dir.path().join("future/fixtures-2024-05-02.json.entry").exists());

    // Next morning a new process starts with no in-memory state
    let clock = Arc::new(ManualClock::at("2024-05-02", 8, 0).unwrap());
    let origin = Arc::new(ScriptedOrigin::new());
    origin.push_fixtures(TestDataBuilder::create_fixtures_on(date("2024-04-20"), 1));
    let service = FixtureService::new(
        FixtureStore::new(Arc::new(FileStore::new(dir.path())), Layout::Single),
        origin.clone(),
        clock,
    );
    let payload = service
        .get_fixtures(Some("2024-04-20"), "UTC", false)
        .await
        .unwrap();
    assert_eq!(payload.source, ResponseSource::Origin);

    assert!(dir.path().join("historical/fixtures-2024-05-01.json.entry").exists());
    assert!(!dir.path().join("today/fixtures-2024-05-01.json.entry").exists());
    assert!(dir.path().join("today/fixtures-2024-05-02.json.entry").exists());
    assert!(!dir.path().join("future/fixtures-2024-05-02.json.entry").exists());

    let backend = FileStore::new(dir.path());
    assert!(
        backend
            .exists("historical/fixtures-2024-04-20.json")
            .await
            .unwrap()
    );
}

/// A chunk set missing one chunk is never served partially
#[tokio::test]
async fn test_broken_chunk_set_is_refetched() {
    let clock = Arc::new(ManualClock::at("2024-05-02", 12, 0).unwrap());
    let backend = Arc::new(MemoryStore::new().with_max_value_bytes(64 * 1024));
    let store = FixtureStore::new(backend.clone(), Layout::Chunked { chunk_size: 2 });
    let origin = Arc::new(ScriptedOrigin::new());
    origin.push_fixtures(TestDataBuilder::create_fixtures_on(date("2024-05-10"), 5));
    origin.push_fixtures(TestDataBuilder::create_fixtures_on(date("2024-05-10"), 5));
    let service = FixtureService::new(store, origin.clone(), clock);

    service
        .get_fixtures(Some("2024-05-10"), "UTC", false)
        .await
        .unwrap();
    backend
        .delete("future/fixtures-2024-05-10.json:chunk:1")
        .await
        .unwrap();

    let payload = service
        .get_fixtures(Some("2024-05-10"), "UTC", false)
        .await
        .unwrap();
    assert_eq!(payload.source, ResponseSource::Origin);
    assert_eq!(payload.match_count(), 5);
    assert_eq!(origin.calls(), 2);
    assert!(
        backend
            .exists("future/fixtures-2024-05-10.json:chunk:1")
            .await
            .unwrap()
    );
}
