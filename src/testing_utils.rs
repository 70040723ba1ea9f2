//! Builders and test doubles shared by unit and integration tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::data_fetcher::api::{FixtureQuery, FixtureSource};
use crate::data_fetcher::cache::{ObjectMetadata, ObjectStore, StoredObject};
use crate::data_fetcher::models::{
    Fixture, FixtureInfo, FixtureStatus, Goals, League, Score, Team, Teams,
};
use crate::error::AppError;

const SAMPLE_LEAGUES: [(i64, &str, &str); 4] = [
    (39, "Premier League", "England"),
    (140, "La Liga", "Spain"),
    (78, "Bundesliga", "Germany"),
    (40, "Championship", "England"),
];

/// Test utilities for creating fixture data
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Creates a finished fixture. `kickoff` is RFC 3339; unparsable input falls back to the epoch.
    pub fn create_fixture(
        id: i64,
        country: Option<&str>,
        league: Option<(i64, &str)>,
        kickoff: &str,
    ) -> Fixture {
        let date = DateTime::parse_from_rfc3339(kickoff)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_default();
        let league = League {
            id: league.map(|(id, _)| id),
            name: league.map(|(_, name)| name.to_string()),
            country: country.map(str::to_string),
            flag: country.map(|c| format!("https://media.example.com/flags/{}.svg", c.to_lowercase())),
            logo: league.map(|(id, _)| format!("https://media.example.com/leagues/{id}.png")),
        };

        Fixture {
            fixture: FixtureInfo {
                id,
                timezone: "UTC".to_string(),
                date,
                timestamp: Some(date.timestamp()),
                status: FixtureStatus {
                    long: "Match Finished".to_string(),
                    short: "FT".to_string(),
                    elapsed: Some(90),
                },
            },
            league,
            teams: Teams {
                home: Self::create_team(id * 2, true),
                away: Self::create_team(id * 2 + 1, false),
            },
            goals: Goals {
                home: Some(2),
                away: Some(1),
            },
            score: Score {
                halftime: Goals {
                    home: Some(1),
                    away: Some(0),
                },
                fulltime: Goals {
                    home: Some(2),
                    away: Some(1),
                },
                ..Score::default()
            },
        }
    }

    /// Creates a fixture in play with the given status code (e.g. "1H", "HT")
    pub fn create_live_fixture(id: i64, status_short: &str, elapsed: i32) -> Fixture {
        let mut fixture = Self::create_fixture(
            id,
            Some("England"),
            Some((39, "Premier League")),
            "2024-05-02T19:00:00Z",
        );
        fixture.fixture.status = FixtureStatus {
            long: "In Play".to_string(),
            short: status_short.to_string(),
            elapsed: Some(elapsed),
        };
        fixture.goals = Goals {
            home: Some(0),
            away: Some(0),
        };
        fixture.teams.home.winner = None;
        fixture.teams.away.winner = None;
        fixture
    }

    /// Creates `count` fixtures with distinct ids spread over a few leagues,
    /// kicking off a minute apart on 2024-05-02.
    pub fn create_fixtures(count: usize) -> Vec<Fixture> {
        Self::create_fixtures_on(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap_or_default(),
            count,
        )
    }

    /// Same as [`TestDataBuilder::create_fixtures`] on a chosen date
    pub fn create_fixtures_on(date: NaiveDate, count: usize) -> Vec<Fixture> {
        let start = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        (0..count)
            .map(|i| {
                let (league_id, league_name, country) = SAMPLE_LEAGUES[i % SAMPLE_LEAGUES.len()];
                let kickoff = start + Duration::minutes(i as i64);
                Self::create_fixture(
                    i as i64 + 1,
                    Some(country),
                    Some((league_id, league_name)),
                    &kickoff.to_rfc3339(),
                )
            })
            .collect()
    }

    fn create_team(id: i64, winner: bool) -> Team {
        Team {
            id: Some(id),
            name: format!("Team {id}"),
            logo: Some(format!("https://media.example.com/teams/{id}.png")),
            winner: Some(winner),
        }
    }
}

/// Origin double that replays queued answers and counts calls.
///
/// Answers with an empty list once the queue is drained.
#[derive(Debug, Default)]
pub struct ScriptedOrigin {
    answers: Mutex<VecDeque<Result<Vec<Fixture>, AppError>>>,
    queries: Mutex<Vec<FixtureQuery>>,
    calls: AtomicUsize,
}

impl ScriptedOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fixtures(&self, fixtures: Vec<Fixture>) {
        self.lock_answers().push_back(Ok(fixtures));
    }

    pub fn push_error(&self, error: AppError) {
        self.lock_answers().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<FixtureQuery> {
        self.queries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn lock_answers(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Vec<Fixture>, AppError>>> {
        self.answers.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl FixtureSource for ScriptedOrigin {
    async fn fetch_fixtures(&self, query: FixtureQuery) -> Result<Vec<Fixture>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(query);
        self.lock_answers().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Store wrapper that fails chosen operations on demand
#[derive(Debug)]
pub struct FaultyStore {
    inner: Box<dyn ObjectStore>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_write_prefixes: Mutex<Vec<String>>,
    failing_delete_prefixes: Mutex<Vec<String>>,
}

impl FaultyStore {
    pub fn new(inner: impl ObjectStore + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            failing_write_prefixes: Mutex::new(Vec::new()),
            failing_delete_prefixes: Mutex::new(Vec::new()),
        }
    }

    /// Makes `get` and `exists` fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` fail for keys starting with `prefix`
    pub fn fail_writes_under(&self, prefix: &str) {
        self.failing_write_prefixes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(prefix.to_string());
    }

    /// Makes `delete` fail for keys starting with `prefix`
    pub fn fail_deletes_under(&self, prefix: &str) {
        self.failing_delete_prefixes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(prefix.to_string());
    }

    pub fn clear_faults(&self) {
        self.fail_reads(false);
        self.fail_writes(false);
        for prefixes in [&self.failing_write_prefixes, &self.failing_delete_prefixes] {
            prefixes.lock().unwrap_or_else(|p| p.into_inner()).clear();
        }
    }

    fn matches_any(prefixes: &Mutex<Vec<String>>, key: &str) -> bool {
        prefixes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn max_value_bytes(&self) -> Option<usize> {
        self.inner.max_value_bytes()
    }

    async fn set(&self, key: &str, data: String, metadata: ObjectMetadata) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst)
            || Self::matches_any(&self.failing_write_prefixes, key)
        {
            return Err(AppError::store_write(key, "injected write failure"));
        }
        self.inner.set(key, data, metadata).await
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::store_read(key, "injected read failure"));
        }
        self.inner.get(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::store_read(key, "injected read failure"));
        }
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        if Self::matches_any(&self.failing_delete_prefixes, key) {
            return Err(AppError::store_write(key, "injected delete failure"));
        }
        self.inner.delete(key).await
    }
}
