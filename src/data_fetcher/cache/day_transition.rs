//! Moves entries between partitions when the UTC day rolls over.
//!
//! Runs on the first request of a new day, before that request touches the
//! store. Three passes, each over the plain and the live variant:
//!
//! 1. heal: the new today's entry may sit in `future/` (written yesterday)
//!    or in both `future/` and `today/`. Promote it or drop the duplicate.
//! 2. retire: the previous day's `today/` entry moves to `historical/`.
//! 3. drift: tomorrow's entry found under `today/` moves to `future/`.
//!
//! Every pass is idempotent and verified afterwards. Several instances may run
//! the same sweep concurrently against a shared store; the outcome converges.

use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::fixture_store::FixtureStore;
use super::freshness::FreshnessGate;
use super::partition::{EntryId, Partition};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Heal,
    Retire,
    Drift,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Heal => f.write_str("heal"),
            Pass::Retire => f.write_str("retire"),
            Pass::Drift => f.write_str("drift"),
        }
    }
}

/// Something the sweep changed in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Today's entry existed in both `future/` and `today/`; the `future/` copy was dropped
    DroppedDuplicateFuture(EntryId),
    /// Today's entry moved from `future/` to `today/`
    PromotedFuture(EntryId),
    /// A past day's entry moved from `today/` to `historical/`
    Retired(EntryId),
    /// A copy left at the source after a move was deleted
    DroppedLeftover(EntryId, Partition),
    /// Tomorrow's entry moved from `today/` to `future/`
    DemotedTomorrow(EntryId),
    /// The entry resolved nowhere after a move; the next read refetches it
    Lost(EntryId),
}

impl TransitionAction {
    /// Duplicate or misplaced data that the sweep healed
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            TransitionAction::DroppedDuplicateFuture(_)
                | TransitionAction::DroppedLeftover(..)
                | TransitionAction::DemotedTomorrow(_)
                | TransitionAction::Lost(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionFailure {
    pub pass: Pass,
    pub entry: EntryId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub previous_day: Option<NaiveDate>,
    pub new_day: NaiveDate,
    pub actions: Vec<TransitionAction>,
    pub failures: Vec<TransitionFailure>,
}

impl TransitionReport {
    fn new(previous_day: Option<NaiveDate>, new_day: NaiveDate) -> Self {
        Self {
            previous_day,
            new_day,
            actions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &TransitionAction> {
        self.actions.iter().filter(|a| a.is_anomaly())
    }

    fn fail(&mut self, pass: Pass, entry: EntryId, error: AppError) {
        warn!(pass = %pass, entry = %entry, error = %error, "day transition step failed");
        self.failures.push(TransitionFailure {
            pass,
            entry,
            error: error.to_string(),
        });
    }
}

/// Dates whose `today/` entry has to be retired when `today` starts.
///
/// Always yesterday; also the last day this instance saw when days were
/// skipped.
pub fn retire_targets(previous: Option<NaiveDate>, today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = previous
        .into_iter()
        .chain(today.pred_opt())
        .filter(|date| *date < today)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

#[derive(Debug)]
pub struct DayTransitionCoordinator {
    store: FixtureStore,
    gate: Arc<FreshnessGate>,
    running: Mutex<()>,
}

impl DayTransitionCoordinator {
    pub fn new(store: FixtureStore, gate: Arc<FreshnessGate>) -> Self {
        Self {
            store,
            gate,
            running: Mutex::new(()),
        }
    }

    /// Runs the sweep if `today` differs from the day this instance last saw.
    ///
    /// Returns `None` when nothing had to be done. Failures inside the sweep
    /// are reported, not returned; the day advances regardless so a broken
    /// store cannot block reads.
    pub async fn ensure_current_day(&self, today: NaiveDate) -> Option<TransitionReport> {
        if self.gate.current_day().await == Some(today) {
            return None;
        }

        let _running = self.running.lock().await;
        let previous = self.gate.current_day().await;
        if previous == Some(today) {
            // Another request finished the sweep while we waited
            return None;
        }

        let report = self.sweep(previous, today).await;
        self.gate.reset().await;
        self.gate.advance_day(today).await;

        info!(
            previous_day = ?previous,
            new_day = %today,
            actions = report.actions.len(),
            anomalies = report.anomalies().count(),
            failures = report.failures.len(),
            "day transition complete"
        );
        Some(report)
    }

    /// Reconciles the partitions for `today`. Touches the store only.
    #[instrument(skip(self), fields(backend = self.store.backend().name()))]
    pub async fn sweep(&self, previous: Option<NaiveDate>, today: NaiveDate) -> TransitionReport {
        let mut report = TransitionReport::new(previous, today);

        for is_live in [false, true] {
            let id = EntryId::new(today, is_live);
            if let Err(e) = self.heal(id, &mut report).await {
                report.fail(Pass::Heal, id, e);
            }
        }

        for date in retire_targets(previous, today) {
            for is_live in [false, true] {
                let id = EntryId::new(date, is_live);
                if let Err(e) = self.retire(id, &mut report).await {
                    report.fail(Pass::Retire, id, e);
                }
            }
        }

        if let Some(tomorrow) = today.succ_opt() {
            for is_live in [false, true] {
                let id = EntryId::new(tomorrow, is_live);
                if let Err(e) = self.drift(id, &mut report).await {
                    report.fail(Pass::Drift, id, e);
                }
            }
        }

        report
    }

    async fn heal(&self, id: EntryId, report: &mut TransitionReport) -> Result<(), AppError> {
        if !self.store.exists(id, Partition::Future).await? {
            return Ok(());
        }

        // Only a readable TODAY copy makes the FUTURE one a duplicate; a broken
        // chunk set under TODAY is overwritten by the promotion below
        if self.store.read(id, Partition::Today).await?.is_some() {
            self.store.remove(id, Partition::Future).await?;
            if self.store.exists(id, Partition::Future).await? {
                return Err(AppError::store_write(
                    id.key_in(Partition::Future),
                    "duplicate still present after delete",
                ));
            }
            warn!(entry = %id, "dropped duplicate future entry");
            report.actions.push(TransitionAction::DroppedDuplicateFuture(id));
            return Ok(());
        }

        self.store
            .relocate(id, Partition::Future, Partition::Today)
            .await?;
        self.verify_moved(id, Partition::Future, Partition::Today, report)
            .await?;
        debug!(entry = %id, "promoted future entry to today");
        report.actions.push(TransitionAction::PromotedFuture(id));
        Ok(())
    }

    async fn retire(&self, id: EntryId, report: &mut TransitionReport) -> Result<(), AppError> {
        if !self.store.exists(id, Partition::Today).await? {
            return Ok(());
        }

        self.store
            .relocate(id, Partition::Today, Partition::Historical)
            .await?;
        self.verify_moved(id, Partition::Today, Partition::Historical, report)
            .await?;
        debug!(entry = %id, "retired entry to historical");
        report.actions.push(TransitionAction::Retired(id));
        Ok(())
    }

    async fn drift(&self, id: EntryId, report: &mut TransitionReport) -> Result<(), AppError> {
        if !self.store.exists(id, Partition::Today).await? {
            return Ok(());
        }

        self.store
            .relocate(id, Partition::Today, Partition::Future)
            .await?;
        self.verify_moved(id, Partition::Today, Partition::Future, report)
            .await?;
        warn!(entry = %id, "moved tomorrow's entry out of today");
        report.actions.push(TransitionAction::DemotedTomorrow(id));
        Ok(())
    }

    /// Checks that `id` left `from` and landed in `to`.
    ///
    /// A copy still at the source is deleted. An entry that resolves nowhere
    /// is recorded as lost; the next read for it refetches from the origin.
    async fn verify_moved(
        &self,
        id: EntryId,
        from: Partition,
        to: Partition,
        report: &mut TransitionReport,
    ) -> Result<(), AppError> {
        if self.store.exists(id, from).await? {
            self.store.remove(id, from).await?;
            if self.store.exists(id, from).await? {
                return Err(AppError::store_move(
                    id.key_in(from),
                    id.key_in(to),
                    "source still present after move",
                ));
            }
            report.actions.push(TransitionAction::DroppedLeftover(id, from));
        }

        if !self.store.exists(id, to).await? {
            warn!(entry = %id, from = %from, to = %to, "entry missing after move");
            report.actions.push(TransitionAction::Lost(id));
        }
        Ok(())
    }
}
