//! Minute-granularity check scheduler.
//!
//! The loop wakes on a fixed interval, compares the local wall clock against
//! the configured notification times, and runs one reminder check per match.
//! Checks are idempotent within the suppression window: two ticks landing in
//! the same window produce one notification pass. Tick errors are caught at
//! the loop boundary so the timer never dies.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::notifier::NotificationDispatcher;
use crate::reminders::{collect_birthdays_at, collect_overdue_at};
use crate::time_utils::{is_notification_time, should_run_check_at, wall_clock_hhmm};
use crate::traits::{DataStore, NotificationHandle};
use crate::types::NotificationCategory;

/// What a single tick did. Inspected by tests and folded into telemetry.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Wall clock matched a configured notification time.
    pub matched: bool,
    /// Matched, but the suppression window swallowed the check.
    pub suppressed: bool,
    pub birthday_count: usize,
    pub overdue_count: usize,
    pub dispatched: Vec<NotificationHandle>,
}

/// Counters exposed on the status endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub ticks: u64,
    pub matched_ticks: u64,
    pub suppressed_ticks: u64,
    pub notifications_sent: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Default)]
pub struct SchedulerTelemetry {
    inner: Mutex<TelemetrySnapshot>,
}

impl SchedulerTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&self, outcome: &TickOutcome) {
        if let Ok(mut snap) = self.inner.lock() {
            snap.ticks += 1;
            if outcome.matched {
                snap.matched_ticks += 1;
            }
            if outcome.suppressed {
                snap.suppressed_ticks += 1;
            }
            snap.notifications_sent += outcome.dispatched.len() as u64;
            snap.last_tick_at = Some(Utc::now());
            snap.last_error = None;
        }
    }

    pub fn record_error(&self, err: &anyhow::Error) {
        if let Ok(mut snap) = self.inner.lock() {
            snap.ticks += 1;
            snap.last_tick_at = Some(Utc::now());
            snap.last_error = Some(err.to_string());
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.inner
            .lock()
            .map(|snap| snap.clone())
            .unwrap_or_default()
    }
}

pub struct CheckScheduler {
    store: Arc<dyn DataStore>,
    dispatcher: Arc<NotificationDispatcher>,
    tick_interval: Duration,
    suppression_window_mins: i64,
    telemetry: Arc<SchedulerTelemetry>,
}

impl CheckScheduler {
    pub fn new(
        store: Arc<dyn DataStore>,
        dispatcher: Arc<NotificationDispatcher>,
        tick_interval: Duration,
        suppression_window_mins: i64,
        telemetry: Arc<SchedulerTelemetry>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            tick_interval,
            suppression_window_mins,
            telemetry,
        }
    }

    /// One scheduler tick at an explicit instant.
    ///
    /// Order matters: time match first, then the suppression window, then
    /// evaluation. Birthdays dispatch before overdue reminders. `lastCheck`
    /// advances only when at least one category was non-empty, so quiet
    /// matches keep retrying until something is due.
    pub async fn tick_at(&self, now: DateTime<Local>) -> anyhow::Result<TickOutcome> {
        let mut outcome = TickOutcome::default();
        let data = self.store.load_all().await?;

        let wall = wall_clock_hhmm(now);
        if !is_notification_time(&wall, &data.settings.notification_times) {
            return Ok(outcome);
        }
        outcome.matched = true;

        let now_utc = now.with_timezone(&Utc);
        if !should_run_check_at(now_utc, data.settings.last_check, self.suppression_window_mins) {
            debug!(time = %wall, "Check suppressed, previous run within window");
            outcome.suppressed = true;
            return Ok(outcome);
        }

        let birthdays = collect_birthdays_at(now.date_naive(), &data.contacts);
        let overdue = collect_overdue_at(now_utc, &data.contacts, &data.circles);
        outcome.birthday_count = birthdays.len();
        outcome.overdue_count = overdue.len();
        info!(
            time = %wall,
            birthdays = birthdays.len(),
            overdue = overdue.len(),
            "Running reminder check"
        );

        if let Some(handle) = self
            .dispatcher
            .dispatch(NotificationCategory::Birthday, &birthdays)
        {
            outcome.dispatched.push(handle);
        }
        if let Some(handle) = self
            .dispatcher
            .dispatch(NotificationCategory::Overdue, &overdue)
        {
            outcome.dispatched.push(handle);
        }

        // The check ran whether or not a notification surfaced; permission
        // denial must not cause a re-fire on the next tick.
        if !birthdays.is_empty() || !overdue.is_empty() {
            let mut settings = data.settings.clone();
            settings.last_check = Some(now_utc);
            self.store.save_settings(&settings).await?;
        }

        Ok(outcome)
    }

    pub async fn tick(&self) -> anyhow::Result<TickOutcome> {
        self.tick_at(Local::now()).await
    }

    /// Spawns the tick loop: one tick immediately on arm, then one per
    /// interval. Stops when `shutdown` flips to true.
    pub fn start(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        info!(
            interval_secs = self.tick_interval.as_secs(),
            "Starting check scheduler"
        );
        tokio::spawn(async move {
            loop {
                match self.tick().await {
                    Ok(outcome) => self.telemetry.record_outcome(&outcome),
                    Err(e) => {
                        error!(error = %e, "Scheduler tick failed");
                        self.telemetry.record_error(&e);
                    }
                }
                tokio::select! {
                    _ = tokio::time::sleep(self.tick_interval) => {}
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Check scheduler stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}
