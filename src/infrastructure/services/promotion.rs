//! Weekly promotion of hot entries into the long-term collections

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::PromotionSettings;
use crate::domain::context::{Context, ContextCollections, ContextIndexMap};
use crate::domain::error::DomainError;
use crate::domain::exact::ExactKeyStore;
use crate::domain::remote::{CacheDocument, RemoteSemanticStore};

/// When the promotion job fires: a fixed weekday and hour in a fixed zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionSchedule {
    weekday: Weekday,
    hour: u32,
    timezone: Tz,
}

impl PromotionSchedule {
    pub fn from_settings(settings: &PromotionSettings) -> Result<Self, DomainError> {
        let weekday: Weekday = settings.day_of_week.parse().map_err(|_| {
            DomainError::configuration(format!("Invalid weekday: {}", settings.day_of_week))
        })?;

        if settings.hour > 23 {
            return Err(DomainError::configuration(format!(
                "Invalid hour: {}",
                settings.hour
            )));
        }

        let timezone: Tz = settings.timezone.parse().map_err(|_| {
            DomainError::configuration(format!("Invalid time zone: {}", settings.timezone))
        })?;

        Ok(Self {
            weekday,
            hour: settings.hour,
            timezone,
        })
    }

    /// The first scheduled instant strictly after `now`.
    ///
    /// Candidates falling into a DST gap are skipped. The two-week scan
    /// always finds a valid occurrence in practice; the fallback only guards
    /// against pathological zone data.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.timezone);
        let mut date = local.date_naive();

        for _ in 0..14 {
            if date.weekday() == self.weekday
                && let Some(naive) = date.and_hms_opt(self.hour, 0, 0)
                && let Some(candidate) = self.timezone.from_local_datetime(&naive).earliest()
            {
                let candidate = candidate.with_timezone(&Utc);
                if candidate > now {
                    return candidate;
                }
            }

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        now + Duration::days(7)
    }
}

/// Summary of one promotion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionReport {
    /// Documents copied into long-term collections across all contexts
    pub promoted: usize,
    /// Contexts whose promotion failed this run
    pub failed_contexts: Vec<Context>,
}

/// Background job copying frequently accessed entries into each context's
/// long-term collection.
///
/// Strictly additive: exact entries and local indices are never touched.
/// A context failing mid-run is logged and skipped without aborting the
/// others, and at most one run is in flight at a time.
pub struct PromotionScheduler {
    exact: Arc<dyn ExactKeyStore>,
    remote: Arc<dyn RemoteSemanticStore>,
    contexts: ContextIndexMap,
    min_access_count: u64,
    schedule: PromotionSchedule,
    run_guard: Mutex<()>,
    worker: std::sync::Mutex<Option<Worker>>,
}

struct Worker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl fmt::Debug for PromotionScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromotionScheduler")
            .field("schedule", &self.schedule)
            .field("min_access_count", &self.min_access_count)
            .finish_non_exhaustive()
    }
}

impl PromotionScheduler {
    pub fn new(
        settings: &PromotionSettings,
        contexts: ContextIndexMap,
        exact: Arc<dyn ExactKeyStore>,
        remote: Arc<dyn RemoteSemanticStore>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            exact,
            remote,
            contexts,
            min_access_count: settings.min_access_count,
            schedule: PromotionSchedule::from_settings(settings)?,
            run_guard: Mutex::new(()),
            worker: std::sync::Mutex::new(None),
        })
    }

    pub fn schedule(&self) -> PromotionSchedule {
        self.schedule
    }

    /// Spawn the background worker. Idempotent while a worker is running.
    pub fn start(self: &Arc<Self>) {
        let mut worker = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if worker.is_some() {
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let scheduler = self.clone();

        let handle = tokio::spawn(async move {
            loop {
                let next = scheduler.schedule.next_run_after(Utc::now());
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                info!(next_run = %next, "Promotion scheduled");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        scheduler.run_if_idle().await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        *worker = Some(Worker { shutdown, handle });
    }

    /// Stop the worker, waiting for any in-flight run to finish.
    pub async fn stop(&self) {
        let worker = {
            let mut guard = match self.worker.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take()
        };

        if let Some(worker) = worker {
            let _ = worker.shutdown.send(true);
            if let Err(error) = worker.handle.await {
                warn!(error = %error, "Promotion worker did not shut down cleanly");
            }
        }
    }

    async fn run_if_idle(&self) {
        match self.run_guard.try_lock() {
            Ok(_guard) => {
                self.run().await;
            }
            Err(_) => {
                warn!("Previous promotion run still in flight, skipping this trigger");
            }
        }
    }

    /// Run one promotion pass over every configured context. Waits for any
    /// in-flight run first, so it composes with the scheduled trigger.
    pub async fn run_once(&self) -> PromotionReport {
        let _guard = self.run_guard.lock().await;
        self.run().await
    }

    async fn run(&self) -> PromotionReport {
        let mut report = PromotionReport::default();

        for context in self.contexts.contexts() {
            let Some(collections) = self.contexts.resolve(context) else {
                continue;
            };

            match self.promote_context(context, collections).await {
                Ok(count) => {
                    if count > 0 {
                        info!(context = %context, promoted = count, "Promoted hot entries");
                    }
                    report.promoted += count;
                }
                Err(error) => {
                    warn!(context = %context, error = %error, "Promotion failed for context");
                    report.failed_contexts.push(context.clone());
                }
            }
        }

        info!(
            promoted = report.promoted,
            failed = report.failed_contexts.len(),
            "Promotion run finished"
        );

        report
    }

    async fn promote_context(
        &self,
        context: &Context,
        collections: &ContextCollections,
    ) -> Result<usize, DomainError> {
        let hot = self.exact.scan_hot(context, self.min_access_count).await?;

        if hot.is_empty() {
            return Ok(0);
        }

        let documents: Vec<CacheDocument> = hot
            .into_iter()
            .map(|entry| CacheDocument::new(entry.query, entry.response))
            .collect();
        let count = documents.len();

        self.remote
            .upsert(&collections.longterm_collection, documents)
            .await?;

        Ok(count)
    }
}
