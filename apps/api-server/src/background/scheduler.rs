//! In-process publish sweeps on a cron schedule, using tokio-cron-scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use cadence_core::services::Publisher;

/// Every 15 minutes, on the quarter hour.
pub const DEFAULT_SWEEP_CRON: &str = "0 */15 * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Six-field cron expression (seconds first) for the publish sweep.
    pub sweep_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_cron: DEFAULT_SWEEP_CRON.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            sweep_cron: std::env::var("SWEEP_CRON")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SWEEP_CRON.to_string()),
        }
    }
}

/// Runs one sweep at a time. A tick that arrives while the previous sweep is
/// still going is skipped.
pub struct SweepRunner {
    publisher: Arc<Publisher>,
    running: AtomicBool,
}

impl SweepRunner {
    pub fn new(publisher: Arc<Publisher>) -> Self {
        Self {
            publisher,
            running: AtomicBool::new(false),
        }
    }

    /// Run a sweep unless one is in flight. Returns whether it ran.
    pub async fn tick(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Previous publish sweep still running, skipping tick");
            return false;
        }

        match self.publisher.sweep().await {
            Ok(report) => tracing::info!(
                processed = report.processed_count,
                published = report.published(),
                failed = report.failed(),
                "Scheduled publish sweep complete"
            ),
            Err(e) => tracing::error!(error = %e, "Scheduled publish sweep failed"),
        }

        self.running.store(false, Ordering::Release);
        true
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Register the publish sweep on the configured schedule.
    pub async fn add_sweep(&self, runner: Arc<SweepRunner>) -> Result<uuid::Uuid, JobSchedulerError> {
        let schedule = self.config.sweep_cron.as_str();
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let runner = runner.clone();
            Box::pin(async move {
                runner.tick().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Publish sweep job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
