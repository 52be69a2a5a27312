//! Scheduled runner for the package expiry sweep.
//!
//! The worker sweeps once on start and then on every interval tick until
//! its shutdown future resolves. A tick that falls due while a sweep is
//! still running is delayed rather than queued, so sweeps never overlap.

use crate::package::{
    ports::PackageRepository,
    services::{PackageLifecycleResult, PackageLifecycleService, SweepReport},
};
use async_trait::async_trait;
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// A sweep the worker can run on a schedule.
#[async_trait]
pub trait ExpirySweep: Send + Sync {
    /// Runs one sweep.
    async fn sweep(&self) -> PackageLifecycleResult<SweepReport>;
}

#[async_trait]
impl<R, C> ExpirySweep for PackageLifecycleService<R, C>
where
    R: PackageRepository,
    C: Clock + Send + Sync,
{
    async fn sweep(&self) -> PackageLifecycleResult<SweepReport> {
        self.sweep_expired().await
    }
}

/// Totals accumulated over a worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Sweeps started.
    pub sweeps: u64,
    /// Sweeps that failed outright.
    pub failed_sweeps: u64,
    /// Packages expired across all sweeps.
    pub expired: u64,
    /// Per-package failures across all sweeps.
    pub package_failures: u64,
}

/// Periodic expiry worker.
#[derive(Debug)]
pub struct ExpiryWorker<S> {
    sweeper: Arc<S>,
    interval: Duration,
}

impl<S: ExpirySweep> ExpiryWorker<S> {
    /// Creates a worker that sweeps every `interval`.
    #[must_use]
    pub const fn new(sweeper: Arc<S>, interval: Duration) -> Self {
        Self { sweeper, interval }
    }

    /// Runs sweeps until `shutdown` resolves.
    ///
    /// A sweep already in progress when shutdown is requested is allowed to
    /// finish.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_secs = self.interval.as_secs(), "expiry worker started");
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = ticker.tick() => self.run_once(&mut summary).await,
            }
        }
        info!(
            sweeps = summary.sweeps,
            expired = summary.expired,
            "expiry worker stopped"
        );
        summary
    }

    async fn run_once(&self, summary: &mut WorkerSummary) {
        summary.sweeps += 1;
        match self.sweeper.sweep().await {
            Ok(report) => {
                info!(
                    sweep = summary.sweeps,
                    expired = report.expired.len(),
                    failed = report.failures.len(),
                    "expiry sweep completed"
                );
                summary.expired += u64::try_from(report.expired.len()).unwrap_or(u64::MAX);
                summary.package_failures +=
                    u64::try_from(report.failures.len()).unwrap_or(u64::MAX);
            }
            Err(err) => {
                summary.failed_sweeps += 1;
                error!(kind = %err.kind(), error = %err, "expiry sweep failed");
            }
        }
    }
}
