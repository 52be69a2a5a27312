//! Expiry sweep over stale packages.
//!
//! A package is stale once it has sat in `Waiting` or `Picked` for longer
//! than the service's expiry threshold. The sweep is best-effort: a failure
//! on one package is recorded and the remaining packages are still
//! processed.

use super::lifecycle::{PackageLifecycleError, PackageLifecycleResult, PackageLifecycleService};
use crate::package::{
    domain::{PackageId, PackageStatus},
    ports::PackageRepository,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

/// Package the sweep could not expire, with the reason.
#[derive(Debug)]
pub struct SweepFailure {
    /// Package that failed to expire.
    pub package_id: PackageId,
    /// Error returned for that package.
    pub error: PackageLifecycleError,
}

/// Outcome of a single expiry sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Packages moved to [`PackageStatus::Expired`].
    pub expired: Vec<PackageId>,
    /// Packages that could not be expired.
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Returns the number of stale packages the sweep looked at.
    #[must_use]
    pub fn scanned(&self) -> usize {
        self.expired.len() + self.failures.len()
    }

    /// Returns `true` when every stale package was expired.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<R, C> PackageLifecycleService<R, C>
where
    R: PackageRepository,
    C: Clock + Send + Sync,
{
    /// Returns the creation time before which active packages are stale.
    #[must_use]
    pub fn stale_cutoff(&self) -> DateTime<Utc> {
        self.clock
            .utc()
            .checked_sub_signed(self.expiry_threshold)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Expires every stale package.
    ///
    /// Per-package failures are logged and collected in the report rather
    /// than aborting the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::Repository`] only when the stale
    /// packages cannot be listed at all.
    pub async fn sweep_expired(&self) -> PackageLifecycleResult<SweepReport> {
        let cutoff = self.stale_cutoff();
        let stale = self.repository.find_stale(cutoff).await?;
        let mut report = SweepReport::default();

        for package in stale {
            let package_id = package.id();
            match self.update_status(package_id, PackageStatus::Expired).await {
                Ok(_) => report.expired.push(package_id),
                Err(error) => {
                    warn!(
                        package_id = %package_id,
                        kind = %error.kind(),
                        %error,
                        "failed to expire stale package"
                    );
                    report.failures.push(SweepFailure { package_id, error });
                }
            }
        }

        info!(
            %cutoff,
            expired = report.expired.len(),
            failed = report.failures.len(),
            "expiry sweep finished"
        );
        Ok(report)
    }
}
