//! Aggregated package counters.

use super::PackageStatus;
use serde::{Deserialize, Serialize};

/// Package counts, overall and per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStats {
    /// Number of packages in the store.
    pub total: u64,
    /// Packages in [`PackageStatus::Waiting`].
    pub waiting: u64,
    /// Packages in [`PackageStatus::Picked`].
    pub picked: u64,
    /// Packages in [`PackageStatus::HandedOver`].
    pub handed_over: u64,
    /// Packages in [`PackageStatus::Expired`].
    pub expired: u64,
}

impl PackageStats {
    /// Counts one package in the given status.
    pub const fn record(&mut self, status: PackageStatus) {
        self.add(status, 1);
    }

    /// Adds `count` packages in the given status.
    pub const fn add(&mut self, status: PackageStatus, count: u64) {
        self.total += count;
        match status {
            PackageStatus::Waiting => self.waiting += count,
            PackageStatus::Picked => self.picked += count,
            PackageStatus::HandedOver => self.handed_over += count,
            PackageStatus::Expired => self.expired += count,
        }
    }

    /// Returns the count for a single status.
    #[must_use]
    pub const fn count(&self, status: PackageStatus) -> u64 {
        match status {
            PackageStatus::Waiting => self.waiting,
            PackageStatus::Picked => self.picked,
            PackageStatus::HandedOver => self.handed_over,
            PackageStatus::Expired => self.expired,
        }
    }
}
