//! Package aggregate root and its status lifecycle.

use super::{DriverCode, OrderReference, PackageDomainError, PackageId, ParsePackageStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pickup status of a package.
///
/// Statuses only move forward: `Waiting` to `Picked` or `Expired`, and
/// `Picked` to `HandedOver` or `Expired`. `HandedOver` and `Expired` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Package is waiting in the pickup queue.
    Waiting,
    /// Package has been picked from the shelf.
    Picked,
    /// Package has been handed over to the driver.
    HandedOver,
    /// Package was not collected in time.
    Expired,
}

impl PackageStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Waiting, Self::Picked, Self::HandedOver, Self::Expired];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Picked => "PICKED",
            Self::HandedOver => "HANDED_OVER",
            Self::Expired => "EXPIRED",
        }
    }

    /// Returns whether a package in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Picked | Self::Expired)
                | (Self::Picked, Self::HandedOver | Self::Expired)
        )
    }

    /// Returns whether no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HandedOver | Self::Expired)
    }

    /// Returns whether the expiry sweep considers packages in this status.
    #[must_use]
    pub const fn is_expirable(self) -> bool {
        matches!(self, Self::Waiting | Self::Picked)
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PackageStatus {
    type Error = ParsePackageStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "WAITING" => Ok(Self::Waiting),
            "PICKED" => Ok(Self::Picked),
            "HANDED_OVER" => Ok(Self::HandedOver),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(ParsePackageStatusError(value.to_owned())),
        }
    }
}

/// Package aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    id: PackageId,
    order_reference: OrderReference,
    #[serde(default, deserialize_with = "DriverCode::deserialize_optional")]
    driver_code: Option<DriverCode>,
    status: PackageStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    picked_up_at: Option<DateTime<Utc>>,
    handed_over_at: Option<DateTime<Utc>>,
    expired_at: Option<DateTime<Utc>>,
    version: u64,
}

/// Parameter object for reconstructing a persisted package aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPackageData {
    /// Persisted package identifier.
    pub id: PackageId,
    /// Persisted order reference.
    pub order_reference: OrderReference,
    /// Persisted driver code, if any.
    pub driver_code: Option<DriverCode>,
    /// Persisted pickup status.
    pub status: PackageStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// When the package was first picked.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// When the package was first handed over.
    pub handed_over_at: Option<DateTime<Utc>>,
    /// When the package expired.
    pub expired_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Package {
    /// Creates a new package in the [`PackageStatus::Waiting`] status.
    #[must_use]
    pub fn new(
        order_reference: OrderReference,
        driver_code: Option<DriverCode>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PackageId::new(),
            order_reference,
            driver_code,
            status: PackageStatus::Waiting,
            created_at: timestamp,
            updated_at: timestamp,
            picked_up_at: None,
            handed_over_at: None,
            expired_at: None,
            version: 0,
        }
    }

    /// Reconstructs a package from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPackageData) -> Self {
        Self {
            id: data.id,
            order_reference: data.order_reference,
            driver_code: data.driver_code,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            picked_up_at: data.picked_up_at,
            handed_over_at: data.handed_over_at,
            expired_at: data.expired_at,
            version: data.version,
        }
    }

    /// Returns the package identifier.
    #[must_use]
    pub const fn id(&self) -> PackageId {
        self.id
    }

    /// Returns the order reference.
    #[must_use]
    pub const fn order_reference(&self) -> &OrderReference {
        &self.order_reference
    }

    /// Returns the driver code, if any.
    #[must_use]
    pub const fn driver_code(&self) -> Option<&DriverCode> {
        self.driver_code.as_ref()
    }

    /// Returns the pickup status.
    #[must_use]
    pub const fn status(&self) -> PackageStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when the package was picked, if it has been.
    #[must_use]
    pub const fn picked_up_at(&self) -> Option<DateTime<Utc>> {
        self.picked_up_at
    }

    /// Returns when the package was handed over, if it has been.
    #[must_use]
    pub const fn handed_over_at(&self) -> Option<DateTime<Utc>> {
        self.handed_over_at
    }

    /// Returns when the package expired, if it has.
    #[must_use]
    pub const fn expired_at(&self) -> Option<DateTime<Utc>> {
        self.expired_at
    }

    /// Returns the optimistic concurrency version.
    ///
    /// Starts at zero and increases by one with every transition.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns whether the package is stale relative to `cutoff`.
    #[must_use]
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.status.is_expirable() && self.created_at < cutoff
    }

    /// Moves the package to `next`.
    ///
    /// Stamps `updated_at` and, the first time the package enters `next`,
    /// the matching milestone timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::InvalidStatusTransition`] when the
    /// lifecycle forbids the change. The package is left untouched.
    pub fn transition_to(
        &mut self,
        next: PackageStatus,
        clock: &impl Clock,
    ) -> Result<(), PackageDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(PackageDomainError::InvalidStatusTransition {
                package_id: self.id,
                from: self.status,
                to: next,
            });
        }

        let timestamp = clock.utc();
        let milestone = match next {
            PackageStatus::Picked => Some(&mut self.picked_up_at),
            PackageStatus::HandedOver => Some(&mut self.handed_over_at),
            PackageStatus::Expired => Some(&mut self.expired_at),
            PackageStatus::Waiting => None,
        };
        if let Some(slot) = milestone {
            slot.get_or_insert(timestamp);
        }

        self.status = next;
        self.updated_at = timestamp;
        self.version += 1;
        Ok(())
    }
}
