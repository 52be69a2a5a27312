//! Service layer for package creation, lookup and status transitions.

use crate::package::{
    domain::{
        DriverCode, OrderReference, Package, PackageDomainError, PackageId, PackageStats,
        PackageStatus, ParsePackageStatusError,
    },
    ports::{PackageListQuery, PackageRepository, PackageRepositoryError},
};
use chrono::TimeDelta;
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for registering a package in the pickup queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePackageRequest {
    order_reference: String,
    driver_code: Option<String>,
}

impl CreatePackageRequest {
    /// Creates a request for the given order reference.
    #[must_use]
    pub fn new(order_reference: impl Into<String>) -> Self {
        Self {
            order_reference: order_reference.into(),
            driver_code: None,
        }
    }

    /// Sets the driver code.
    #[must_use]
    pub fn with_driver_code(mut self, driver_code: impl Into<String>) -> Self {
        self.driver_code = Some(driver_code.into());
        self
    }
}

/// Key used to look a package up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageKey {
    /// Lookup by internal identifier.
    Id(PackageId),
    /// Lookup by external order reference.
    OrderReference(OrderReference),
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::OrderReference(order_reference) => {
                write!(f, "order reference {order_reference}")
            }
        }
    }
}

/// Caller-facing classification of lifecycle failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageErrorKind {
    /// Input was malformed and never reached the store.
    Validation,
    /// The order reference is already in use.
    DuplicateOrderReference,
    /// The requested package does not exist.
    NotFound,
    /// The status change is not permitted.
    InvalidTransition,
    /// Another writer changed the package first.
    Conflict,
    /// The store failed.
    Store,
}

impl PackageErrorKind {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::DuplicateOrderReference => "duplicate_order_reference",
            Self::NotFound => "not_found",
            Self::InvalidTransition => "invalid_transition",
            Self::Conflict => "conflict",
            Self::Store => "store_error",
        }
    }
}

impl fmt::Display for PackageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for package lifecycle operations.
#[derive(Debug, Error)]
pub enum PackageLifecycleError {
    /// Domain validation or transition rules rejected the request.
    #[error(transparent)]
    Domain(#[from] PackageDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PackageRepositoryError),
    /// No package matches the lookup key.
    #[error("package not found: {0}")]
    NotFound(PackageKey),
    /// A status name supplied by the caller is unknown.
    #[error(transparent)]
    InvalidStatus(#[from] ParsePackageStatusError),
}

impl PackageLifecycleError {
    /// Classifies the error into the signal reported to callers.
    #[must_use]
    pub const fn kind(&self) -> PackageErrorKind {
        match self {
            Self::Domain(error) if error.is_validation() => PackageErrorKind::Validation,
            Self::Domain(_) => PackageErrorKind::InvalidTransition,
            Self::InvalidStatus(_) => PackageErrorKind::Validation,
            Self::Repository(PackageRepositoryError::DuplicateOrderReference(_)) => {
                PackageErrorKind::DuplicateOrderReference
            }
            Self::Repository(PackageRepositoryError::NotFound(_)) | Self::NotFound(_) => {
                PackageErrorKind::NotFound
            }
            Self::Repository(PackageRepositoryError::VersionConflict { .. }) => {
                PackageErrorKind::Conflict
            }
            Self::Repository(
                PackageRepositoryError::DuplicatePackage(_) | PackageRepositoryError::Persistence(_),
            ) => PackageErrorKind::Store,
        }
    }
}

/// Result type for package lifecycle service operations.
pub type PackageLifecycleResult<T> = Result<T, PackageLifecycleError>;

/// Age after which a waiting or picked package is considered stale.
#[must_use]
pub fn default_expiry_threshold() -> TimeDelta {
    TimeDelta::hours(24)
}

/// Package lifecycle orchestration service.
#[derive(Clone)]
pub struct PackageLifecycleService<R, C>
where
    R: PackageRepository,
    C: Clock + Send + Sync,
{
    pub(super) repository: Arc<R>,
    pub(super) clock: Arc<C>,
    pub(super) expiry_threshold: TimeDelta,
}

impl<R, C> PackageLifecycleService<R, C>
where
    R: PackageRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new package lifecycle service with a 24 hour expiry
    /// threshold.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            expiry_threshold: default_expiry_threshold(),
        }
    }

    /// Overrides the age after which the sweep expires packages.
    #[must_use]
    pub fn with_expiry_threshold(mut self, threshold: TimeDelta) -> Self {
        self.expiry_threshold = threshold;
        self
    }

    /// Registers a new package in the [`PackageStatus::Waiting`] status.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::Domain`] when the order reference is
    /// empty (checked before any store access) and
    /// [`PackageRepositoryError::DuplicateOrderReference`] when it is already
    /// taken.
    pub async fn create(&self, request: CreatePackageRequest) -> PackageLifecycleResult<Package> {
        let order_reference = OrderReference::new(request.order_reference)?;
        let driver_code = request.driver_code.and_then(DriverCode::parse);

        if self
            .repository
            .find_by_order_reference(&order_reference)
            .await?
            .is_some()
        {
            return Err(PackageRepositoryError::DuplicateOrderReference(order_reference).into());
        }

        let package = Package::new(order_reference, driver_code, &*self.clock);
        self.repository.store(&package).await?;
        info!(
            package_id = %package.id(),
            order_reference = %package.order_reference(),
            "package registered"
        );
        Ok(package)
    }

    /// Retrieves a package by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::NotFound`] when the package does not
    /// exist, or [`PackageLifecycleError::Repository`] when lookup fails.
    pub async fn get(&self, id: PackageId) -> PackageLifecycleResult<Package> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(PackageLifecycleError::NotFound(PackageKey::Id(id)))
    }

    /// Retrieves a package by order reference.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::NotFound`] when no package carries
    /// the reference, or [`PackageLifecycleError::Repository`] when lookup
    /// fails.
    pub async fn get_by_order_reference(
        &self,
        order_reference: &OrderReference,
    ) -> PackageLifecycleResult<Package> {
        self.repository
            .find_by_order_reference(order_reference)
            .await?
            .ok_or_else(|| {
                PackageLifecycleError::NotFound(PackageKey::OrderReference(order_reference.clone()))
            })
    }

    /// Lists packages newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::Repository`] when the listing fails.
    pub async fn list(&self, query: PackageListQuery) -> PackageLifecycleResult<Vec<Package>> {
        Ok(self.repository.list(query).await?)
    }

    /// Moves a package to `status`, stamping the matching milestone.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::NotFound`] when the package does not
    /// exist, [`PackageDomainError::InvalidStatusTransition`] when the
    /// lifecycle forbids the change, and
    /// [`PackageRepositoryError::VersionConflict`] when a concurrent writer
    /// won.
    pub async fn update_status(
        &self,
        id: PackageId,
        status: PackageStatus,
    ) -> PackageLifecycleResult<Package> {
        let mut package = self.get(id).await?;
        let previous = package.status();
        package.transition_to(status, &*self.clock)?;
        self.repository.update(&package).await?;
        info!(
            package_id = %id,
            from = %previous,
            to = %status,
            "package status updated"
        );
        Ok(package)
    }

    /// Parses a caller-supplied status name and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::InvalidStatus`] for unknown names and
    /// otherwise the errors of [`Self::update_status`].
    pub async fn update_status_named(
        &self,
        id: PackageId,
        status: &str,
    ) -> PackageLifecycleResult<Package> {
        let parsed = PackageStatus::try_from(status)?;
        self.update_status(id, parsed).await
    }

    /// Removes a package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::NotFound`] when the package does not
    /// exist, or [`PackageLifecycleError::Repository`] when deletion fails.
    pub async fn delete(&self, id: PackageId) -> PackageLifecycleResult<()> {
        let package = self.get(id).await?;
        self.repository.delete(package.id()).await?;
        info!(package_id = %id, "package deleted");
        Ok(())
    }

    /// Returns package counts overall and per status.
    ///
    /// # Errors
    ///
    /// Returns [`PackageLifecycleError::Repository`] when aggregation fails.
    pub async fn stats(&self) -> PackageLifecycleResult<PackageStats> {
        Ok(self.repository.count_by_status().await?)
    }
}
