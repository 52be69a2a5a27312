//! Repository port for package persistence, lookup and aggregation.

use crate::package::domain::{OrderReference, Package, PackageId, PackageStats, PackageStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for package repository operations.
pub type PackageRepositoryResult<T> = Result<T, PackageRepositoryError>;

/// Paging and filtering options for package listings.
///
/// Listings are ordered newest `created_at` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageListQuery {
    limit: u32,
    offset: u64,
    status: Option<PackageStatus>,
}

impl PackageListQuery {
    /// Page size used when none (or a non-positive one) is requested.
    pub const DEFAULT_LIMIT: u32 = 50;
    /// Largest page size served.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a query from raw paging input.
    ///
    /// A missing or non-positive `limit` becomes [`Self::DEFAULT_LIMIT`] and
    /// values above [`Self::MAX_LIMIT`] are capped. A missing or negative
    /// `offset` becomes zero.
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let clamped_limit = match limit {
            Some(value) if value > 0 => {
                u32::try_from(value.min(i64::from(Self::MAX_LIMIT))).unwrap_or(Self::MAX_LIMIT)
            }
            _ => Self::DEFAULT_LIMIT,
        };
        let clamped_offset = offset
            .and_then(|value| u64::try_from(value).ok())
            .unwrap_or(0);
        Self {
            limit: clamped_limit,
            offset: clamped_offset,
            status: None,
        }
    }

    /// Restricts the listing to packages in `status`.
    #[must_use]
    pub const fn with_status(mut self, status: PackageStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the clamped page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the clamped offset.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the status filter, if any.
    #[must_use]
    pub const fn status(&self) -> Option<PackageStatus> {
        self.status
    }
}

impl Default for PackageListQuery {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Package persistence contract.
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Stores a new package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::DuplicatePackage`] when the package
    /// ID already exists or
    /// [`PackageRepositoryError::DuplicateOrderReference`] when the order
    /// reference is already taken.
    async fn store(&self, package: &Package) -> PackageRepositoryResult<()>;

    /// Persists the mutable fields of an existing package.
    ///
    /// The stored row must be at `package.version() - 1`; the write moves it
    /// to `package.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::NotFound`] when the package does not
    /// exist and [`PackageRepositoryError::VersionConflict`] when another
    /// writer updated it first.
    async fn update(&self, package: &Package) -> PackageRepositoryResult<()>;

    /// Removes a package unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::NotFound`] when the package does not
    /// exist.
    async fn delete(&self, id: PackageId) -> PackageRepositoryResult<()>;

    /// Finds a package by identifier.
    ///
    /// Returns `None` when the package does not exist.
    async fn find_by_id(&self, id: PackageId) -> PackageRepositoryResult<Option<Package>>;

    /// Finds a package by its exact order reference.
    ///
    /// Returns `None` when no package carries the reference.
    async fn find_by_order_reference(
        &self,
        order_reference: &OrderReference,
    ) -> PackageRepositoryResult<Option<Package>>;

    /// Returns one page of packages, newest first.
    async fn list(&self, query: PackageListQuery) -> PackageRepositoryResult<Vec<Package>>;

    /// Counts packages overall and per status.
    async fn count_by_status(&self) -> PackageRepositoryResult<PackageStats>;

    /// Returns every `Waiting` or `Picked` package created before `cutoff`.
    async fn find_stale(&self, cutoff: DateTime<Utc>) -> PackageRepositoryResult<Vec<Package>>;
}

/// Errors returned by package repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PackageRepositoryError {
    /// A package with the same identifier already exists.
    #[error("duplicate package identifier: {0}")]
    DuplicatePackage(PackageId),

    /// A package with the same order reference already exists.
    #[error("order reference already exists: {0}")]
    DuplicateOrderReference(OrderReference),

    /// The package was not found.
    #[error("package not found: {0}")]
    NotFound(PackageId),

    /// The stored package moved past the version the caller loaded.
    #[error("package {package_id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// Package that failed to update.
        package_id: PackageId,
        /// Version the caller expected to find in storage.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PackageRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
