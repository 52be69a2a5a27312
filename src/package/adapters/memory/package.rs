//! In-memory repository for package tracking tests and tooling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::package::{
    domain::{OrderReference, Package, PackageId, PackageStats},
    ports::{PackageListQuery, PackageRepository, PackageRepositoryError, PackageRepositoryResult},
};

/// Thread-safe in-memory package repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageRepository {
    state: Arc<RwLock<InMemoryPackageState>>,
}

#[derive(Debug, Default)]
struct InMemoryPackageState {
    packages: HashMap<PackageId, Package>,
    order_reference_index: HashMap<OrderReference, PackageId>,
}

impl InMemoryPackageRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored packages.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn len(&self) -> PackageRepositoryResult<usize> {
        Ok(self.read()?.packages.len())
    }

    /// Returns `true` when no packages are stored.
    ///
    /// # Errors
    ///
    /// Returns [`PackageRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn is_empty(&self) -> PackageRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> PackageRepositoryResult<RwLockReadGuard<'_, InMemoryPackageState>> {
        self.state.read().map_err(|err| {
            PackageRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> PackageRepositoryResult<RwLockWriteGuard<'_, InMemoryPackageState>> {
        self.state.write().map_err(|err| {
            PackageRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Sorts packages newest first, breaking ties by identifier.
fn sort_newest_first(packages: &mut [Package]) {
    packages.sort_by_key(|package| (Reverse(package.created_at()), package.id()));
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn store(&self, package: &Package) -> PackageRepositoryResult<()> {
        let mut state = self.write()?;
        if state.packages.contains_key(&package.id()) {
            return Err(PackageRepositoryError::DuplicatePackage(package.id()));
        }

        let order_reference = package.order_reference().clone();
        if state.order_reference_index.contains_key(&order_reference) {
            return Err(PackageRepositoryError::DuplicateOrderReference(
                order_reference,
            ));
        }

        state
            .order_reference_index
            .insert(order_reference, package.id());
        state.packages.insert(package.id(), package.clone());
        Ok(())
    }

    async fn update(&self, package: &Package) -> PackageRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .packages
            .get_mut(&package.id())
            .ok_or(PackageRepositoryError::NotFound(package.id()))?;

        let expected = package.version().saturating_sub(1);
        if stored.version() != expected || package.version() == 0 {
            return Err(PackageRepositoryError::VersionConflict {
                package_id: package.id(),
                expected,
            });
        }

        *stored = package.clone();
        Ok(())
    }

    async fn delete(&self, id: PackageId) -> PackageRepositoryResult<()> {
        let mut state = self.write()?;
        let removed = state
            .packages
            .remove(&id)
            .ok_or(PackageRepositoryError::NotFound(id))?;
        state
            .order_reference_index
            .remove(removed.order_reference());
        Ok(())
    }

    async fn find_by_id(&self, id: PackageId) -> PackageRepositoryResult<Option<Package>> {
        let state = self.read()?;
        Ok(state.packages.get(&id).cloned())
    }

    async fn find_by_order_reference(
        &self,
        order_reference: &OrderReference,
    ) -> PackageRepositoryResult<Option<Package>> {
        let state = self.read()?;
        let package = state
            .order_reference_index
            .get(order_reference)
            .and_then(|id| state.packages.get(id))
            .cloned();
        Ok(package)
    }

    async fn list(&self, query: PackageListQuery) -> PackageRepositoryResult<Vec<Package>> {
        let state = self.read()?;
        let mut matching: Vec<Package> = state
            .packages
            .values()
            .filter(|package| query.status().is_none_or(|status| package.status() == status))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);

        let skip = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(skip).take(take).collect())
    }

    async fn count_by_status(&self) -> PackageRepositoryResult<PackageStats> {
        let state = self.read()?;
        let mut stats = PackageStats::default();
        for package in state.packages.values() {
            stats.record(package.status());
        }
        Ok(stats)
    }

    async fn find_stale(&self, cutoff: DateTime<Utc>) -> PackageRepositoryResult<Vec<Package>> {
        let state = self.read()?;
        let mut stale: Vec<Package> = state
            .packages
            .values()
            .filter(|package| package.is_stale(cutoff))
            .cloned()
            .collect();
        sort_newest_first(&mut stale);
        Ok(stale)
    }
}
