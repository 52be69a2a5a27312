//! `PostgreSQL` repository implementation for package storage.

use super::{
    models::{NewPackageRow, PackageChangeset, PackageRow},
    schema::packages,
};
use crate::package::{
    domain::{
        DriverCode, OrderReference, Package, PackageId, PackageStats, PackageStatus,
        PersistedPackageData,
    },
    ports::{PackageListQuery, PackageRepository, PackageRepositoryError, PackageRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::time::Instant;
use tracing::debug;

/// `PostgreSQL` connection pool type used by package adapters.
pub type PackagePgPool = Pool<ConnectionManager<PgConnection>>;

const ORDER_REFERENCE_UNIQUE_INDEX: &str = "idx_packages_order_reference_unique";

/// `PostgreSQL`-backed package repository.
#[derive(Debug, Clone)]
pub struct PostgresPackageRepository {
    pool: PackagePgPool,
}

impl PostgresPackageRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PackagePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: &'static str, f: F) -> PackageRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PackageRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PackageRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PackageRepositoryError::persistence)?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            operation,
            elapsed_ms,
            ok = result.is_ok(),
            "package query finished"
        );
        result
    }
}

#[async_trait]
impl PackageRepository for PostgresPackageRepository {
    async fn store(&self, package: &Package) -> PackageRepositoryResult<()> {
        let package_id = package.id();
        let order_reference = package.order_reference().clone();
        let new_row = to_new_row(package)?;

        self.run_blocking("store", move |connection| {
            // The unique index remains the source of truth; this pre-check
            // only yields a precise error outside the insert race window.
            let existing = find_row_by_order_reference(connection, &order_reference)?;
            if existing.is_some() {
                return Err(PackageRepositoryError::DuplicateOrderReference(
                    order_reference,
                ));
            }

            diesel::insert_into(packages::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_order_reference_unique_violation(info.as_ref()) =>
                    {
                        PackageRepositoryError::DuplicateOrderReference(order_reference.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PackageRepositoryError::DuplicatePackage(package_id)
                    }
                    _ => PackageRepositoryError::persistence(err),
                })?;

            Ok(())
        })
        .await
    }

    async fn update(&self, package: &Package) -> PackageRepositoryResult<()> {
        let package_id = package.id();
        let expected = package
            .version()
            .checked_sub(1)
            .ok_or(PackageRepositoryError::VersionConflict {
                package_id,
                expected: 0,
            })?;
        let expected_db = to_db_version(expected)?;
        let changeset = to_changeset(package)?;

        self.run_blocking("update", move |connection| {
            let updated = diesel::update(
                packages::table
                    .filter(packages::id.eq(package_id.into_inner()))
                    .filter(packages::version.eq(expected_db)),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(PackageRepositoryError::persistence)?;

            if updated > 0 {
                return Ok(());
            }

            let exists = packages::table
                .filter(packages::id.eq(package_id.into_inner()))
                .select(packages::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(PackageRepositoryError::persistence)?
                .is_some();
            if exists {
                Err(PackageRepositoryError::VersionConflict {
                    package_id,
                    expected,
                })
            } else {
                Err(PackageRepositoryError::NotFound(package_id))
            }
        })
        .await
    }

    async fn delete(&self, id: PackageId) -> PackageRepositoryResult<()> {
        self.run_blocking("delete", move |connection| {
            let deleted =
                diesel::delete(packages::table.filter(packages::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(PackageRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(PackageRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: PackageId) -> PackageRepositoryResult<Option<Package>> {
        self.run_blocking("find_by_id", move |connection| {
            let row = packages::table
                .filter(packages::id.eq(id.into_inner()))
                .select(PackageRow::as_select())
                .first::<PackageRow>(connection)
                .optional()
                .map_err(PackageRepositoryError::persistence)?;
            row.map(row_to_package).transpose()
        })
        .await
    }

    async fn find_by_order_reference(
        &self,
        order_reference: &OrderReference,
    ) -> PackageRepositoryResult<Option<Package>> {
        let lookup = order_reference.clone();
        self.run_blocking("find_by_order_reference", move |connection| {
            let row = find_row_by_order_reference(connection, &lookup)?;
            row.map(row_to_package).transpose()
        })
        .await
    }

    async fn list(&self, query: PackageListQuery) -> PackageRepositoryResult<Vec<Package>> {
        let offset = i64::try_from(query.offset()).map_err(PackageRepositoryError::persistence)?;
        let limit = i64::from(query.limit());

        self.run_blocking("list", move |connection| {
            let mut statement = packages::table
                .select(PackageRow::as_select())
                .into_boxed();
            if let Some(status) = query.status() {
                statement = statement.filter(packages::status.eq(status.as_str()));
            }

            let rows = statement
                .order((packages::created_at.desc(), packages::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<PackageRow>(connection)
                .map_err(PackageRepositoryError::persistence)?;
            rows.into_iter().map(row_to_package).collect()
        })
        .await
    }

    async fn count_by_status(&self) -> PackageRepositoryResult<PackageStats> {
        self.run_blocking("count_by_status", move |connection| {
            let counts = packages::table
                .group_by(packages::status)
                .select((packages::status, count_star()))
                .load::<(String, i64)>(connection)
                .map_err(PackageRepositoryError::persistence)?;

            let mut stats = PackageStats::default();
            for (persisted_status, count) in counts {
                let status = PackageStatus::try_from(persisted_status.as_str())
                    .map_err(PackageRepositoryError::persistence)?;
                let tally = u64::try_from(count).map_err(PackageRepositoryError::persistence)?;
                stats.add(status, tally);
            }
            Ok(stats)
        })
        .await
    }

    async fn find_stale(&self, cutoff: DateTime<Utc>) -> PackageRepositoryResult<Vec<Package>> {
        let expirable: Vec<&'static str> = PackageStatus::ALL
            .into_iter()
            .filter(|status| status.is_expirable())
            .map(PackageStatus::as_str)
            .collect();

        self.run_blocking("find_stale", move |connection| {
            let rows = packages::table
                .filter(packages::status.eq_any(expirable))
                .filter(packages::created_at.lt(cutoff))
                .order((packages::created_at.desc(), packages::id.asc()))
                .select(PackageRow::as_select())
                .load::<PackageRow>(connection)
                .map_err(PackageRepositoryError::persistence)?;
            rows.into_iter().map(row_to_package).collect()
        })
        .await
    }
}

fn to_db_version(version: u64) -> PackageRepositoryResult<i64> {
    i64::try_from(version).map_err(PackageRepositoryError::persistence)
}

fn to_new_row(package: &Package) -> PackageRepositoryResult<NewPackageRow> {
    Ok(NewPackageRow {
        id: package.id().into_inner(),
        order_reference: package.order_reference().as_str().to_owned(),
        driver_code: package.driver_code().map(|code| code.as_str().to_owned()),
        status: package.status().as_str().to_owned(),
        created_at: package.created_at(),
        updated_at: package.updated_at(),
        picked_up_at: package.picked_up_at(),
        handed_over_at: package.handed_over_at(),
        expired_at: package.expired_at(),
        version: to_db_version(package.version())?,
    })
}

fn to_changeset(package: &Package) -> PackageRepositoryResult<PackageChangeset> {
    Ok(PackageChangeset {
        status: package.status().as_str().to_owned(),
        updated_at: package.updated_at(),
        picked_up_at: package.picked_up_at(),
        handed_over_at: package.handed_over_at(),
        expired_at: package.expired_at(),
        version: to_db_version(package.version())?,
    })
}

fn row_to_package(row: PackageRow) -> PackageRepositoryResult<Package> {
    let PackageRow {
        id,
        order_reference: persisted_order_reference,
        driver_code,
        status: persisted_status,
        created_at,
        updated_at,
        picked_up_at,
        handed_over_at,
        expired_at,
        version: persisted_version,
    } = row;

    let order_reference = OrderReference::new(persisted_order_reference)
        .map_err(PackageRepositoryError::persistence)?;
    let status = PackageStatus::try_from(persisted_status.as_str())
        .map_err(PackageRepositoryError::persistence)?;
    let version = u64::try_from(persisted_version).map_err(PackageRepositoryError::persistence)?;

    let data = PersistedPackageData {
        id: PackageId::from_uuid(id),
        order_reference,
        driver_code: driver_code.and_then(DriverCode::parse),
        status,
        created_at,
        updated_at,
        picked_up_at,
        handed_over_at,
        expired_at,
        version,
    };
    Ok(Package::from_persisted(data))
}

fn is_order_reference_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == ORDER_REFERENCE_UNIQUE_INDEX)
}

fn find_row_by_order_reference(
    connection: &mut PgConnection,
    order_reference: &OrderReference,
) -> PackageRepositoryResult<Option<PackageRow>> {
    packages::table
        .filter(packages::order_reference.eq(order_reference.as_str()))
        .select(PackageRow::as_select())
        .first::<PackageRow>(connection)
        .optional()
        .map_err(PackageRepositoryError::persistence)
}
