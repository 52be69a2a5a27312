//! `PostgreSQL` package repository tests.

use super::helpers::{
    BoxError, PostgresCluster, TestDatabase, aged_package, repository_for, shared_test_cluster,
    test_runtime,
};
use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use pickup_queue::package::{
    domain::{OrderReference, Package, PackageId, PackageStatus},
    ports::{PackageListQuery, PackageRepository, PackageRepositoryError},
};
use rstest::rstest;

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn store_and_lookup_round_trip(shared_test_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let package = aged_package("ORD-PG-1", PackageStatus::Waiting, TimeDelta::hours(1))?;

    test_runtime()?.block_on(async {
        repo.store(&package).await?;

        let by_id = repo.find_by_id(package.id()).await?;
        assert_eq!(by_id.as_ref(), Some(&package));
        let reference = OrderReference::new("ORD-PG-1")?;
        let by_reference = repo.find_by_order_reference(&reference).await?;
        assert_eq!(by_reference.as_ref(), Some(&package));
        assert!(repo.find_by_id(PackageId::new()).await?.is_none());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn unique_index_rejects_duplicate_order_reference(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let first = aged_package("ORD-PG-DUP", PackageStatus::Waiting, TimeDelta::hours(2))?;
    let duplicate = aged_package("ORD-PG-DUP", PackageStatus::Waiting, TimeDelta::hours(1))?;

    test_runtime()?.block_on(async {
        repo.store(&first).await?;

        let result = repo.store(&duplicate).await;

        assert!(matches!(
            result,
            Err(PackageRepositoryError::DuplicateOrderReference(_))
        ));
        assert_eq!(repo.count_by_status().await?.total, 1);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn update_enforces_version_counter(shared_test_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let package = aged_package("ORD-PG-VER", PackageStatus::Waiting, TimeDelta::hours(1))?;
    let mut winner = package.clone();
    winner.transition_to(PackageStatus::Picked, &DefaultClock)?;
    let mut loser = package.clone();
    loser.transition_to(PackageStatus::Expired, &DefaultClock)?;

    test_runtime()?.block_on(async {
        repo.store(&package).await?;
        repo.update(&winner).await?;

        let result = repo.update(&loser).await;
        assert!(matches!(
            result,
            Err(PackageRepositoryError::VersionConflict { expected: 0, .. })
        ));

        let stored = repo
            .find_by_id(winner.id())
            .await?
            .ok_or("package disappeared")?;
        assert_eq!(stored.status(), PackageStatus::Picked);
        assert_eq!(stored.version(), 1);
        assert!(stored.picked_up_at().is_some());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn update_and_delete_report_missing_rows(
    shared_test_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let mut package = aged_package("ORD-PG-NONE", PackageStatus::Waiting, TimeDelta::hours(1))?;
    package.transition_to(PackageStatus::Picked, &DefaultClock)?;

    test_runtime()?.block_on(async {
        assert!(matches!(
            repo.update(&package).await,
            Err(PackageRepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(package.id()).await,
            Err(PackageRepositoryError::NotFound(_))
        ));
        Ok::<(), BoxError>(())
    })
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn list_count_and_stale_queries(shared_test_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let stale_waiting = aged_package("ORD-PG-A", PackageStatus::Waiting, TimeDelta::hours(30))?;
    let stale_picked = aged_package("ORD-PG-B", PackageStatus::Picked, TimeDelta::hours(26))?;
    let fresh = aged_package("ORD-PG-C", PackageStatus::Waiting, TimeDelta::hours(1))?;
    let done = aged_package("ORD-PG-D", PackageStatus::HandedOver, TimeDelta::hours(50))?;

    test_runtime()?.block_on(async {
        for package in [&stale_waiting, &stale_picked, &fresh, &done] {
            repo.store(package).await?;
        }

        let listed: Vec<PackageId> = repo
            .list(PackageListQuery::default())
            .await?
            .iter()
            .map(Package::id)
            .collect();
        assert_eq!(
            listed,
            vec![fresh.id(), stale_picked.id(), stale_waiting.id(), done.id()]
        );

        let waiting: Vec<PackageId> = repo
            .list(PackageListQuery::new(Some(1), Some(1)).with_status(PackageStatus::Waiting))
            .await?
            .iter()
            .map(Package::id)
            .collect();
        assert_eq!(waiting, vec![stale_waiting.id()]);

        let stats = repo.count_by_status().await?;
        assert_eq!(
            (stats.total, stats.waiting, stats.picked, stats.handed_over, stats.expired),
            (4, 2, 1, 1, 0)
        );

        let stale: Vec<PackageId> = repo
            .find_stale(Utc::now() - TimeDelta::hours(24))
            .await?
            .iter()
            .map(Package::id)
            .collect();
        assert_eq!(stale, vec![stale_picked.id(), stale_waiting.id()]);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL server"]
fn list_caps_page_size(shared_test_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::create(shared_test_cluster)?;
    let repo = repository_for(&database)?;
    let packages = (0..105_i64)
        .map(|index| {
            aged_package(
                &format!("ORD-PG-BULK-{index}"),
                PackageStatus::Waiting,
                TimeDelta::minutes(index),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    test_runtime()?.block_on(async {
        for package in &packages {
            repo.store(package).await?;
        }

        let capped = repo
            .list(PackageListQuery::new(Some(i64::MAX), Some(-1)))
            .await?;
        assert_eq!(capped.len(), 100);
        let beyond = repo
            .list(PackageListQuery::new(Some(10), Some(i64::MAX)))
            .await?;
        assert!(beyond.is_empty());
        Ok::<(), BoxError>(())
    })
}
