//! In-memory integration tests for the package lifecycle.

use std::sync::Arc;

use mockable::DefaultClock;
use pickup_queue::package::{
    adapters::memory::InMemoryPackageRepository,
    domain::{OrderReference, PackageStatus},
    ports::PackageListQuery,
    services::{CreatePackageRequest, PackageErrorKind, PackageLifecycleService},
};
use rstest::{fixture, rstest};

type TestService = PackageLifecycleService<InMemoryPackageRepository, DefaultClock>;

#[fixture]
fn service() -> TestService {
    PackageLifecycleService::new(
        Arc::new(InMemoryPackageRepository::new()),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_pick_up_and_hand_over(service: TestService) {
    let created = service
        .create(CreatePackageRequest::new("ORD-1").with_driver_code("DRV-1"))
        .await
        .expect("package registration should succeed");
    assert_eq!(created.status(), PackageStatus::Waiting);

    let picked = service
        .update_status(created.id(), PackageStatus::Picked)
        .await
        .expect("waiting package should be pickable");
    assert!(picked.picked_up_at().is_some());

    let rejected = service
        .update_status(created.id(), PackageStatus::Waiting)
        .await
        .expect_err("picked package must not return to waiting");
    assert_eq!(rejected.kind(), PackageErrorKind::InvalidTransition);

    let handed_over = service
        .update_status(created.id(), PackageStatus::HandedOver)
        .await
        .expect("picked package should be handed over");
    assert!(handed_over.handed_over_at().is_some());
    assert_eq!(handed_over.picked_up_at(), picked.picked_up_at());

    let reference = OrderReference::new("ORD-1").expect("valid order reference");
    let looked_up = service
        .get_by_order_reference(&reference)
        .await
        .expect("lookup by order reference should succeed");
    assert_eq!(looked_up, handed_over);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_registration_is_rejected(service: TestService) {
    service
        .create(CreatePackageRequest::new("ORD-2"))
        .await
        .expect("first registration should succeed");

    let error = service
        .create(CreatePackageRequest::new("ORD-2"))
        .await
        .expect_err("second registration should fail");

    assert_eq!(error.kind(), PackageErrorKind::DuplicateOrderReference);
    let stats = service.stats().await.expect("stats should succeed");
    assert_eq!(stats.total, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_and_listing_reflect_updates(service: TestService) {
    let mut ids = Vec::new();
    for reference in ["ORD-A", "ORD-B", "ORD-C"] {
        let created = service
            .create(CreatePackageRequest::new(reference))
            .await
            .expect("registration should succeed");
        ids.push(created.id());
    }
    let [first, second, third] = ids.as_slice() else {
        panic!("expected three packages");
    };
    service
        .update_status(*first, PackageStatus::Picked)
        .await
        .expect("pick should succeed");
    service
        .update_status(*second, PackageStatus::Expired)
        .await
        .expect("expire should succeed");

    let stats = service.stats().await.expect("stats should succeed");
    assert_eq!(
        (stats.total, stats.waiting, stats.picked, stats.expired),
        (3, 1, 1, 1)
    );

    let waiting = service
        .list(PackageListQuery::default().with_status(PackageStatus::Waiting))
        .await
        .expect("listing should succeed");
    assert_eq!(
        waiting.iter().map(|package| package.id()).collect::<Vec<_>>(),
        vec![*third]
    );

    let everything = service
        .list(PackageListQuery::new(Some(0), Some(-5)))
        .await
        .expect("listing should succeed");
    assert_eq!(everything.len(), 3);
}
