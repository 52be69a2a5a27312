//! Given steps for package status BDD scenarios.

use super::world::{PackageStatusWorld, run_async};
use chrono::{TimeDelta, Utc};
use eyre::WrapErr;
use pickup_queue::package::{
    domain::{OrderReference, Package, PackageId, PackageStatus, PersistedPackageData},
    ports::PackageRepository,
    services::CreatePackageRequest,
};
use rstest_bdd_macros::given;

#[given(r#"a package with order reference "{order_reference}" for driver "{driver_code}""#)]
fn registered_package(
    world: &mut PackageStatusWorld,
    order_reference: String,
    driver_code: String,
) -> Result<(), eyre::Report> {
    let request = CreatePackageRequest::new(order_reference).with_driver_code(driver_code);
    let created = run_async(world.service.create(request)).wrap_err("register package")?;
    world.last_package = Some(created);
    Ok(())
}

#[given(r#"a package with order reference "{order_reference}" created {hours:i64} hours ago"#)]
fn aged_package(
    world: &mut PackageStatusWorld,
    order_reference: String,
    hours: i64,
) -> Result<(), eyre::Report> {
    let created_at = Utc::now() - TimeDelta::hours(hours);
    let package = Package::from_persisted(PersistedPackageData {
        id: PackageId::new(),
        order_reference: OrderReference::new(order_reference)?,
        driver_code: None,
        status: PackageStatus::Waiting,
        created_at,
        updated_at: created_at,
        picked_up_at: None,
        handed_over_at: None,
        expired_at: None,
        version: 0,
    });
    run_async(world.repository.store(&package)).wrap_err("seed aged package")?;
    world.last_package = Some(package);
    Ok(())
}

#[given(r#"the package has been moved to "{status}""#)]
fn package_has_been_moved(
    world: &mut PackageStatusWorld,
    status: String,
) -> Result<(), eyre::Report> {
    let id = world.package()?.id();
    let updated = run_async(world.service.update_status_named(id, &status))
        .wrap_err("move package in scenario setup")?;
    world.last_package = Some(updated);
    Ok(())
}
