//! Then steps for package status BDD scenarios.

use super::world::{PackageStatusWorld, run_async};
use pickup_queue::package::{
    domain::{PackageDomainError, PackageStatus},
    services::PackageLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the package status is "{status}""#)]
fn package_status_is(world: &PackageStatusWorld, status: String) -> Result<(), eyre::Report> {
    let expected = PackageStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let id = world.package()?.id();
    let package = run_async(world.service.get(id))
        .map_err(|err| eyre::eyre!("reload package {id} from the store: {err}"))?;

    if package.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            package.status().as_str()
        ));
    }
    Ok(())
}

#[then("the package has a pickup timestamp")]
fn has_pickup_timestamp(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(world.package()?.picked_up_at().is_some(), "missing picked_up_at");
    Ok(())
}

#[then("the package has a hand-over timestamp")]
fn has_hand_over_timestamp(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.package()?.handed_over_at().is_some(),
        "missing handed_over_at"
    );
    Ok(())
}

#[then("the package has an expiry timestamp")]
fn has_expiry_timestamp(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(world.package()?.expired_at().is_some(), "missing expired_at");
    Ok(())
}

#[then("the update fails with an invalid transition error")]
fn update_fails_with_invalid_transition(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;

    if !matches!(
        result,
        Err(PackageLifecycleError::Domain(
            PackageDomainError::InvalidStatusTransition { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidStatusTransition error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the update fails with an invalid status error")]
fn update_fails_with_invalid_status(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;

    if !matches!(result, Err(PackageLifecycleError::InvalidStatus(_))) {
        return Err(eyre::eyre!("expected InvalidStatus error, got {result:?}"));
    }
    Ok(())
}

#[then("the stored package is unchanged")]
fn stored_package_is_unchanged(world: &PackageStatusWorld) -> Result<(), eyre::Report> {
    let expected = world.package()?;
    let stored = run_async(world.service.get(expected.id()))
        .map_err(|err| eyre::eyre!("reload package from the store: {err}"))?;
    eyre::ensure!(
        &stored == expected,
        "stored package changed after a rejected update: {stored:?}"
    );
    Ok(())
}
