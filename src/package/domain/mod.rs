//! Domain model for package pickup tracking.
//!
//! The package domain models creation, the forward-only status lifecycle and
//! the aggregated counters while keeping all infrastructure concerns outside
//! of the domain boundary.

mod error;
mod ids;
mod package;
mod stats;

pub use error::{PackageDomainError, ParsePackageStatusError};
pub use ids::{DriverCode, OrderReference, PackageId};
pub use package::{Package, PackageStatus, PersistedPackageData};
pub use stats::PackageStats;
