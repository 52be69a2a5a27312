//! Application services for package lifecycle orchestration.

mod expiry;
mod lifecycle;

pub use expiry::{SweepFailure, SweepReport};
pub use lifecycle::{
    CreatePackageRequest, PackageErrorKind, PackageKey, PackageLifecycleError,
    PackageLifecycleResult, PackageLifecycleService, default_expiry_threshold,
};
