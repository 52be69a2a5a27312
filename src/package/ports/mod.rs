//! Port contracts for package pickup tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by package services.

pub mod repository;

pub use repository::{
    PackageListQuery, PackageRepository, PackageRepositoryError, PackageRepositoryResult,
};
