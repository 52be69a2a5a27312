//! Error types for package domain validation and parsing.

use super::{PackageId, PackageStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain package values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PackageDomainError {
    /// The order reference is empty after trimming.
    #[error("order reference must not be empty")]
    EmptyOrderReference,

    /// The order reference does not fit the persisted column.
    #[error("order reference is {length} characters, maximum is {max}")]
    OrderReferenceTooLong {
        /// Length of the rejected value in characters.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The requested status change is not permitted by the lifecycle.
    #[error("invalid status transition for package {package_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Package whose transition was rejected.
        package_id: PackageId,
        /// Current status.
        from: PackageStatus,
        /// Requested status.
        to: PackageStatus,
    },
}

impl PackageDomainError {
    /// Returns `true` for input-shape failures, as opposed to lifecycle
    /// rejections.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyOrderReference | Self::OrderReferenceTooLong { .. }
        )
    }
}

/// Error returned while parsing package statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown package status: {0}")]
pub struct ParsePackageStatusError(pub String);
