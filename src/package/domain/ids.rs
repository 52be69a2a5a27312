//! Identifier and validated scalar types for the package domain.

use super::PackageDomainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tracked package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(Uuid);

impl PackageId {
    /// Creates a new random package identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a package identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PackageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally supplied order reference, unique across all packages.
///
/// Comparison is exact and case-sensitive; the value is stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderReference(String);

impl OrderReference {
    /// Widest value accepted by the `order_reference` column.
    pub const MAX_LEN: usize = 255;

    /// Creates a validated order reference.
    ///
    /// # Errors
    ///
    /// Returns [`PackageDomainError::EmptyOrderReference`] when the value is
    /// empty or whitespace-only, and
    /// [`PackageDomainError::OrderReferenceTooLong`] when it exceeds
    /// [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, PackageDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(PackageDomainError::EmptyOrderReference);
        }
        let length = raw.chars().count();
        if length > Self::MAX_LEN {
            return Err(PackageDomainError::OrderReferenceTooLong {
                length,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(raw))
    }

    /// Returns the order reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderReference {
    type Error = PackageDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderReference> for String {
    fn from(value: OrderReference) -> Self {
        value.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Code of the driver dropping off or collecting a package.
///
/// Blank input means no driver; anything else is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DriverCode(String);

impl DriverCode {
    /// Creates a driver code, returning `None` for blank input.
    #[must_use]
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(raw))
    }

    /// Deserializes an optional driver code through [`Self::parse`], so a
    /// blank value reads back as `None`.
    pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(Self::parse))
    }

    /// Returns the driver code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
