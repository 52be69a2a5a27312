//! Diesel row models for package persistence.

use super::schema::packages;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for package records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PackageRow {
    /// Internal package identifier.
    pub id: uuid::Uuid,
    /// Unique external order reference.
    pub order_reference: String,
    /// Optional driver code.
    pub driver_code: Option<String>,
    /// Pickup status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// First pick timestamp.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// First hand-over timestamp.
    pub handed_over_at: Option<DateTime<Utc>>,
    /// Expiry timestamp.
    pub expired_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Insert model for package records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = packages)]
pub struct NewPackageRow {
    /// Internal package identifier.
    pub id: uuid::Uuid,
    /// Unique external order reference.
    pub order_reference: String,
    /// Optional driver code.
    pub driver_code: Option<String>,
    /// Pickup status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// First pick timestamp.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// First hand-over timestamp.
    pub handed_over_at: Option<DateTime<Utc>>,
    /// Expiry timestamp.
    pub expired_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Changeset applied when a package transitions.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = packages)]
#[diesel(treat_none_as_null = true)]
pub struct PackageChangeset {
    /// Pickup status.
    pub status: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// First pick timestamp.
    pub picked_up_at: Option<DateTime<Utc>>,
    /// First hand-over timestamp.
    pub handed_over_at: Option<DateTime<Utc>>,
    /// Expiry timestamp.
    pub expired_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}
