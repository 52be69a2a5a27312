//! Diesel schema for package persistence.

diesel::table! {
    /// Tracked packages in the pickup queue.
    packages (id) {
        /// Internal package identifier.
        id -> Uuid,
        /// Unique external order reference.
        #[max_length = 255]
        order_reference -> Varchar,
        /// Optional driver code.
        #[max_length = 255]
        driver_code -> Nullable<Varchar>,
        /// Pickup status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// First pick timestamp.
        picked_up_at -> Nullable<Timestamptz>,
        /// First hand-over timestamp.
        handed_over_at -> Nullable<Timestamptz>,
        /// Expiry timestamp.
        expired_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency version.
        version -> Int8,
    }
}
