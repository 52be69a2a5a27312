//! Package pickup tracking.
//!
//! Packages enter the pickup queue as `Waiting`, move forward through
//! `Picked` to `HandedOver`, or are marked `Expired` by the periodic sweep
//! once they have been active for too long. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
