//! Pickup queue: package pickup tracking.
//!
//! This crate tracks packages waiting for driver pickup, enforces their
//! forward-only status lifecycle and expires packages that were never
//! collected.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`package`]: Package records, status lifecycle and expiry sweep
//! - [`worker`]: Scheduled runner for the expiry sweep
//! - [`config`]: Environment-driven runtime configuration

pub mod config;
pub mod package;
pub mod worker;
