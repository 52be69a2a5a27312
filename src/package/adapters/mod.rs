//! Adapter implementations of the package ports.
//!
//! - [`memory`]: process-local storage for tests and tooling
//! - [`postgres`]: Diesel-backed `PostgreSQL` storage

pub mod memory;
pub mod postgres;
