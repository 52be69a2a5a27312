//! In-memory adapters for package persistence.

mod package;

pub use package::InMemoryPackageRepository;
