//! Deduplication module.
//!
//! Provides:
//! - Existence checks against the naming conventions of finished downloads
//! - Per-destination locks for concurrent workers

pub mod locks;
pub mod service;

pub use locks::PathLocks;
pub use service::DedupService;
