//! Per-host rate limiting and quota checks.
//!
//! This module provides:
//! - A clock abstraction so waits can be driven manually in tests
//! - Token buckets enforcing a minimum spacing between calls to one host
//! - The quota gate consulted before dispatching to a quota-bearing host
//! - Jittered retry for idempotent requests

pub mod backoff;
pub mod bucket;
pub mod clock;
pub mod gate;
pub mod quota;

pub use backoff::retry_with_backoff;
pub use bucket::TokenBucket;
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::QuotaGate;
pub use quota::{QuotaState, QuotaWindow};
