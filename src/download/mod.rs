//! Download module for content downloading.
//!
//! This module provides:
//! - Batch orchestration over a sequence of posts
//! - In-order admission of posts to the resolve stage
//! - Atomic file transfer
//! - Batch state tracking

pub mod batch;
pub mod order;
pub mod state;
pub mod transfer;

pub use batch::BatchDownloader;
pub use order::{DispatchOrder, Turn};
pub use state::{BatchState, BatchSummary, PostOutcome};
pub use transfer::{TransferExecutor, TransferOutcome};
