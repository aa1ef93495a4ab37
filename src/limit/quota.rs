//! Remaining-quota snapshot reported by a quota-bearing host.

use std::fmt;

use chrono::{DateTime, Utc};

/// Which quota window ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaWindow {
    /// Per-user allowance (resets hourly on Imgur).
    Short,
    /// Per-client allowance (resets daily on Imgur).
    Long,
}

impl fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaWindow::Short => write!(f, "USER"),
            QuotaWindow::Long => write!(f, "CLIENT"),
        }
    }
}

/// Remaining request counts for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    pub short_remaining: u64,
    pub long_remaining: u64,
    /// When the reported allowance resets, if known.
    pub reset_at: Option<DateTime<Utc>>,
}

impl QuotaState {
    /// The first exhausted window, short before long.
    pub fn exhausted(&self) -> Option<QuotaWindow> {
        if self.short_remaining == 0 {
            Some(QuotaWindow::Short)
        } else if self.long_remaining == 0 {
            Some(QuotaWindow::Long)
        } else {
            None
        }
    }

    /// Human-readable time until reset, e.g. `after 12 Minutes 5 Seconds`.
    pub fn describe_reset(&self, now: DateTime<Utc>) -> String {
        match self.reset_at {
            Some(reset) => {
                let secs = (reset - now).num_seconds().max(0);
                format!("after {} Minutes {} Seconds", secs / 60, secs % 60)
            }
            None => "at an unknown time".to_string(),
        }
    }
}
