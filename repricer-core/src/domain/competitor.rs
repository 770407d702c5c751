//! Competitor snapshots, best-first.
//!
//! The `drift` counter is the one piece of persistent mutable state the
//! engine owns: the profit tree's rank-worse branches nudge it by ±1 on
//! every run, and the caller is expected to persist the mutated value.
//! Re-evaluating the same SKU/competitor pair is therefore not idempotent,
//! so at most one run per SKU may be in flight.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::product::normalize_rank;

/// One tracked competitor listing for a SKU. Lists are ordered best-first;
/// the engines only ever consult index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorSnapshot {
    pub price: f64,
    pub stock: i64,
    pub average_sales_speed: Option<f64>,
    /// Date the competitor last changed this price.
    pub price_change_date: NaiveDate,
    /// Competitor's position in search for the shared keyword; `None`/`-1`
    /// mean unranked.
    pub search_position: Option<i64>,
    /// Persistent percentage delta applied when we price off this
    /// competitor while ranked worse than them. Survives across runs.
    #[serde(default)]
    pub drift: i64,
}

impl CompetitorSnapshot {
    pub fn has_stock(&self) -> bool {
        self.stock > 0
    }

    /// Search rank with missing/`-1` normalized to "unranked".
    pub fn search_rank(&self) -> i64 {
        normalize_rank(self.search_position)
    }

    /// `ceil(price * (100 + drift) / 100)` — the drift-adjusted overcut
    /// price used by the rank-worse branches.
    pub fn drift_adjusted_price(&self) -> f64 {
        (self.price * (100 + self.drift) as f64 / 100.0).ceil()
    }

    /// Days between the competitor's last price change and `today`.
    pub fn days_since_price_change(&self, today: NaiveDate) -> i64 {
        (today - self.price_change_date).num_days()
    }
}
