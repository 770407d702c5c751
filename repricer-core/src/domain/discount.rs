//! Timer-discount state and shop-level promotion capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::DiscountId;

/// Terms under which this SKU may be enrolled in a timer discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerDiscountCondition {
    /// Highest price the SKU may carry while enrolled.
    pub max_price: f64,
}

/// An active timer-discount enrollment for a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerDiscountState {
    pub discount_id: DiscountId,
    pub started_at: DateTime<Utc>,
}

impl TimerDiscountState {
    /// Hours elapsed since enrollment, against the snapshot instant.
    pub fn age_hours(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_hours()
    }
}

/// Shop-level state relevant to promotion decisions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShopState {
    /// Timer-discount slots the shop has left this period.
    pub free_timer_discount_slots: u32,
}
