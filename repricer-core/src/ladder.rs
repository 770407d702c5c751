//! Discrete per-SKU price ladder ("bins").
//!
//! A ladder is an ordered list of allowed price steps for one SKU. Step `i`
//! covers the price bracket `(value[i-1], value[i]]`, with the bottom step
//! covering everything at or below its value. Lookups that the decision
//! trees treat as recoverable (`one below the floor` and the like) return
//! `Option`; lookups a branch cannot proceed without return
//! `LadderError::StepNotFound` and propagate to the caller, which must
//! treat the SKU as skipped.
//!
//! The single auto-recovered case is a last price above the top step while
//! still above the floor: the snapshot is clamped onto the top step and its
//! `last_price` overwritten to that step's value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ProductSnapshot;

/// One allowed price level for a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderStep {
    /// Ordinal, counted from the bottom of the ladder.
    pub number: u32,
    /// Price at this step.
    pub value: f64,
    /// Expected units/day when priced at this step, supplied by the sales
    /// model. Used only by the target-velocity lookup.
    #[serde(default)]
    pub daily_sales_forecast: f64,
}

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("price ladder is empty")]
    Empty,

    #[error("price ladder is not strictly increasing at position {position}")]
    NotMonotonic { position: usize },

    #[error("no ladder step number {number}")]
    StepNotFound { number: u32 },

    #[error("no ladder step above price {price}")]
    NoStepAbovePrice { price: f64 },

    #[error("no ladder step below price {price}")]
    NoStepBelowPrice { price: f64 },

    #[error("snapshot has no last price to locate on the ladder")]
    MissingPrice,
}

/// Ordered, validated price ladder for one SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLadder {
    steps: Vec<LadderStep>,
}

impl PriceLadder {
    /// Build a ladder, rejecting empty input and any step that does not
    /// strictly increase in both ordinal and price.
    pub fn new(steps: Vec<LadderStep>) -> Result<Self, LadderError> {
        if steps.is_empty() {
            return Err(LadderError::Empty);
        }
        for (i, pair) in steps.windows(2).enumerate() {
            if pair[1].number <= pair[0].number || pair[1].value <= pair[0].value {
                return Err(LadderError::NotMonotonic { position: i + 1 });
            }
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn bottom_step(&self) -> LadderStep {
        self.steps[0]
    }

    pub fn top_step(&self) -> LadderStep {
        self.steps[self.steps.len() - 1]
    }

    /// Step whose bracket contains `price`, or `None` above the top step.
    pub fn step_for_price(&self, price: f64) -> Option<LadderStep> {
        self.steps.iter().find(|s| price <= s.value).copied()
    }

    /// Step whose bracket contains the snapshot's last price.
    ///
    /// Above-ladder fallback: a last price beyond the top step, still above
    /// the floor, clamps the snapshot to the top step and overwrites
    /// `last_price` with that step's value. This is the only auto-recovered
    /// lookup; at or below the floor the lookup fails instead.
    pub fn current_step(&self, snapshot: &mut ProductSnapshot) -> Result<LadderStep, LadderError> {
        let last = snapshot.last_price.ok_or(LadderError::MissingPrice)?;
        match self.step_for_price(last) {
            Some(step) => Ok(step),
            None if snapshot.min_price.is_some_and(|min| last > min) => {
                let top = self.top_step();
                snapshot.last_price = Some(top.value);
                Ok(top)
            }
            None => Err(LadderError::NoStepAbovePrice { price: last }),
        }
    }

    /// Highest-margin step — the top of the ladder.
    pub fn max_profit_step(&self) -> LadderStep {
        self.top_step()
    }

    /// Highest-priced step still expected to sell at least
    /// `target_daily_velocity` units/day; bottom step when none qualifies.
    pub fn optimal_step(&self, target_daily_velocity: f64) -> LadderStep {
        self.steps
            .iter()
            .rev()
            .find(|s| s.daily_sales_forecast >= target_daily_velocity)
            .copied()
            .unwrap_or_else(|| self.bottom_step())
    }

    pub fn step_by_number(&self, number: u32) -> Result<LadderStep, LadderError> {
        self.steps
            .iter()
            .find(|s| s.number == number)
            .copied()
            .ok_or(LadderError::StepNotFound { number })
    }

    /// Neighbor one step below, `None` at the bottom of the ladder.
    pub fn one_below(&self, step: LadderStep) -> Option<LadderStep> {
        let idx = self.steps.iter().position(|s| s.number == step.number)?;
        idx.checked_sub(1).map(|i| self.steps[i])
    }

    /// Neighbor one step above, `None` at the top of the ladder.
    pub fn one_above(&self, step: LadderStep) -> Option<LadderStep> {
        let idx = self.steps.iter().position(|s| s.number == step.number)?;
        self.steps.get(idx + 1).copied()
    }

    /// Highest step strictly below a reference (competitor) price.
    pub fn step_below_price(&self, price: f64) -> Option<LadderStep> {
        self.steps.iter().rev().find(|s| s.value < price).copied()
    }

    /// Lowest step strictly above a reference (competitor) price.
    pub fn step_above_price(&self, price: f64) -> Option<LadderStep> {
        self.steps.iter().find(|s| s.value > price).copied()
    }
}
