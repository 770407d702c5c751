//! Shared evaluation context for one SKU run.
//!
//! `Evaluation` is the explicit handle the three decision trees mutate:
//! it owns the accumulating [`DecisionResult`] and borrows the snapshot,
//! the per-SKU collaborator inputs, the sibling results staged so far,
//! and the notification sink. Engines mutate the result only through the
//! narrow accumulation operations here — apply a check, narrate, stage a
//! price, set a mark.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    CompetitorSnapshot, ProductSnapshot, ShopState, SkuId, TimerDiscountCondition,
    TimerDiscountState,
};
use crate::ladder::{LadderError, LadderStep, PriceLadder};
use crate::notify::Notifier;
use crate::result::{Check, DecisionResult, Directive, PromotionIntent};

/// Per-SKU collaborator inputs, fetched by the caller before the run.
///
/// The competitor list is best-first; index 0 is the only entry the trees
/// consult, and its `drift` counter is mutated in place by the profit
/// tree's rank-worse branches.
#[derive(Debug, Clone)]
pub struct SkuInputs {
    pub ladder: PriceLadder,
    pub competitors: Vec<CompetitorSnapshot>,
    pub nearest_delivery: Option<NaiveDate>,
    pub timer_discount_condition: Option<TimerDiscountCondition>,
    pub timer_discount: Option<TimerDiscountState>,
    pub shop: ShopState,
}

/// Lookup failures the core cannot recover from. Fatal for the SKU being
/// evaluated and only for it; the caller records the skip and moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ladder(#[from] LadderError),

    #[error("{sku}: no price staged before promotion resolution")]
    MissingStagedPrice { sku: SkuId },

    #[error("{sku}: enrolled in a calendar event but the snapshot names no event")]
    MissingInvolvedEvent { sku: SkuId },

    #[error("{sku}: on a timer discount but no discount state was supplied")]
    MissingDiscountState { sku: SkuId },

    #[error("{sku}: no timer-discount condition was supplied")]
    MissingDiscountCondition { sku: SkuId },
}

/// The seven required snapshot fields, unwrapped once validation has
/// proven them present. Branch logic reads these instead of re-unwrapping
/// options.
#[derive(Debug, Clone, Copy)]
pub struct SkuFacts {
    pub stock: i64,
    pub min_price: f64,
    pub last_price: f64,
    pub days_without_sales: i64,
    pub top: bool,
    pub average_sales_speed: f64,
    pub min_sales_speed: f64,
}

/// Mutable evaluation state for one SKU run.
pub struct Evaluation<'a> {
    pub(crate) snapshot: &'a mut ProductSnapshot,
    pub(crate) inputs: &'a mut SkuInputs,
    /// Sibling results already produced in this product pass.
    pub(crate) siblings: &'a [DecisionResult],
    pub(crate) notifier: &'a dyn Notifier,
    pub(crate) result: DecisionResult,
    current_step: Option<LadderStep>,
}

impl<'a> Evaluation<'a> {
    /// Set up a run. Resolves the current ladder step eagerly so the
    /// above-ladder clamp (which rewrites `last_price`) happens before any
    /// branch reads the price.
    pub fn new(
        snapshot: &'a mut ProductSnapshot,
        inputs: &'a mut SkuInputs,
        siblings: &'a [DecisionResult],
        notifier: &'a dyn Notifier,
    ) -> Self {
        let result = DecisionResult::for_sku(snapshot.sku_id, snapshot.product_id);
        let current_step = if snapshot.last_price.is_some() {
            inputs.ladder.current_step(snapshot).ok()
        } else {
            None
        };
        Self {
            snapshot,
            inputs,
            siblings,
            notifier,
            result,
            current_step,
        }
    }

    pub fn into_result(self) -> DecisionResult {
        self.result
    }

    /// Apply a predicate's accumulation and return its boolean.
    pub(crate) fn apply(&mut self, check: Check) -> bool {
        check.apply_to(&mut self.result)
    }

    pub(crate) fn narrate(&mut self, text: &str) {
        self.result.narrative.push_str(text);
    }

    pub(crate) fn fail_validation(&mut self, text: String) {
        self.result.error = Some(text);
    }

    pub(crate) fn set_new_price(&mut self, price: Option<f64>) {
        self.result.new_price = price;
    }

    pub(crate) fn set_promotion_price(&mut self, price: f64) {
        self.result.new_promotion_price = Some(price);
    }

    /// Staged price, which every pricing branch guarantees before the
    /// promotion resolver runs. Absence is an internal invariant breach.
    pub(crate) fn staged_price(&self) -> Result<f64, EngineError> {
        self.result.new_price.ok_or(EngineError::MissingStagedPrice {
            sku: self.snapshot.sku_id,
        })
    }

    /// Overwrite the classification mark, on result and snapshot both.
    pub(crate) fn set_mark(&mut self, mark: &str) {
        self.snapshot.mark = mark.to_string();
        self.result.mark = mark.to_string();
    }

    /// Append to the classification mark, on result and snapshot both.
    pub(crate) fn update_mark(&mut self, mark: &str) {
        self.snapshot.mark.push_str(mark);
        self.result.mark.push_str(mark);
    }

    pub(crate) fn push_directive(&mut self, directive: Directive) {
        self.result.directives.push(directive);
    }

    pub(crate) fn stage_promotion(&mut self, intent: PromotionIntent) {
        self.result.promotion_intent = Some(intent);
    }

    /// Ladder step bracketing the (possibly clamped) last price.
    pub(crate) fn current_step(&mut self) -> Result<LadderStep, EngineError> {
        if let Some(step) = self.current_step {
            return Ok(step);
        }
        let step = self.inputs.ladder.current_step(self.snapshot)?;
        self.current_step = Some(step);
        Ok(step)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.snapshot.evaluated_at.date_naive()
    }

    // ─── Shared trail predicates ────────────────────────────────────

    pub(crate) fn is_active(&mut self) -> bool {
        let check = if self.snapshot.active {
            Check::pass("active,")
        } else {
            Check::fail("NOT active,")
        };
        self.apply(check)
    }

    pub(crate) fn is_stock_empty(&mut self, stock: i64) -> bool {
        let check = if stock == 0 {
            Check::pass("stock = 0,")
        } else {
            Check::fail("stock > 0,")
        };
        self.apply(check)
    }

    pub(crate) fn is_reserved_stock_empty(&mut self) -> bool {
        let check = if self.snapshot.reserved_stock == 0 {
            Check::pass("reserve = 0,")
        } else {
            Check::fail("reserve > 0,")
        };
        self.apply(check)
    }

    fn has_competitor_link(&mut self) -> bool {
        let check = if self.inputs.competitors.is_empty() {
            Check::fail("no competitor links,")
        } else {
            Check::pass("has competitor links,")
        };
        self.apply(check)
    }

    fn best_competitor_has_stock(&mut self) -> bool {
        let has_stock = self
            .inputs
            .competitors
            .first()
            .is_some_and(CompetitorSnapshot::has_stock);
        let trail = if has_stock {
            "best competitor has stock,"
        } else {
            "best competitor is out of stock,"
        };
        self.apply(Check {
            outcome: has_stock,
            trail: Some(trail.into()),
            narrative: None,
        })
    }

    /// Composite entry guard of both pricing trees: a best-competitor link
    /// exists and that competitor still has stock.
    pub(crate) fn has_best_competitor_link_and_stock(&mut self) -> bool {
        let usable = self.has_competitor_link() && self.best_competitor_has_stock();
        let check = if usable {
            Check::pass("usable best competitor present,")
        } else {
            Check::fail("no usable best competitor,")
        };
        self.apply(check)
    }

    /// The best competitor's sales speed, or a validation-error result when
    /// the collaborator supplied a competitor without one.
    pub(crate) fn require_competitor_speed(&mut self, competitor: &CompetitorSnapshot) -> Option<f64> {
        match competitor.average_sales_speed {
            Some(speed) => Some(speed),
            None => {
                self.fail_validation("competitor average_sales_speed is missing".to_string());
                None
            }
        }
    }

    pub(crate) fn can_join_calendar_event(&mut self) -> bool {
        let check = match &self.snapshot.most_suitable_calendar_event {
            Some(candidate) => Check::pass(format!(
                "can join a calendar event with priority {},",
                candidate.priority
            )),
            None => Check::fail("cannot join any calendar event,"),
        };
        self.apply(check)
    }

    pub(crate) fn is_on_calendar_event(&mut self) -> bool {
        let check = if self.snapshot.on_calendar_event {
            Check::pass("SKU is in a calendar event,")
        } else {
            Check::fail("SKU is NOT in a calendar event,")
        };
        self.apply(check)
    }

    pub(crate) fn is_on_timer_discount(&mut self) -> bool {
        let check = if self.snapshot.on_timer_discount {
            Check::pass("SKU is in a timer discount,")
        } else {
            Check::fail("SKU is NOT in a timer discount,")
        };
        self.apply(check)
    }

    pub(crate) fn is_current_step_number(&mut self, number: u32) -> Result<bool, EngineError> {
        let current = self.current_step()?;
        let check = if current.number == number {
            Check::pass(format!("current ladder step is {number},"))
        } else {
            Check::fail(format!("current ladder step is {},", current.number))
        };
        Ok(self.apply(check))
    }

    pub(crate) fn has_delivery_info(&mut self) -> bool {
        let check = if self.inputs.nearest_delivery.is_some() {
            Check::pass("has delivery info,")
        } else {
            Check::fail("no delivery info,")
        };
        self.apply(check)
    }
}
