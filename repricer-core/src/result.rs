//! The mutable accumulator threaded through one SKU evaluation.
//!
//! Every predicate in the decision trees produces a [`Check`]: the boolean
//! the branch logic needs plus the trail fragment and narrative the audit
//! record needs. The evaluation context applies the accumulation and hands
//! branch logic only the boolean, so the engines never touch the trail
//! directly.

use serde::{Deserialize, Serialize};

use crate::domain::{DiscountId, EventId, ProductId, SkuId};

/// Outbound side-effect requests, applied by a persistence writer after the
/// run. The engine only records them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    AddToCalendarEvent { event_id: EventId },
    RemoveFromCalendarEvent { event_id: EventId },
    AddToTimerDiscount { hours: u32 },
    RemoveFromTimerDiscount { discount_id: DiscountId },
}

/// A product-level promotion request staged by one SKU evaluation.
///
/// Engines never commit promotions themselves; the product pass evaluates
/// the cross-SKU barrier once, after every sibling has run, and turns the
/// staged intents into at most one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionIntent {
    /// Enroll the whole product into `event_id` once every sibling carries
    /// a staged promotion price. `mark` is appended to each staging SKU
    /// when the commit fires.
    Enroll { event_id: EventId, mark: String },
    /// Remove and re-add the whole product once every sibling carries a
    /// computed price.
    ReEnroll { event_id: EventId, mark: String },
    /// Floor-violation leaf: hold the whole product — null every sibling's
    /// staged price, switch to manual control.
    HoldProduct,
}

/// Result of one SKU evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionResult {
    pub sku_id: Option<SkuId>,
    pub product_id: Option<ProductId>,
    /// Validation failure text; when set, no branch past validation ran.
    pub error: Option<String>,
    /// Append-only trace of every predicate crossed.
    pub trail: String,
    /// Narrative of the action taken; leaves may replace it wholesale.
    pub narrative: String,
    /// Classification code of the branch that produced this result.
    pub mark: String,
    /// Staged price, `None` meaning "no change this cycle".
    pub new_price: Option<f64>,
    /// Price staged for calendar-event enrollment, separate from the
    /// regular price change.
    pub new_promotion_price: Option<f64>,
    pub directives: Vec<Directive>,
    pub promotion_intent: Option<PromotionIntent>,
}

impl DecisionResult {
    pub fn for_sku(sku_id: SkuId, product_id: ProductId) -> Self {
        Self {
            sku_id: Some(sku_id),
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// How a predicate contributes to the narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    Append(String),
    /// Leaf-style full replacement of the narrative accumulated so far.
    Replace(String),
}

/// Reified predicate outcome: the branch boolean plus its audit payload.
#[derive(Debug, Clone)]
pub struct Check {
    pub outcome: bool,
    pub trail: Option<String>,
    pub narrative: Option<Narrative>,
}

impl Check {
    pub fn pass(trail: impl Into<String>) -> Self {
        Self {
            outcome: true,
            trail: Some(trail.into()),
            narrative: None,
        }
    }

    pub fn fail(trail: impl Into<String>) -> Self {
        Self {
            outcome: false,
            trail: Some(trail.into()),
            narrative: None,
        }
    }

    /// Predicate whose audit payload replaces the narrative instead of
    /// extending the trail.
    pub fn with_full_narrative(outcome: bool, text: impl Into<String>) -> Self {
        Self {
            outcome,
            trail: None,
            narrative: Some(Narrative::Replace(text.into())),
        }
    }

    /// Apply this check's accumulation to a result, returning the boolean.
    pub fn apply_to(self, result: &mut DecisionResult) -> bool {
        if let Some(t) = self.trail {
            result.trail.push_str(&t);
        }
        match self.narrative {
            Some(Narrative::Append(s)) => result.narrative.push_str(&s),
            Some(Narrative::Replace(s)) => result.narrative = s,
            None => {}
        }
        self.outcome
    }
}
