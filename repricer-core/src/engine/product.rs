//! Product pass: run every sibling SKU, then settle promotions once.
//!
//! Calendar-event enrollment operates on whole products, but prices are
//! staged per SKU. Each evaluation therefore records a
//! [`PromotionIntent`] instead of committing, and this module settles all
//! staged intents exactly once after the last sibling has run. A pass
//! emits at most one [`PromotionCommit`].

use serde::{Deserialize, Serialize};

use crate::domain::{EventId, ProductSnapshot, SkuId};
use crate::notify::Notifier;
use crate::result::{DecisionResult, Directive, PromotionIntent};

use super::eval::{EngineError, Evaluation, SkuInputs};
use super::triage;

/// One SKU's snapshot plus its fetched collaborators, owned by the caller.
#[derive(Debug, Clone)]
pub struct SkuCase {
    pub snapshot: ProductSnapshot,
    pub inputs: SkuInputs,
}

/// A SKU dropped from the pass because a lookup failed. Fatal for the SKU
/// only; siblings still run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSku {
    pub sku_id: SkuId,
    pub reason: String,
}

/// The single product-level promotion action a pass may emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionCommit {
    pub event_id: EventId,
    pub directives: Vec<Directive>,
}

/// Everything one product pass produced.
#[derive(Debug, Clone, Default)]
pub struct ProductOutcome {
    pub results: Vec<DecisionResult>,
    pub skipped: Vec<SkippedSku>,
    pub commit: Option<PromotionCommit>,
}

/// Evaluate a single SKU against the sibling results staged so far.
///
/// Mutates the snapshot (mark, drift-adjacent clamps) and the inputs
/// (competitor drift) in place, the way the persistent store sees them.
pub fn evaluate_sku(
    case: &mut SkuCase,
    siblings: &[DecisionResult],
    notifier: &dyn Notifier,
) -> Result<DecisionResult, EngineError> {
    let mut eval = Evaluation::new(&mut case.snapshot, &mut case.inputs, siblings, notifier);
    triage::run(&mut eval)?;
    Ok(eval.into_result())
}

/// Run every sibling SKU of one product, then settle staged promotions.
pub fn evaluate_product(cases: &mut [SkuCase], notifier: &dyn Notifier) -> ProductOutcome {
    let mut results: Vec<DecisionResult> = Vec::with_capacity(cases.len());
    let mut skipped = Vec::new();

    for case in cases.iter_mut() {
        match evaluate_sku(case, &results, notifier) {
            Ok(result) => results.push(result),
            Err(err) => skipped.push(SkippedSku {
                sku_id: case.snapshot.sku_id,
                reason: err.to_string(),
            }),
        }
    }

    let commit = settle_promotions(&mut results, &skipped);
    ProductOutcome {
        results,
        skipped,
        commit,
    }
}

/// Settle the staged [`PromotionIntent`]s of one product pass.
///
/// Precedence: a hold voids everything, enrollment beats re-enrollment,
/// and at most one commit comes out. A commit requires every sibling to
/// have staged its price and no SKU to have been skipped.
fn settle_promotions(
    results: &mut [DecisionResult],
    skipped: &[SkippedSku],
) -> Option<PromotionCommit> {
    if results
        .iter()
        .any(|r| matches!(r.promotion_intent, Some(PromotionIntent::HoldProduct)))
    {
        for result in results.iter_mut() {
            result.new_price = None;
        }
        return None;
    }

    let all_ran = skipped.is_empty() && !results.is_empty();

    let enroll_event = results.iter().find_map(|r| match &r.promotion_intent {
        Some(PromotionIntent::Enroll { event_id, .. }) => Some(*event_id),
        _ => None,
    });
    if let Some(event_id) = enroll_event {
        let all_staged = all_ran && results.iter().all(|r| r.new_promotion_price.is_some());
        if !all_staged {
            return None;
        }
        for result in results.iter_mut() {
            if let Some(PromotionIntent::Enroll { mark, .. }) = &result.promotion_intent {
                let mark = mark.clone();
                result.mark.push_str(&mark);
            }
        }
        return Some(PromotionCommit {
            event_id,
            directives: vec![Directive::AddToCalendarEvent { event_id }],
        });
    }

    let reenroll_event = results.iter().find_map(|r| match &r.promotion_intent {
        Some(PromotionIntent::ReEnroll { event_id, .. }) => Some(*event_id),
        _ => None,
    });
    if let Some(event_id) = reenroll_event {
        let all_staged = all_ran && results.iter().all(|r| r.new_price.is_some());
        if !all_staged {
            // re-enrollment is all-or-nothing; drop the staged prices of
            // the SKUs that asked for it
            for result in results.iter_mut() {
                if matches!(result.promotion_intent, Some(PromotionIntent::ReEnroll { .. })) {
                    result.new_price = None;
                }
            }
            return None;
        }
        for result in results.iter_mut() {
            if let Some(PromotionIntent::ReEnroll { mark, .. }) = &result.promotion_intent {
                let mark = mark.clone();
                result.mark.push_str(&mark);
            }
        }
        return Some(PromotionCommit {
            event_id,
            directives: vec![
                Directive::RemoveFromCalendarEvent { event_id },
                Directive::AddToCalendarEvent { event_id },
            ],
        });
    }

    None
}
