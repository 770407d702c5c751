//! Shared promotion / timer-discount resolution.
//!
//! Both pricing trees terminate here once a price is staged. The resolver
//! decides whether the staged price survives, whether the SKU enrolls in a
//! timer discount, and whether a calendar-event enrollment should be
//! staged for the whole product. Product-level commits are never issued
//! here — they are staged as [`PromotionIntent`]s and settled exactly once
//! by the product pass.

use crate::result::{Check, Directive, PromotionIntent};

use super::eval::{Evaluation, EngineError, SkuFacts};

/// Hours a timer discount must have run before the SKU is pulled out.
const TIMER_DISCOUNT_MIN_AGE_HOURS: i64 = 23;
/// Enrollment window requested for new timer discounts.
const TIMER_DISCOUNT_HOURS: u32 = 48;

pub fn resolve(eval: &mut Evaluation<'_>, facts: SkuFacts) -> Result<(), EngineError> {
    if eval.is_on_calendar_event() {
        return within_calendar_event(eval);
    }
    if eval.is_on_timer_discount() {
        return within_timer_discount(eval);
    }
    if eval.can_join_calendar_event() {
        return stage_calendar_enrollment(eval, facts);
    }
    if has_free_timer_discount_slots(eval) {
        return consider_timer_discount(eval, facts);
    }
    eval.update_mark("7");
    Ok(())
}

/// Already enrolled: leave a well-ranked product alone, otherwise stage a
/// re-enrollment of the whole product.
fn within_calendar_event(eval: &mut Evaluation<'_>) -> Result<(), EngineError> {
    if in_event_top100(eval) {
        let product_id = eval.result.product_id;
        eval.notifier.send_message(&format!(
            "Doing nothing today with any SKU of {}",
            product_id.map_or_else(|| "this product".to_string(), |p| p.to_string()),
        ));
        eval.narrate(
            "1. notify chat; no SKU of this product changes today\n\
             2. mark suffix 1\n",
        );
        eval.update_mark("1");
        return Ok(());
    }

    let event_id = eval
        .snapshot
        .involved_calendar_event
        .ok_or(EngineError::MissingInvolvedEvent {
            sku: eval.snapshot.sku_id,
        })?;
    eval.stage_promotion(PromotionIntent::ReEnroll {
        event_id,
        mark: "2".into(),
    });
    eval.narrate(
        "remove and re-add the whole product to the event once every sibling \
         SKU is priced\n",
    );
    Ok(())
}

/// Already in a timer discount: pull out after 23 hours, otherwise wait
/// and drop the staged price for this cycle.
fn within_timer_discount(eval: &mut Evaluation<'_>) -> Result<(), EngineError> {
    let state = eval
        .inputs
        .timer_discount
        .ok_or(EngineError::MissingDiscountState {
            sku: eval.snapshot.sku_id,
        })?;
    let age_hours = state.age_hours(eval.snapshot.evaluated_at);

    if eval.apply(discount_ran_long_enough(age_hours)) {
        eval.push_directive(Directive::RemoveFromTimerDiscount {
            discount_id: state.discount_id,
        });
        eval.narrate(
            "take the SKU out of the discount and apply the planned price \
             without re-entering a timer discount\n",
        );
        eval.update_mark("3B");
    } else {
        eval.narrate("do nothing; wait for the timer discount to finish\n");
        eval.update_mark("3A");
        eval.set_new_price(None);
    }
    Ok(())
}

/// Not enrolled anywhere and a calendar-event candidate exists: stage an
/// enrollment price, or hold the whole product when the floor is in the way.
fn stage_calendar_enrollment(
    eval: &mut Evaluation<'_>,
    facts: SkuFacts,
) -> Result<(), EngineError> {
    let Some(candidate) = eval.snapshot.most_suitable_calendar_event.clone() else {
        return Ok(());
    };
    let planned = eval.staged_price()?;

    if eval.apply(event_price_above(candidate.recommended_price, planned, "planned")) {
        eval.set_promotion_price(planned);
        eval.stage_promotion(PromotionIntent::Enroll {
            event_id: candidate.event_id,
            mark: "8".into(),
        });
        eval.narrate(
            "promotion price staged at the planned price; the whole product \
             enrolls once every sibling SKU has one\n",
        );
        return Ok(());
    }

    if eval.apply(event_price_above(
        candidate.recommended_price,
        facts.min_price,
        "min",
    )) {
        eval.set_promotion_price(candidate.recommended_price);
        eval.stage_promotion(PromotionIntent::Enroll {
            event_id: candidate.event_id,
            mark: "10".into(),
        });
        eval.narrate(
            "promotion price staged at the event's recommended price; the whole \
             product enrolls once every sibling SKU has one\n",
        );
        return Ok(());
    }

    let text = format!(
        "Some items cannot join the event without violating the minimum price. \
         Switch the product to manual control, {}. \
         NO SKU OF THIS PRODUCT CHANGES PRICE.",
        eval.snapshot.responsible_label(),
    );
    eval.notifier.send_message(&text);
    eval.narrate(&format!("{text}\n"));
    eval.update_mark("9");
    eval.set_new_price(None);
    eval.stage_promotion(PromotionIntent::HoldProduct);
    Ok(())
}

/// Free timer-discount slots exist: enroll a top item, keep the planned
/// price for the rest, alert when the floor blocks the discount entirely.
fn consider_timer_discount(eval: &mut Evaluation<'_>, facts: SkuFacts) -> Result<(), EngineError> {
    let condition =
        eval.inputs
            .timer_discount_condition
            .ok_or(EngineError::MissingDiscountCondition {
                sku: eval.snapshot.sku_id,
            })?;
    let planned = eval.staged_price()?;

    if eval.apply(discount_ceiling_above(condition.max_price, planned, "planned")) {
        if facts.top {
            eval.push_directive(Directive::AddToTimerDiscount {
                hours: TIMER_DISCOUNT_HOURS,
            });
            eval.narrate(
                "1. enroll in a 48h timer discount at the planned price, in the \
                 nearest free interval\n2. mark suffix 4A\n",
            );
            eval.update_mark("4A");
        } else {
            eval.notifier.send_message(&format!(
                "Applying the planned price to {} without joining the timer discount",
                eval.snapshot.title,
            ));
            eval.narrate(
                "1. apply the planned price without joining the discount\n\
                 2. notify chat\n3. mark suffix 4B\n",
            );
            eval.update_mark("4B");
        }
        return Ok(());
    }

    if eval.apply(discount_ceiling_above(
        condition.max_price,
        facts.min_price,
        "min",
    )) {
        if facts.top {
            eval.set_new_price(Some(condition.max_price));
            eval.push_directive(Directive::AddToTimerDiscount {
                hours: TIMER_DISCOUNT_HOURS,
            });
            eval.narrate(
                "1. enroll in the 48h timer discount at the discount's maximum \
                 price\n2. mark suffix 6A\n3. move on to the next SKU\n",
            );
            eval.update_mark("6A");
        } else {
            eval.narrate(
                "1. apply the planned price without joining the discount\n\
                 2. mark suffix 6B\n",
            );
            eval.update_mark("6B");
        }
        return Ok(());
    }

    eval.notifier.send_message(&format!(
        "{} cannot join the timer discount without violating the minimum price. \
         Switch to manual control, {}.",
        eval.snapshot.title,
        eval.snapshot.responsible_label(),
    ));
    eval.update_mark("5");
    eval.narrate(
        "1. the SKU cannot join the timer discount without violating the minimum \
         price — switch to manual control\n\
         2. apply the planned price without joining the discount\n",
    );
    Ok(())
}

// ─── Predicates ─────────────────────────────────────────────────────

fn in_event_top100(eval: &mut Evaluation<'_>) -> bool {
    let check = if eval.snapshot.in_top100_of_calendar_event() {
        Check::pass("SKU is in the event's top 100,")
    } else {
        Check::fail("SKU is NOT in the event's top 100,")
    };
    eval.apply(check)
}

fn has_free_timer_discount_slots(eval: &mut Evaluation<'_>) -> bool {
    let check = if eval.inputs.shop.free_timer_discount_slots > 0 {
        Check::pass("free timer-discount slots available,")
    } else {
        Check::fail("all timer-discount slots are taken,")
    };
    eval.apply(check)
}

fn discount_ran_long_enough(age_hours: i64) -> Check {
    if age_hours >= TIMER_DISCOUNT_MIN_AGE_HOURS {
        Check::pass("SKU has been in the timer discount for 23h or more,")
    } else {
        Check::fail("SKU has been in the timer discount for less than 23h,")
    }
}

fn event_price_above(recommended: f64, reference: f64, reference_name: &str) -> Check {
    if recommended > reference {
        Check::pass(format!("event max price > {reference_name} price,"))
    } else {
        Check::fail(format!("event max price <= {reference_name} price,"))
    }
}

fn discount_ceiling_above(ceiling: f64, reference: f64, reference_name: &str) -> Check {
    if ceiling > reference {
        Check::pass(format!("discount max price > {reference_name} price,"))
    } else {
        Check::fail(format!("discount max price <= {reference_name} price,"))
    }
}
