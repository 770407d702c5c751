//! Main triage tree.
//!
//! Sequential, short-circuiting checks over one SKU: validation, the
//! blocked/inactive/out-of-stock special cases, then routing of in-stock
//! selling items to one of the two pricing trees by sales velocity.
//! Every leaf is terminal; delegation to a pricing tree happens exactly
//! once per run.

use crate::domain::ProductStatus;
use crate::result::{Check, PromotionIntent};

use super::eval::{Evaluation, EngineError, SkuFacts};
use super::{acceleration, profit};

const RESTOCK_JUMP_STEP: u32 = 15;

pub fn run(eval: &mut Evaluation<'_>) -> Result<(), EngineError> {
    let Some(facts) = validate(eval) else {
        // error result is already populated; no side effects were attempted
        return Ok(());
    };

    eval.set_mark("");

    if is_blocked(eval) {
        blocked_leaf(eval);
        return Ok(());
    }

    if !eval.is_active() {
        eval.set_mark("1.2");
        eval.narrate("1. move on to the next SKU\n2. mark 1.2\n");
        eval.set_new_price(None);
        return Ok(());
    }

    if eval.is_stock_empty(facts.stock) {
        if eval.is_reserved_stock_empty() {
            empty_stock_leaf(eval)?;
        } else {
            eval.narrate("replenish the listing from the long-term storage reserve\n");
            eval.set_mark("1.4");
        }
        return Ok(());
    }

    if !is_selling(eval) {
        // No automated branch exists for statuses outside Blocked/Selling
        // with stock on hand: hold the SKU and hand it to a human.
        let label = match &eval.snapshot.status {
            ProductStatus::Other(label) => label.clone(),
            _ => String::new(),
        };
        eval.notifier.send_message(&format!(
            "{} has status '{}' which the repricer does not handle — review manually, {}",
            eval.snapshot.title,
            label,
            eval.snapshot.responsible_label(),
        ));
        eval.narrate("status has no automated branch; flagged for manual review\n");
        eval.set_new_price(None);
        return Ok(());
    }

    if !is_price_at_or_above_floor(eval, facts) {
        // unreachable given validation, kept as an explicit trail entry
        eval.set_new_price(None);
        return Ok(());
    }

    if has_no_full_stale_day(eval, facts) {
        if is_velocity_above_minimum(eval, facts) {
            eval.narrate("repricing per the profit-increase tree\n");
            profit::run(eval, facts)?;
        } else {
            eval.narrate("repricing per the sales-acceleration tree\n");
            acceleration::run(eval, facts)?;
        }
        return Ok(());
    }

    if is_floor_reached(eval, facts) {
        stale_at_floor(eval, facts);
        return Ok(());
    }

    if is_top(eval, facts) {
        eval.notifier.send_message(&format!(
            "Top item {} is not selling — {}",
            eval.snapshot.title,
            eval.snapshot.responsible_label(),
        ));
        eval.notifier.add_log("top item not selling");
        eval.narrate("1. notify chat that a top item is not selling\n2. log the action\n");
    }
    eval.narrate("lowering the price per the sales-acceleration tree:\n");
    acceleration::run(eval, facts)
}

/// Required-field validation. The below-floor price is its own error path,
/// checked before presence validation completes.
fn validate(eval: &mut Evaluation<'_>) -> Option<SkuFacts> {
    let snapshot = &*eval.snapshot;
    if let (Some(last), Some(min)) = (snapshot.last_price, snapshot.min_price) {
        if last < min {
            let text = format!(
                "product price is below the minimum price — take action, {}",
                snapshot.responsible_label()
            );
            eval.fail_validation(text);
            return None;
        }
    }

    let missing: &[(&str, bool)] = &[
        ("stock", snapshot.stock.is_none()),
        ("min_price", snapshot.min_price.is_none()),
        ("last_price", snapshot.last_price.is_none()),
        ("days_without_sales", snapshot.days_without_sales.is_none()),
        ("top", snapshot.top.is_none()),
        ("average_sales_speed", snapshot.average_sales_speed.is_none()),
        ("min_sales_speed", snapshot.min_sales_speed.is_none()),
    ];
    for (field, absent) in missing {
        if *absent {
            eval.fail_validation(format!("{field} is missing"));
            return None;
        }
    }

    let snapshot = &*eval.snapshot;
    Some(SkuFacts {
        stock: snapshot.stock?,
        min_price: snapshot.min_price?,
        last_price: snapshot.last_price?,
        days_without_sales: snapshot.days_without_sales?,
        top: snapshot.top?,
        average_sales_speed: snapshot.average_sales_speed?,
        min_sales_speed: snapshot.min_sales_speed?,
    })
}

fn blocked_leaf(eval: &mut Evaluation<'_>) {
    let who = eval.snapshot.responsible_label().to_string();
    eval.notifier
        .send_message(&format!("{} is blocked — {who}", eval.snapshot.title));
    eval.notifier
        .add_task(&format!("investigate the listing block — {who}"));
    eval.notifier.add_log("blocked SKU reported");
    eval.set_mark("1.1");
    eval.narrate(
        "1. notify chat that the SKU is blocked, naming the shop's responsible person\n\
         2. add a task to investigate the block\n\
         3. log the action\n\
         4. mark 1.1\n\
         5. move on to the next SKU\n",
    );
    eval.set_new_price(None);
}

/// Stock and reserve are both empty: try to park the product in a calendar
/// event; otherwise jump the price to the restock step.
fn empty_stock_leaf(eval: &mut Evaluation<'_>) -> Result<(), EngineError> {
    if eval.can_join_calendar_event() {
        if let Some(candidate) = eval.snapshot.most_suitable_calendar_event.clone() {
            eval.set_promotion_price(candidate.recommended_price);
            eval.stage_promotion(PromotionIntent::Enroll {
                event_id: candidate.event_id,
                mark: "1.10B".into(),
            });
            eval.narrate(
                "promotion price staged; the whole product enrolls into the event \
                 once every sibling SKU has one\n",
            );
        }
        return Ok(());
    }

    if eval.is_current_step_number(RESTOCK_JUMP_STEP)? {
        eval.narrate("move on to the next sibling SKU of this product\n");
    } else {
        let step = eval.inputs.ladder.step_by_number(RESTOCK_JUMP_STEP)?;
        eval.set_new_price(Some(step.value));
        eval.notifier.add_log("restock price jump scheduled");
        eval.narrate("set the price of ladder step 15, counted from the bottom\n");
        eval.set_mark("1.3");
    }
    Ok(())
}

/// Price is pinned at the floor and the SKU has gone a full day or more
/// without sales: alert escalation by staleness and top status.
fn stale_at_floor(eval: &mut Evaluation<'_>, facts: SkuFacts) {
    if is_stale_beyond_three_days(eval, facts) {
        let snapshot = &*eval.snapshot;
        eval.notifier.send_message(&format!(
            "{} has not sold for {} days, keyword '{}', position {} — {}",
            snapshot.title,
            facts.days_without_sales,
            snapshot.search_key.as_deref().unwrap_or("-"),
            snapshot
                .search_position
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            snapshot.responsible_label(),
        ));
        eval.notifier.add_log("stale SKU at floor price");
        eval.notifier
            .add_task("promote the listing / find out why the SKU is not selling");
        eval.set_mark("1.9");
        eval.narrate(
            "1. critical chat alert: the SKU has not sold for N days, with keyword and position\n\
             2. log the action\n\
             3. add a task to find the cause of the sales stop\n\
             4. mark 1.9\n",
        );
        return;
    }

    if is_top(eval, facts) {
        if is_in_top100_search(eval) {
            let snapshot = &*eval.snapshot;
            eval.notifier.send_message(&format!(
                "Top item {} has not sold for {} days — {}",
                snapshot.title,
                facts.days_without_sales,
                snapshot.responsible_label(),
            ));
            eval.notifier.add_log("ranked top item not selling");
            eval.notifier.add_task(&format!(
                "find out why {} is not selling",
                eval.snapshot.title
            ));
            eval.set_mark("1.11");
            eval.narrate(
                "1. critical chat alert: a top item is not selling despite ranking in the top 100\n\
                 2. log the action\n\
                 3. add a task to find the cause\n\
                 4. mark 1.11\n",
            );
        } else {
            let snapshot = &*eval.snapshot;
            eval.notifier.send_message(&format!(
                "Top item {} needs promotion — {}",
                snapshot.title,
                snapshot.responsible_label(),
            ));
            eval.notifier.add_log("unranked top item needs promotion");
            eval.notifier
                .add_task(&format!("boost {} with reviews", eval.snapshot.title));
            eval.set_mark("1.10");
            eval.narrate(
                "1. chat alert: the top item needs promotion\n\
                 2. log the action\n\
                 3. add a task to boost the listing with reviews\n\
                 4. mark 1.10\n",
            );
        }
        eval.narrate("move on to the next SKU\n");
        eval.set_new_price(None);
    } else {
        eval.narrate("move on to the next SKU\n");
        eval.set_new_price(None);
    }
}

// ─── Trail predicates ───────────────────────────────────────────────

fn is_blocked(eval: &mut Evaluation<'_>) -> bool {
    let check = if eval.snapshot.status == ProductStatus::Blocked {
        Check::pass("status = 'Blocked',")
    } else {
        Check::fail("status != 'Blocked',")
    };
    eval.apply(check)
}

fn is_selling(eval: &mut Evaluation<'_>) -> bool {
    let check = if eval.snapshot.status == ProductStatus::Selling {
        Check::pass("status = 'Selling',")
    } else {
        Check::fail("status != 'Selling',")
    };
    eval.apply(check)
}

fn is_price_at_or_above_floor(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.last_price >= facts.min_price {
        Check::pass("current price >= min price,")
    } else {
        Check::fail("current price < min price,")
    };
    eval.apply(check)
}

fn has_no_full_stale_day(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.days_without_sales < 1 {
        Check::pass("days without sales < 1,")
    } else {
        Check::fail("days without sales >= 1,")
    };
    eval.apply(check)
}

fn is_velocity_above_minimum(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.average_sales_speed > facts.min_sales_speed {
        Check::pass("actual sales speed > min sales speed,")
    } else {
        Check::fail("actual sales speed <= min sales speed,")
    };
    eval.apply(check)
}

fn is_floor_reached(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.min_price == facts.last_price {
        Check::pass("min price border reached,")
    } else {
        Check::fail("min price border NOT reached,")
    };
    eval.apply(check)
}

fn is_stale_beyond_three_days(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.days_without_sales > 3 {
        Check::pass("days without sales > 3")
    } else {
        Check::fail("days without sales <= 3,")
    };
    eval.apply(check)
}

fn is_top(eval: &mut Evaluation<'_>, facts: SkuFacts) -> bool {
    let check = if facts.top {
        Check::pass("top,")
    } else {
        Check::fail("not top,")
    };
    eval.apply(check)
}

fn is_in_top100_search(eval: &mut Evaluation<'_>) -> bool {
    let check = if eval.snapshot.in_top100_search() {
        Check::pass("in search top 100,")
    } else {
        Check::fail("NOT in search top 100,")
    };
    eval.apply(check)
}
