//! Sales-acceleration tree.
//!
//! Entered when velocity is inadequate (or sales have stalled above the
//! floor). Chooses a downward ladder step relative to the current price or
//! the best competitor's, falls back to the exact minimum price when the
//! step would land below the floor, then runs the shared promotion
//! resolver. The resolver lives here because this tree owns it; the profit
//! tree calls into it as well.

use crate::ladder::LadderStep;
use crate::result::Check;

use super::eval::{Evaluation, EngineError, SkuFacts};
use super::promo;

pub fn run(eval: &mut Evaluation<'_>, facts: SkuFacts) -> Result<(), EngineError> {
    let step = pick_reduction_step(eval, facts)?;
    if eval.result.is_error() {
        // competitor validation failed; halt with the error result
        return Ok(());
    }

    if eval.apply(step_above_floor(step, facts.min_price)) {
        if let Some(step) = step {
            eval.set_new_price(Some(step.value));
        }
    } else {
        eval.set_new_price(Some(facts.min_price));
        eval.narrate(
            "1. stage the minimum price as the planned change for this SKU\n\
             2. mark \"2MIN\"\n",
        );
        eval.set_mark("2MIN");
    }

    promo::resolve(eval, facts)
}

fn pick_reduction_step(
    eval: &mut Evaluation<'_>,
    facts: SkuFacts,
) -> Result<Option<LadderStep>, EngineError> {
    if eval.has_best_competitor_link_and_stock() {
        let Some(competitor) = eval.inputs.competitors.first().cloned() else {
            return Ok(None);
        };
        let Some(competitor_speed) = eval.require_competitor_speed(&competitor) else {
            return Ok(None);
        };

        if eval.apply(competitor_outsells_us(
            facts.average_sales_speed,
            competitor_speed,
        )) {
            if eval.apply(competitor_priced_above_us(competitor.price, facts.last_price)) {
                eval.narrate("1. choose the ladder step below the current one\n2. mark \"2C\"\n");
                eval.set_mark("2C");
                let current = eval.current_step()?;
                Ok(eval.inputs.ladder.one_below(current))
            } else {
                eval.narrate(
                    "1. choose the ladder step below the competitor's price\n2. mark \"2D\"\n",
                );
                eval.set_mark("2D");
                Ok(eval.inputs.ladder.step_below_price(competitor.price))
            }
        } else {
            eval.notifier.send_message(
                "We are selling faster than the competitor and are lowering the price \
                 one step anyway.",
            );
            eval.narrate(
                "notify chat that we sell faster and still lower the price\n\
                 1. choose the ladder step below the current one\n\
                 2. mark \"2B\"\n",
            );
            eval.set_mark("2B");
            let current = eval.current_step()?;
            Ok(eval.inputs.ladder.one_below(current))
        }
    } else {
        eval.narrate("1. choose the ladder step below the current one\n2. mark \"2A\"\n");
        eval.set_mark("2A");
        let current = eval.current_step()?;
        Ok(eval.inputs.ladder.one_below(current))
    }
}

// ─── Predicates ─────────────────────────────────────────────────────

fn competitor_outsells_us(our_speed: f64, their_speed: f64) -> Check {
    if our_speed < their_speed {
        Check::pass("our sales speed < the competitor's,")
    } else {
        Check::fail("our sales speed >= the competitor's,")
    }
}

fn competitor_priced_above_us(their_price: f64, our_price: f64) -> Check {
    if their_price > our_price {
        Check::pass("competitor price > ours,")
    } else {
        Check::fail("competitor price <= ours,")
    }
}

fn step_above_floor(step: Option<LadderStep>, min_price: f64) -> Check {
    if step.is_some_and(|s| s.value >= min_price) {
        Check::pass("chosen step >= min price,")
    } else {
        Check::fail("chosen step below min price or undefined,")
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::{competitor, evaluate, inputs, snapshot};

    fn slow_snapshot() -> crate::domain::ProductSnapshot {
        let mut snap = snapshot();
        snap.average_sales_speed = Some(0.5);
        snap
    }

    #[test]
    fn outsold_by_pricier_competitor_steps_below_current() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(180.0, 3.0, 40, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2C"));
        assert_eq!(result.new_price, Some(140.0));
    }

    #[test]
    fn outsold_by_cheaper_competitor_steps_below_their_price() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(100.0, 3.0, 40, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2D"));
        assert_eq!(result.new_price, Some(90.0));
    }

    #[test]
    fn outselling_still_lowers_one_step() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(180.0, 0.1, 40, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2B"));
        assert_eq!(result.new_price, Some(140.0));
    }

    #[test]
    fn no_usable_competitor_steps_below_current() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2A"));
        assert_eq!(result.new_price, Some(140.0));
    }

    #[test]
    fn out_of_stock_competitor_is_not_usable() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        let mut comp = competitor(100.0, 3.0, 40, 1);
        comp.stock = 0;
        inp.competitors = vec![comp];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2A"));
        assert_eq!(result.new_price, Some(140.0));
    }

    #[test]
    fn step_below_floor_falls_back_to_exact_min_price() {
        let mut snap = slow_snapshot();
        snap.min_price = Some(55.0);
        snap.last_price = Some(55.0);
        let mut inp = inputs();
        let result = evaluate(&mut snap, &mut inp);
        // step below the bracket of 55 is 50, under the floor
        assert!(result.mark.starts_with("2MIN"));
        assert_eq!(result.new_price, Some(55.0));
    }

    #[test]
    fn bottom_of_ladder_falls_back_to_exact_min_price() {
        let mut snap = slow_snapshot();
        snap.min_price = Some(5.0);
        snap.last_price = Some(8.0);
        let mut inp = inputs();
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.mark.starts_with("2MIN"));
        assert_eq!(result.new_price, Some(5.0));
    }

    #[test]
    fn competitor_without_speed_halts_with_error() {
        let mut snap = slow_snapshot();
        let mut inp = inputs();
        let mut comp = competitor(100.0, 3.0, 40, 1);
        comp.average_sales_speed = None;
        inp.competitors = vec![comp];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.is_error());
        assert!(result.new_price.is_none());
        assert!(result.mark.is_empty());
    }
}
