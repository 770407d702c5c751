//! Profit-increase tree.
//!
//! Entered when sales velocity is adequate. Prices upward or flat against
//! the best competitor, depending on relative search rank, relative sales
//! speed, and how long the competitor's price has stood. The rank-worse
//! branches walk the persistent per-competitor drift counter. Hands off to
//! the shared promotion resolver at the end of every path.

use crate::domain::CompetitorSnapshot;
use crate::ladder::LadderError;
use crate::result::Check;

use super::eval::{Evaluation, EngineError, SkuFacts};
use super::promo;

/// Rank margin (in search positions) separating the "comfortably ahead"
/// branches from the close-race branches.
const RANK_MARGIN: i64 = 8;

pub fn run(eval: &mut Evaluation<'_>, facts: SkuFacts) -> Result<(), EngineError> {
    if eval.has_best_competitor_link_and_stock() {
        let Some(competitor) = eval.inputs.competitors.first().cloned() else {
            return Ok(());
        };
        let Some(competitor_speed) = eval.require_competitor_speed(&competitor) else {
            return Ok(());
        };
        against_competitor(eval, facts, &competitor, competitor_speed)?;
    } else {
        without_competitor(eval, facts)?;
    }

    if let Some(planned) = eval.result.new_price {
        if planned > facts.min_price {
            eval.narrate("keeping the staged step as the planned price change\n");
        }
    }

    promo::resolve(eval, facts)
}

fn against_competitor(
    eval: &mut Evaluation<'_>,
    facts: SkuFacts,
    competitor: &CompetitorSnapshot,
    competitor_speed: f64,
) -> Result<(), EngineError> {
    let our_rank = eval.snapshot.search_rank();
    let their_rank = competitor.search_rank();
    let price_age_days = competitor.days_since_price_change(eval.today());

    if !eval.apply(rank_better(our_rank, their_rank)) {
        // Ranked worse: price off the competitor with the drift delta.
        return drift_priced(eval, facts, competitor_speed);
    }

    if eval.apply(rank_margin_beyond(our_rank, their_rank)) {
        if eval.apply(outselling(facts.average_sales_speed, competitor_speed)) {
            if eval.apply(price_stood_three_days(price_age_days)) {
                eval.set_new_price(Some((facts.last_price * 1.02).ceil()));
                eval.narrate(
                    "1. target price = current price raised 2%, rounded up\n\
                     2. mark suffix \"3B\"\n",
                );
                eval.update_mark("3B");
            } else {
                let step = eval
                    .inputs
                    .ladder
                    .step_above_price(competitor.price)
                    .ok_or(LadderError::NoStepAbovePrice {
                        price: competitor.price,
                    })?;
                eval.set_new_price(Some(step.value));
                eval.narrate(
                    "1. target price = the ladder step above the competitor's price\n\
                     2. mark suffix \"3C\"\n",
                );
                eval.update_mark("3C");
            }
        } else if eval.apply(price_stood_three_days(price_age_days)) {
            if eval.apply(competitor_priced_above_us(competitor.price, facts.last_price)) {
                eval.set_new_price(Some((competitor.price - 1.0).floor()));
                eval.narrate(
                    "a lower-ranked competitor with a higher price outsells us; \
                     tag the shop manager\n",
                );
                eval.update_mark("3D");
            } else if eval.apply(priced_ten_percent_over(facts.last_price, competitor.price)) {
                eval.set_new_price(Some((competitor.price * 1.09).floor()));
                eval.narrate(
                    "1. target price = 9% above the best competitor, rounded down\n\
                     2. mark suffix \"3E\"\n",
                );
                eval.update_mark("3E");
            } else {
                eval.set_new_price(Some((facts.last_price * 0.99).floor()));
                eval.narrate(
                    "1. lower our current price by 1%, rounded down\n\
                     2. mark suffix \"3F\"\n",
                );
                eval.update_mark("3F");
            }
        } else {
            eval.set_new_price(Some(competitor.price));
            eval.narrate("1. target price = the competitor's price\n2. mark suffix \"3G\"\n");
            eval.update_mark("3G");
        }
        return Ok(());
    }

    // Ahead, but by eight positions or fewer.
    if eval.apply(outselling(facts.average_sales_speed, competitor_speed)) {
        if eval.apply(price_stood_three_days(price_age_days)) {
            eval.set_new_price(Some((facts.last_price * 1.01).ceil()));
            eval.narrate(
                "1. target price = current price raised 1%, rounded up\n\
                 2. mark suffix \"3H\"\n",
            );
            eval.update_mark("3H");
        } else {
            eval.set_new_price(Some(competitor.price.floor()));
            eval.narrate("1. target price = the competitor's price\n2. mark suffix \"3I\"\n");
            eval.update_mark("3I");
        }
    } else if eval.apply(price_stood_three_days(price_age_days)) {
        eval.set_new_price(Some((facts.last_price * 0.98).floor()));
        eval.narrate(
            "1. target price = current price lowered 2%, rounded down\n\
             2. mark suffix \"3J\"\n",
        );
        eval.update_mark("3J");
    } else {
        eval.set_new_price(Some((competitor.price - 1.0).floor()));
        eval.narrate(
            "1. target price = the competitor's price minus 1, rounded down\n\
             2. mark suffix \"3K\"\n",
        );
        eval.update_mark("3K");
    }
    Ok(())
}

/// Ranked worse than the best competitor: walk the persistent drift
/// counter and price off the competitor at `(100 + drift)%`.
fn drift_priced(
    eval: &mut Evaluation<'_>,
    facts: SkuFacts,
    competitor_speed: f64,
) -> Result<(), EngineError> {
    let outsell = eval.apply(outselling(facts.average_sales_speed, competitor_speed));
    let delta = if outsell { 1 } else { -1 };
    let Some(best) = eval.inputs.competitors.first_mut() else {
        return Ok(());
    };
    best.drift += delta;
    let price = best.drift_adjusted_price();
    let (competitor_price, drift) = (best.price, best.drift);
    eval.set_new_price(Some(price));
    if outsell {
        eval.narrate(&format!(
            "1. target price = competitor price * (100 + drift)%, rounded up \
             ({competitor_price} * {}%)\n2. mark suffix \"3L\"\n",
            100 + drift
        ));
        eval.update_mark("3L");
    } else {
        eval.narrate(&format!(
            "1. target price = competitor price * (100 + drift)%, rounded up \
             ({competitor_price} * {}%)\n2. mark suffix \"3N\"\n",
            100 + drift
        ));
        eval.update_mark("3N");
    }
    Ok(())
}

/// No usable competitor: price from delivery timing when known, otherwise
/// take the step below the current one.
fn without_competitor(eval: &mut Evaluation<'_>, facts: SkuFacts) -> Result<(), EngineError> {
    if eval.has_delivery_info() {
        let Some(delivery) = eval.inputs.nearest_delivery else {
            return Ok(());
        };
        let days_until = (delivery - eval.today()).num_days().max(1);
        let target_velocity = (facts.stock as f64 / days_until as f64).round();
        let step = eval.inputs.ladder.optimal_step(target_velocity);
        eval.set_new_price(Some(step.value));
        eval.narrate(
            "1. choose the ladder step minimizing the out-of-stock window before \
             the next delivery\n2. mark suffix \"3A1\"\n",
        );
        eval.update_mark("3A1");
    } else {
        let current = eval.current_step()?;
        let step = eval
            .inputs
            .ladder
            .one_below(current)
            .ok_or(LadderError::NoStepBelowPrice {
                price: current.value,
            })?;
        eval.set_new_price(Some(step.value));
        eval.narrate("1. choose the ladder step below the current one\n2. mark \"3A2\"\n");
        eval.set_mark("3A2");
    }
    Ok(())
}

// ─── Predicates ─────────────────────────────────────────────────────

fn rank_better(our_rank: i64, their_rank: i64) -> Check {
    Check::with_full_narrative(
        our_rank < their_rank,
        if our_rank < their_rank {
            "our search position for the keyword is better than the best competitor's"
        } else {
            "our search position for the keyword is worse than the best competitor's"
        },
    )
}

fn rank_margin_beyond(our_rank: i64, their_rank: i64) -> Check {
    let beyond = their_rank.saturating_sub(our_rank) > RANK_MARGIN;
    Check::with_full_narrative(
        beyond,
        if beyond {
            "we rank more than 8 positions above the competitor"
        } else {
            "we rank at most 8 positions above the competitor"
        },
    )
}

fn price_stood_three_days(age_days: i64) -> Check {
    Check::with_full_narrative(
        age_days > 3,
        if age_days > 3 {
            "the competitor's price has stood for more than 3 days"
        } else {
            "the competitor's price changed within the last 3 days"
        },
    )
}

fn outselling(our_speed: f64, their_speed: f64) -> Check {
    if our_speed > their_speed {
        Check::pass("our sales speed > the competitor's,")
    } else {
        Check::fail("our sales speed <= the competitor's,")
    }
}

fn competitor_priced_above_us(their_price: f64, our_price: f64) -> Check {
    if their_price > our_price {
        Check::pass("competitor price > ours,")
    } else {
        Check::fail("competitor price <= ours,")
    }
}

fn priced_ten_percent_over(our_price: f64, their_price: f64) -> Check {
    if our_price / their_price >= 1.1 {
        Check::pass("our price exceeds the competitor's by 10% or more,")
    } else {
        Check::fail("our price is within 10% of the competitor's,")
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::{competitor, evaluate, inputs, snapshot};

    #[test]
    fn rank_far_ahead_outselling_stood_price_raises_two_percent() {
        let mut snap = snapshot();
        snap.last_price = Some(100.0);
        snap.search_position = Some(5);
        let mut inp = inputs();
        inp.competitors = vec![competitor(95.0, 1.0, 50, 5)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(102.0));
        assert!(result.mark.contains("3B"));
    }

    #[test]
    fn rank_far_ahead_outselling_fresh_price_steps_above_competitor() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(95.0, 1.0, 50, 1)];
        let result = evaluate(&mut snap, &mut inp);
        // ladder step just above 95 is 100
        assert_eq!(result.new_price, Some(100.0));
        assert!(result.mark.contains("3C"));
    }

    #[test]
    fn outsold_by_higher_priced_competitor_undercuts_by_one() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(180.5, 5.0, 50, 5)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(179.0));
        assert!(result.mark.contains("3D"));
    }

    #[test]
    fn ten_percent_over_cheaper_competitor_lands_nine_percent_above() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(130.0, 5.0, 50, 5)];
        let result = evaluate(&mut snap, &mut inp);
        // 150 / 130 > 1.1, so floor(130 * 1.09)
        assert_eq!(result.new_price, Some(141.0));
        assert!(result.mark.contains("3E"));
    }

    #[test]
    fn outsold_close_price_shaves_one_percent() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(145.0, 5.0, 50, 5)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(148.0));
        assert!(result.mark.contains("3F"));
    }

    #[test]
    fn outsold_fresh_price_matches_competitor() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(145.5, 5.0, 50, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(145.5));
        assert!(result.mark.contains("3G"));
    }

    #[test]
    fn close_race_outselling_stood_price_raises_one_percent() {
        let mut snap = snapshot();
        snap.last_price = Some(100.0);
        snap.search_position = Some(5);
        let mut inp = inputs();
        inp.competitors = vec![competitor(95.0, 1.0, 10, 5)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(101.0));
        assert!(result.mark.contains("3H"));
    }

    #[test]
    fn close_race_outselling_fresh_price_floors_competitor_price() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(145.7, 1.0, 10, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(145.0));
        assert!(result.mark.contains("3I"));
    }

    #[test]
    fn close_race_outsold_stood_price_cuts_two_percent() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(145.0, 5.0, 10, 5)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(147.0));
        assert!(result.mark.contains("3J"));
    }

    #[test]
    fn close_race_outsold_fresh_price_undercuts_by_one() {
        let mut snap = snapshot();
        let mut inp = inputs();
        inp.competitors = vec![competitor(145.5, 5.0, 10, 1)];
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(144.0));
        assert!(result.mark.contains("3K"));
    }

    #[test]
    fn drift_walks_up_while_outselling_a_better_ranked_competitor() {
        let mut snap = snapshot();
        snap.search_position = Some(50);
        let mut inp = inputs();
        inp.competitors = vec![competitor(200.0, 1.0, 5, 5)];

        let mut prices = Vec::new();
        for _ in 0..3 {
            let result = evaluate(&mut snap, &mut inp);
            assert!(result.mark.contains("3L"));
            prices.push(result.new_price.unwrap());
        }
        assert_eq!(inp.competitors[0].drift, 3);
        assert_eq!(prices, vec![202.0, 204.0, 206.0]);
        assert!(prices.windows(2).all(|p| p[1] > p[0]));
    }

    #[test]
    fn drift_walks_down_while_being_outsold() {
        let mut snap = snapshot();
        snap.search_position = Some(50);
        let mut inp = inputs();
        inp.competitors = vec![competitor(200.0, 9.0, 5, 5)];

        for expected in [198.0, 196.0, 194.0] {
            let result = evaluate(&mut snap, &mut inp);
            assert!(result.mark.contains("3N"));
            assert_eq!(result.new_price, Some(expected));
        }
        assert_eq!(inp.competitors[0].drift, -3);
    }

    #[test]
    fn no_competitor_with_delivery_picks_velocity_matched_step() {
        let mut snap = snapshot();
        snap.stock = Some(20);
        let mut inp = inputs();
        inp.nearest_delivery = Some(super::super::testkit::today() + chrono::Duration::days(5));
        let result = evaluate(&mut snap, &mut inp);
        // target 4/day: highest step still forecasting 4.0 is step 13
        assert_eq!(result.new_price, Some(130.0));
        assert!(result.mark.contains("3A1"));
    }

    #[test]
    fn no_competitor_without_delivery_steps_down_once() {
        let mut snap = snapshot();
        let mut inp = inputs();
        let result = evaluate(&mut snap, &mut inp);
        assert_eq!(result.new_price, Some(140.0));
        assert!(result.mark.starts_with("3A2"));
    }

    #[test]
    fn competitor_without_speed_is_a_validation_error() {
        let mut snap = snapshot();
        let mut inp = inputs();
        let mut comp = competitor(120.0, 1.0, 50, 1);
        comp.average_sales_speed = None;
        inp.competitors = vec![comp];
        let result = evaluate(&mut snap, &mut inp);
        assert!(result.error.unwrap().contains("average_sales_speed"));
        assert!(result.new_price.is_none());
    }
}
