//! End-to-end product pass tests through the public API.

use chrono::{TimeZone, Utc};

use repricer_core::domain::{
    CalendarEventCandidate, EventId, ProductId, ProductSnapshot, ProductStatus, ShopState, SkuId,
};
use repricer_core::engine::{evaluate_product, SkuCase, SkuInputs};
use repricer_core::ladder::{LadderStep, PriceLadder};
use repricer_core::notify::NullNotifier;
use repricer_core::result::Directive;

fn ladder() -> PriceLadder {
    PriceLadder::new(
        (1..=20)
            .map(|n| LadderStep {
                number: n,
                value: (n as f64) * 10.0,
                daily_sales_forecast: (21 - n) as f64 * 0.5,
            })
            .collect(),
    )
    .unwrap()
}

fn snapshot(sku: u64) -> ProductSnapshot {
    ProductSnapshot {
        sku_id: SkuId(sku),
        product_id: ProductId(77),
        title: format!("Ceramic Mug {sku}"),
        status: ProductStatus::Selling,
        active: true,
        stock: Some(0),
        reserved_stock: 0,
        min_price: Some(50.0),
        last_price: Some(120.0),
        days_without_sales: Some(0),
        top: Some(false),
        average_sales_speed: Some(2.0),
        min_sales_speed: Some(1.0),
        search_key: None,
        search_position: Some(5),
        calendar_search_position: None,
        on_calendar_event: false,
        on_timer_discount: false,
        most_suitable_calendar_event: None,
        involved_calendar_event: None,
        mark: String::new(),
        responsible: None,
        evaluated_at: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
    }
}

fn case(sku: u64) -> SkuCase {
    SkuCase {
        snapshot: snapshot(sku),
        inputs: SkuInputs {
            ladder: ladder(),
            competitors: Vec::new(),
            nearest_delivery: None,
            timer_discount_condition: None,
            timer_discount: None,
            shop: ShopState {
                free_timer_discount_slots: 0,
            },
        },
    }
}

fn with_candidate(mut case: SkuCase, recommended: f64) -> SkuCase {
    case.snapshot.most_suitable_calendar_event = Some(CalendarEventCandidate {
        event_id: EventId(5),
        priority: 1,
        recommended_price: recommended,
    });
    case
}

#[test]
fn enrollment_commits_once_when_every_sibling_stages() {
    // out-of-stock SKUs with a calendar candidate stage 1.10B enrollment
    let mut cases = vec![
        with_candidate(case(1), 110.0),
        with_candidate(case(2), 115.0),
        with_candidate(case(3), 95.0),
    ];
    let outcome = evaluate_product(&mut cases, &NullNotifier);

    assert!(outcome.skipped.is_empty());
    let commit = outcome.commit.expect("all siblings staged");
    assert_eq!(commit.event_id, EventId(5));
    assert_eq!(
        commit.directives,
        vec![Directive::AddToCalendarEvent {
            event_id: EventId(5)
        }]
    );
    for result in &outcome.results {
        assert!(result.new_promotion_price.is_some());
        assert!(result.mark.ends_with("1.10B"));
    }
}

#[test]
fn one_unstaged_sibling_blocks_the_commit() {
    // the second SKU has no candidate and lands on the restock jump instead
    let mut cases = vec![with_candidate(case(1), 110.0), case(2)];
    let outcome = evaluate_product(&mut cases, &NullNotifier);

    assert!(outcome.commit.is_none());
    assert_eq!(outcome.results[1].mark, "1.3");
    assert_eq!(outcome.results[1].new_price, Some(150.0));
}

#[test]
fn skipped_sibling_blocks_the_commit_but_not_the_pass() {
    let mut cases = vec![with_candidate(case(1), 110.0), case(2)];
    // SKU 2's ladder has no step 15, so the restock jump is a fatal lookup
    cases[1].snapshot.min_price = Some(20.0);
    cases[1].snapshot.last_price = Some(25.0);
    cases[1].inputs.ladder = PriceLadder::new(
        (1..=5)
            .map(|n| LadderStep {
                number: n,
                value: (n as f64) * 10.0,
                daily_sales_forecast: 1.0,
            })
            .collect(),
    )
    .unwrap();

    let outcome = evaluate_product(&mut cases, &NullNotifier);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].sku_id, SkuId(2));
    assert!(outcome.skipped[0].reason.contains("step number 15"));
    assert!(outcome.commit.is_none());
}

#[test]
fn selling_product_passes_without_any_promotion() {
    let mut cases: Vec<SkuCase> = (1..=4).map(case).collect();
    for c in &mut cases {
        c.snapshot.stock = Some(8);
    }
    let outcome = evaluate_product(&mut cases, &NullNotifier);

    assert!(outcome.commit.is_none());
    assert!(outcome.skipped.is_empty());
    for result in &outcome.results {
        // profit tree, no competitor, no delivery: one step down from 120
        assert_eq!(result.new_price, Some(110.0));
        assert!(result.mark.starts_with("3A2"));
    }
}
