//! Seeded synthetic scenario generator.
//!
//! Produces self-consistent demo scenarios for the CLI `sample` command
//! and for tests. The same seed always yields the same scenario, including
//! the snapshot instant, so whole runs are reproducible.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use repricer_core::domain::{
    CalendarEventCandidate, CompetitorSnapshot, EventId, ProductId, ProductSnapshot,
    ProductStatus, ShopState, SkuId, TimerDiscountCondition,
};
use repricer_core::ladder::LadderStep;

use crate::scenario::{ProductScenario, Scenario, SkuScenario, SCENARIO_SCHEMA_VERSION};

const LADDER_STEPS: u32 = 20;

pub fn synthetic_scenario(seed: u64, products: usize) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    let evaluated_at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    let products = (1..=products as u64)
        .map(|product_id| {
            let sku_count: u64 = rng.gen_range(2..=4);
            let skus = (0..sku_count)
                .map(|i| make_sku(&mut rng, product_id, i, evaluated_at))
                .collect();
            ProductScenario {
                product_id: ProductId(product_id),
                skus,
            }
        })
        .collect();

    Scenario {
        schema_version: SCENARIO_SCHEMA_VERSION,
        name: format!("synthetic-{seed}"),
        shop: ShopState {
            free_timer_discount_slots: rng.gen_range(0..=5),
        },
        products,
    }
}

fn make_sku(
    rng: &mut StdRng,
    product_id: u64,
    index: u64,
    evaluated_at: chrono::DateTime<Utc>,
) -> SkuScenario {
    let base = rng.gen_range(5..=20) as f64;
    let ladder: Vec<LadderStep> = (1..=LADDER_STEPS)
        .map(|n| LadderStep {
            number: n,
            value: base * n as f64,
            daily_sales_forecast: (LADDER_STEPS + 1 - n) as f64 * 0.5,
        })
        .collect();

    let current_step = rng.gen_range(5..=LADDER_STEPS as usize) - 1;
    let last_price = ladder[current_step].value;
    let min_price = ladder[rng.gen_range(1..=4)].value;

    let status = if rng.gen_bool(0.1) {
        ProductStatus::Blocked
    } else {
        ProductStatus::Selling
    };

    let snapshot = ProductSnapshot {
        sku_id: SkuId(product_id * 100 + index),
        product_id: ProductId(product_id),
        title: format!("Synthetic SKU {product_id}-{index}"),
        status,
        active: rng.gen_bool(0.95),
        stock: Some(rng.gen_range(0..=20)),
        reserved_stock: if rng.gen_bool(0.1) {
            rng.gen_range(1..=5)
        } else {
            0
        },
        min_price: Some(min_price),
        last_price: Some(last_price),
        days_without_sales: Some(rng.gen_range(0..=6)),
        top: Some(rng.gen_bool(0.2)),
        average_sales_speed: Some(rng.gen_range(0.1..5.0)),
        min_sales_speed: Some(rng.gen_range(0.5..2.0)),
        search_key: Some(format!("keyword {product_id}")),
        search_position: if rng.gen_bool(0.8) {
            Some(rng.gen_range(1..=120))
        } else {
            Some(-1)
        },
        calendar_search_position: None,
        on_calendar_event: false,
        on_timer_discount: false,
        most_suitable_calendar_event: if rng.gen_bool(0.2) {
            Some(CalendarEventCandidate {
                event_id: EventId(rng.gen_range(1..=9)),
                priority: rng.gen_range(1..=3),
                recommended_price: last_price * rng.gen_range(0.8..1.2),
            })
        } else {
            None
        },
        involved_calendar_event: None,
        mark: String::new(),
        responsible: Some("@demo".into()),
        evaluated_at,
    };

    let competitors = if rng.gen_bool(0.7) {
        vec![CompetitorSnapshot {
            price: last_price * rng.gen_range(0.85..1.15),
            stock: rng.gen_range(0..=10),
            average_sales_speed: Some(rng.gen_range(0.1..5.0)),
            price_change_date: evaluated_at.date_naive() - Duration::days(rng.gen_range(0..=10)),
            search_position: Some(rng.gen_range(1..=120)),
            drift: 0,
        }]
    } else {
        Vec::new()
    };

    SkuScenario {
        snapshot,
        ladder,
        competitors,
        nearest_delivery: if rng.gen_bool(0.3) {
            Some(evaluated_at.date_naive() + Duration::days(rng.gen_range(1..=14)))
        } else {
            None
        },
        // every SKU carries a discount condition; the promo resolver treats
        // a missing one as a failed lookup and skips the SKU
        timer_discount_condition: Some(TimerDiscountCondition {
            max_price: last_price * rng.gen_range(0.7..1.3),
        }),
        timer_discount: None,
    }
}
