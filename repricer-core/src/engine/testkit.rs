//! Shared fixtures for engine tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::domain::{
    CompetitorSnapshot, ProductId, ProductSnapshot, ProductStatus, ShopState, SkuId,
};
use crate::ladder::{LadderStep, PriceLadder};
use crate::notify::NullNotifier;
use crate::result::DecisionResult;

use super::eval::{Evaluation, SkuInputs};
use super::triage;

pub(crate) fn evaluated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

pub(crate) fn today() -> NaiveDate {
    evaluated_at().date_naive()
}

/// Active selling SKU priced at 150 on the [`ladder`], safely above its
/// floor of 50, with healthy velocity. Tests override what they branch on.
pub(crate) fn snapshot() -> ProductSnapshot {
    ProductSnapshot {
        sku_id: SkuId(1),
        product_id: ProductId(1),
        title: "Garden Trowel Pro".into(),
        status: ProductStatus::Selling,
        active: true,
        stock: Some(10),
        reserved_stock: 0,
        min_price: Some(50.0),
        last_price: Some(150.0),
        days_without_sales: Some(0),
        top: Some(false),
        average_sales_speed: Some(2.0),
        min_sales_speed: Some(1.0),
        search_key: Some("garden trowel".into()),
        search_position: Some(5),
        calendar_search_position: None,
        on_calendar_event: false,
        on_timer_discount: false,
        most_suitable_calendar_event: None,
        involved_calendar_event: None,
        mark: String::new(),
        responsible: Some("@maria".into()),
        evaluated_at: evaluated_at(),
    }
}

/// Twenty steps valued 10, 20, .. 200, with sales forecasts falling as the
/// price rises.
pub(crate) fn ladder() -> PriceLadder {
    let steps = (1..=20)
        .map(|n| LadderStep {
            number: n,
            value: (n as f64) * 10.0,
            daily_sales_forecast: (21 - n) as f64 * 0.5,
        })
        .collect();
    PriceLadder::new(steps).unwrap()
}

pub(crate) fn inputs() -> SkuInputs {
    SkuInputs {
        ladder: ladder(),
        competitors: Vec::new(),
        nearest_delivery: None,
        timer_discount_condition: None,
        timer_discount: None,
        shop: ShopState {
            free_timer_discount_slots: 0,
        },
    }
}

/// Competitor whose price changed `price_age_days` ago, ranked at `rank`.
pub(crate) fn competitor(price: f64, speed: f64, rank: i64, price_age_days: i64) -> CompetitorSnapshot {
    CompetitorSnapshot {
        price,
        stock: 5,
        average_sales_speed: Some(speed),
        price_change_date: today() - chrono::Duration::days(price_age_days),
        search_position: Some(rank),
        drift: 0,
    }
}

/// Full triage run with no siblings and a discarding notifier.
pub(crate) fn evaluate(
    snapshot: &mut ProductSnapshot,
    inputs: &mut SkuInputs,
) -> DecisionResult {
    let notifier = NullNotifier;
    let mut eval = Evaluation::new(snapshot, inputs, &[], &notifier);
    triage::run(&mut eval).unwrap();
    eval.into_result()
}
