//! Scenario runner — drives one product pass per product and collects the
//! run summary.
//!
//! A broken per-SKU input (unbuildable ladder, failed lookup inside the
//! engine) is fatal for that SKU only: it is recorded as skipped and the
//! pass continues with the remaining siblings.

use serde::{Deserialize, Serialize};

use repricer_core::domain::ProductId;
use repricer_core::engine::{
    evaluate_product, ProductOutcome, PromotionCommit, SkippedSku, SkuCase, SkuInputs,
};
use repricer_core::ladder::PriceLadder;
use repricer_core::notify::Notifier;
use repricer_core::result::DecisionResult;

use crate::scenario::{ProductScenario, Scenario};

/// Current schema version for persisted run summaries.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything one product pass produced, keyed for the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReport {
    pub product_id: ProductId,
    pub results: Vec<DecisionResult>,
    pub skipped: Vec<SkippedSku>,
    pub commit: Option<PromotionCommit>,
}

/// Aggregate counters over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub skus: usize,
    pub priced: usize,
    pub errors: usize,
    pub skipped: usize,
    pub commits: usize,
}

/// Complete result of one run over a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub scenario_name: String,
    /// Content hash of the `RunConfig` that produced this summary, empty
    /// for ad-hoc runs.
    #[serde(default)]
    pub run_id: String,
    pub products: Vec<ProductReport>,
    pub totals: RunTotals,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Evaluate every product of a scenario.
///
/// The scenario is taken by value: snapshots and competitor drift counters
/// are mutated by the engines, and the caller decides whether to persist
/// the mutated state.
pub fn run_scenario(scenario: Scenario, notifier: &dyn Notifier) -> RunSummary {
    let mut products = Vec::with_capacity(scenario.products.len());
    let mut totals = RunTotals::default();

    for product in scenario.products {
        let report = run_product(product, &scenario.shop, notifier);
        totals.skus += report.results.len() + report.skipped.len();
        totals.priced += report
            .results
            .iter()
            .filter(|r| r.new_price.is_some())
            .count();
        totals.errors += report.results.iter().filter(|r| r.is_error()).count();
        totals.skipped += report.skipped.len();
        totals.commits += usize::from(report.commit.is_some());
        products.push(report);
    }

    RunSummary {
        schema_version: SCHEMA_VERSION,
        scenario_name: scenario.name,
        run_id: String::new(),
        products,
        totals,
    }
}

fn run_product(
    product: ProductScenario,
    shop: &repricer_core::domain::ShopState,
    notifier: &dyn Notifier,
) -> ProductReport {
    let product_id = product.product_id;
    let mut cases = Vec::with_capacity(product.skus.len());
    let mut skipped = Vec::new();

    for sku in product.skus {
        match PriceLadder::new(sku.ladder) {
            Ok(ladder) => cases.push(SkuCase {
                inputs: SkuInputs {
                    ladder,
                    competitors: sku.competitors,
                    nearest_delivery: sku.nearest_delivery,
                    timer_discount_condition: sku.timer_discount_condition,
                    timer_discount: sku.timer_discount,
                    shop: *shop,
                },
                snapshot: sku.snapshot,
            }),
            Err(err) => skipped.push(SkippedSku {
                sku_id: sku.snapshot.sku_id,
                reason: err.to_string(),
            }),
        }
    }

    let ProductOutcome {
        results,
        skipped: engine_skipped,
        commit,
    } = evaluate_product(&mut cases, notifier);
    skipped.extend(engine_skipped);

    // a SKU dropped before the pass also blocks any promotion commit
    let commit = if skipped.is_empty() { commit } else { None };

    ProductReport {
        product_id,
        results,
        skipped,
        commit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::synthetic_scenario;
    use repricer_core::notify::NullNotifier;

    #[test]
    fn totals_add_up() {
        let scenario = synthetic_scenario(11, 5);
        let expected_skus = scenario.sku_count();
        let summary = run_scenario(scenario, &NullNotifier);

        assert_eq!(summary.totals.skus, expected_skus);
        let priced: usize = summary
            .products
            .iter()
            .flat_map(|p| &p.results)
            .filter(|r| r.new_price.is_some())
            .count();
        assert_eq!(summary.totals.priced, priced);
        assert!(summary.totals.commits <= summary.products.len());
    }

    #[test]
    fn broken_ladder_skips_one_sku_only() {
        let mut scenario = synthetic_scenario(11, 2);
        // reversed steps fail ladder validation
        scenario.products[0].skus[0].ladder.reverse();
        let summary = run_scenario(scenario, &NullNotifier);

        assert_eq!(summary.totals.skipped, 1);
        let report = &summary.products[0];
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("not strictly increasing"));
        // siblings of the skipped SKU still produced results
        assert!(!report.results.is_empty());
    }

    #[test]
    fn same_scenario_same_summary() {
        let a = run_scenario(synthetic_scenario(3, 4), &NullNotifier);
        let b = run_scenario(synthetic_scenario(3, 4), &NullNotifier);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
