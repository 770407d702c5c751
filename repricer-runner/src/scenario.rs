//! JSON scenario format — the full input of one repricing run.
//!
//! A scenario bundles the shop state with every product, its sibling SKUs,
//! and the per-SKU collaborator data (ladder steps, competitors, delivery,
//! discount condition/state) that a persistence layer would otherwise
//! fetch. Persisted scenarios carry a `schema_version`; newer versions
//! than this build understands are rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use repricer_core::domain::{
    CompetitorSnapshot, ProductId, ProductSnapshot, ShopState, TimerDiscountCondition,
    TimerDiscountState,
};
use repricer_core::ladder::LadderStep;

/// Current scenario schema version.
pub const SCENARIO_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported scenario schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },

    #[error("scenario contains no products")]
    Empty,
}

/// One SKU with everything its evaluation consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuScenario {
    pub snapshot: ProductSnapshot,
    /// Raw ladder steps; validated into a `PriceLadder` per evaluation,
    /// so a broken ladder skips one SKU instead of the whole scenario.
    pub ladder: Vec<LadderStep>,
    #[serde(default)]
    pub competitors: Vec<CompetitorSnapshot>,
    #[serde(default)]
    pub nearest_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub timer_discount_condition: Option<TimerDiscountCondition>,
    #[serde(default)]
    pub timer_discount: Option<TimerDiscountState>,
}

/// A product and its sibling SKUs, evaluated as one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductScenario {
    pub product_id: ProductId,
    pub skus: Vec<SkuScenario>,
}

/// The full input of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub shop: ShopState,
    pub products: Vec<ProductScenario>,
}

fn default_schema_version() -> u32 {
    SCENARIO_SCHEMA_VERSION
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        if scenario.schema_version > SCENARIO_SCHEMA_VERSION {
            return Err(ScenarioError::UnsupportedSchema {
                found: scenario.schema_version,
                max: SCENARIO_SCHEMA_VERSION,
            });
        }
        if scenario.products.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn sku_count(&self) -> usize {
        self.products.iter().map(|p| p.skus.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::synthetic_scenario;

    #[test]
    fn roundtrips_through_json() {
        let scenario = synthetic_scenario(7, 3);
        let json = scenario.to_json().unwrap();
        let reloaded = Scenario::from_json(&json).unwrap();
        assert_eq!(reloaded.name, scenario.name);
        assert_eq!(reloaded.sku_count(), scenario.sku_count());
    }

    #[test]
    fn rejects_newer_schema() {
        let mut scenario = synthetic_scenario(7, 1);
        scenario.schema_version = SCENARIO_SCHEMA_VERSION + 1;
        let json = scenario.to_json().unwrap();
        let err = Scenario::from_json(&json).unwrap_err();
        assert!(matches!(err, ScenarioError::UnsupportedSchema { .. }));
    }

    #[test]
    fn rejects_empty_scenario() {
        let json = format!(
            r#"{{"schema_version":{SCENARIO_SCHEMA_VERSION},"name":"empty","shop":{{"free_timer_discount_slots":0}},"products":[]}}"#
        );
        assert!(matches!(
            Scenario::from_json(&json),
            Err(ScenarioError::Empty)
        ));
    }
}
