//! Repricer Runner — run orchestration on top of `repricer-core`.
//!
//! This crate provides:
//! - TOML run configuration with a content-addressable run id
//! - Versioned JSON scenario loading
//! - The scenario runner (one product pass per product, skip-and-continue
//!   on broken per-SKU inputs)
//! - JSON/CSV artifact export with schema-version gating on import
//! - A seeded synthetic scenario generator for demos and tests

pub mod config;
pub mod export;
pub mod runner;
pub mod scenario;
pub mod synthetic;

pub use config::{ConfigError, RunConfig, RunId};
pub use export::{export_json, import_json, load_summary, save_artifacts, ArtifactPaths};
pub use runner::{run_scenario, ProductReport, RunSummary, RunTotals, SCHEMA_VERSION};
pub use scenario::{
    ProductScenario, Scenario, ScenarioError, SkuScenario, SCENARIO_SCHEMA_VERSION,
};
pub use synthetic::synthetic_scenario;
