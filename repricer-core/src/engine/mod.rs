//! The decision engines and the product pass that drives them.
//!
//! Three trees share one [`Evaluation`] context:
//! - triage: validation, blocked/inactive/out-of-stock handling, velocity
//!   routing into one of the pricing trees
//! - profit: upward repricing against the best competitor
//! - acceleration: downward repricing toward a sale
//!
//! Both pricing trees terminate in the shared promotion resolver, and the
//! product pass settles staged promotion intents once per product.

pub mod acceleration;
pub mod eval;
pub mod product;
pub mod profit;
pub mod promo;
pub mod triage;

pub use eval::{EngineError, Evaluation, SkuFacts, SkuInputs};
pub use product::{
    evaluate_product, evaluate_sku, ProductOutcome, PromotionCommit, SkippedSku, SkuCase,
};

#[cfg(test)]
pub(crate) mod testkit;
