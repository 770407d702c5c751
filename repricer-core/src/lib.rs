//! Repricer Core — the marketplace repricing decision engine.
//!
//! This crate contains the pure, synchronous heart of the repricer:
//! - Domain types (product snapshots, competitors, timer discounts, ids)
//! - The discrete per-SKU price ladder
//! - The decision result accumulator with its trail/narrative audit record
//! - Three decision trees (triage, profit increase, sales acceleration)
//!   plus the shared promotion resolver
//! - The product pass with the stage-then-commit promotion barrier
//!
//! Everything here is deterministic against the snapshot instant; no clock
//! or I/O is consulted. Persistence, notification delivery and scheduling
//! live in the runner crates.

pub mod domain;
pub mod engine;
pub mod ladder;
pub mod notify;
pub mod result;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner moves across a worker
    /// boundary is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::ProductSnapshot>();
        require_sync::<domain::ProductSnapshot>();
        require_send::<domain::CompetitorSnapshot>();
        require_sync::<domain::CompetitorSnapshot>();
        require_send::<ladder::PriceLadder>();
        require_sync::<ladder::PriceLadder>();
        require_send::<result::DecisionResult>();
        require_sync::<result::DecisionResult>();
        require_send::<engine::SkuCase>();
        require_sync::<engine::SkuCase>();
        require_send::<engine::ProductOutcome>();
        require_sync::<engine::ProductOutcome>();
    }
}
