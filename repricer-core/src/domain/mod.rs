//! Domain types for the repricing engine.

pub mod competitor;
pub mod discount;
pub mod ids;
pub mod product;

pub use competitor::CompetitorSnapshot;
pub use discount::{ShopState, TimerDiscountCondition, TimerDiscountState};
pub use ids::{DiscountId, EventId, ProductId, ShopId, SkuId};
pub use product::{CalendarEventCandidate, ProductSnapshot, ProductStatus};
