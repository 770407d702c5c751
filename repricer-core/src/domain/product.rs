//! Per-SKU snapshot consumed by the decision engines.
//!
//! The snapshot is assembled by a persistence collaborator before each run;
//! the engines read it and mutate exactly two things: the classification
//! `mark` and (in the above-ladder clamp case) `last_price`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{EventId, ProductId, SkuId};

/// Marketplace listing status of a SKU.
///
/// Anything the marketplace reports outside the two statuses the decision
/// tree branches on is carried verbatim in `Other` and routed to the
/// manual-review leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum ProductStatus {
    Blocked,
    Selling,
    Other(String),
}

/// The most suitable calendar event a SKU could be enrolled into, as
/// pre-ranked by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventCandidate {
    pub event_id: EventId,
    /// Eligibility priority assigned by the candidate ranking.
    pub priority: i32,
    /// Price the event recommends for this SKU while enrolled.
    pub recommended_price: f64,
}

/// Everything the triage tree needs to know about one SKU at one instant.
///
/// The seven fields the tree requires (`stock`, `min_price`, `last_price`,
/// `days_without_sales`, `top`, `average_sales_speed`, `min_sales_speed`)
/// are optional here; presence is enforced by validation at the top of the
/// triage run, which turns a missing field into an error result naming it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub sku_id: SkuId,
    pub product_id: ProductId,
    /// Full human-readable listing title, used in alert texts.
    pub title: String,
    pub status: ProductStatus,
    pub active: bool,

    pub stock: Option<i64>,
    /// Long-term-storage reserve awaiting replenishment.
    pub reserved_stock: i64,
    pub min_price: Option<f64>,
    pub last_price: Option<f64>,
    pub days_without_sales: Option<i64>,
    /// Whether the SKU is a designated top item for the shop.
    pub top: Option<bool>,
    pub average_sales_speed: Option<f64>,
    pub min_sales_speed: Option<f64>,

    /// Search keyword the listing is tracked under.
    pub search_key: Option<String>,
    /// Position in marketplace search for `search_key`; `None` or `-1`
    /// both mean "not ranked in the top 100".
    pub search_position: Option<i64>,
    /// Position inside the calendar-event listing this SKU is enrolled in,
    /// distinct from the general search ranking.
    pub calendar_search_position: Option<i64>,

    pub on_calendar_event: bool,
    pub on_timer_discount: bool,
    pub most_suitable_calendar_event: Option<CalendarEventCandidate>,
    pub involved_calendar_event: Option<EventId>,

    /// Classification mark of the branch that last priced this SKU.
    /// Reset at the start of every triage run.
    #[serde(default)]
    pub mark: String,
    /// Person answering for this shop, named in alerts.
    pub responsible: Option<String>,
    /// Instant the snapshot was taken; all age comparisons use this so a
    /// run is deterministic regardless of when it executes.
    pub evaluated_at: DateTime<Utc>,
}

impl ProductSnapshot {
    /// Label used when tagging the responsible person in alert texts.
    pub fn responsible_label(&self) -> &str {
        self.responsible
            .as_deref()
            .unwrap_or("NO RESPONSIBLE PERSON ASSIGNED")
    }

    /// General search rank with missing/`-1` normalized to "unranked"
    /// (worst possible position, so rank comparisons need no special case).
    pub fn search_rank(&self) -> i64 {
        normalize_rank(self.search_position)
    }

    /// Ranked inside the top 100 of general search.
    pub fn in_top100_search(&self) -> bool {
        matches!(self.search_position, Some(p) if p != -1)
    }

    /// Ranked inside the top 100 of the calendar event the SKU is enrolled in.
    pub fn in_top100_of_calendar_event(&self) -> bool {
        matches!(self.calendar_search_position, Some(p) if (1..=100).contains(&p))
    }
}

/// Missing or `-1` positions compare as worse than any real rank.
pub(crate) fn normalize_rank(position: Option<i64>) -> i64 {
    position.filter(|p| *p >= 0).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_positions(
        search: Option<i64>,
        calendar: Option<i64>,
    ) -> ProductSnapshot {
        ProductSnapshot {
            sku_id: SkuId(1),
            product_id: ProductId(1),
            title: "Test SKU".into(),
            status: ProductStatus::Selling,
            active: true,
            stock: Some(5),
            reserved_stock: 0,
            min_price: Some(100.0),
            last_price: Some(150.0),
            days_without_sales: Some(0),
            top: Some(false),
            average_sales_speed: Some(1.0),
            min_sales_speed: Some(0.5),
            search_key: None,
            search_position: search,
            calendar_search_position: calendar,
            on_calendar_event: false,
            on_timer_discount: false,
            most_suitable_calendar_event: None,
            involved_calendar_event: None,
            mark: String::new(),
            responsible: None,
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn minus_one_counts_as_unranked() {
        let snap = snapshot_with_positions(Some(-1), None);
        assert!(!snap.in_top100_search());
        assert_eq!(snap.search_rank(), i64::MAX);
    }

    #[test]
    fn ranked_position_is_top100() {
        let snap = snapshot_with_positions(Some(12), None);
        assert!(snap.in_top100_search());
        assert_eq!(snap.search_rank(), 12);
    }

    #[test]
    fn calendar_ranking_is_separate_from_general_search() {
        let snap = snapshot_with_positions(None, Some(40));
        assert!(!snap.in_top100_search());
        assert!(snap.in_top100_of_calendar_event());

        let snap = snapshot_with_positions(Some(3), Some(250));
        assert!(snap.in_top100_search());
        assert!(!snap.in_top100_of_calendar_event());
    }

    #[test]
    fn responsible_fallback_label() {
        let mut snap = snapshot_with_positions(None, None);
        assert_eq!(snap.responsible_label(), "NO RESPONSIBLE PERSON ASSIGNED");
        snap.responsible = Some("@maria".into());
        assert_eq!(snap.responsible_label(), "@maria");
    }
}
