use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A requested stay as a half-open date interval `[check_in, check_out)`.
/// Adjacent stays may share a boundary date without conflicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaySpan {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StaySpan {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Check-out must be strictly after check-in.
    pub fn is_well_formed(&self) -> bool {
        self.check_out > self.check_in
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Two half-open intervals `[a,b)` and `[c,d)` overlap iff
    /// `a < d && c < b`. A check-out equal to another's check-in is
    /// not a conflict.
    pub fn overlaps(&self, other: &StaySpan) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

/// A committed reservation. `reference_no`, `price_cents` and
/// `is_featured_deal` are assigned at admission; price only changes
/// through the explicit reschedule path, which re-runs admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub reference_no: String,
    pub room_id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub span: StaySpan,
    pub price_cents: i32,
    pub is_featured_deal: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn span(a: &str, b: &str) -> StaySpan {
        StaySpan::new(date(a), date(b))
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = span("2025-03-01", "2025-03-03");
        let b = span("2025-03-02", "2025-03-04");

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_spans_do_not_overlap() {
        let a = span("2025-03-01", "2025-03-03");
        let b = span("2025-03-03", "2025-03-05");

        // Back-to-back bookings share the boundary date
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_contained_span_overlaps() {
        let outer = span("2025-03-01", "2025-03-10");
        let inner = span("2025-03-04", "2025-03-05");

        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_disjoint_spans_do_not_overlap() {
        let a = span("2025-03-01", "2025-03-03");
        let b = span("2025-03-10", "2025-03-12");

        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_well_formed() {
        assert!(span("2025-03-01", "2025-03-02").is_well_formed());
        assert!(!span("2025-03-02", "2025-03-02").is_well_formed());
        assert!(!span("2025-03-03", "2025-03-02").is_well_formed());
    }

    #[test]
    fn test_nights() {
        assert_eq!(span("2025-03-01", "2025-03-03").nights(), 2);
    }
}
