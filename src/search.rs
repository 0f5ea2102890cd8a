//! In-memory search over a fetched collection.
//!
//! The filtered view is kept as indices into the collection so the two can
//! never disagree about which records exist.
use std::time::{Duration, Instant};

use crate::records::Record;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Case-insensitive substring match of `query` against any search field.
/// An empty query matches everything.
pub fn matches<R: Record>(record: &R, query: &str) -> bool {
    let q = query.to_lowercase();
    if q.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
}

/// Indices of the records in `collection` that match `query`, in collection order.
pub fn filter_view<R: Record>(collection: &[R], query: &str) -> Vec<usize> {
    collection
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(*r, query))
        .map(|(i, _)| i)
        .collect()
}

/// Trailing-edge debounce for search input. Every keystroke restarts the
/// timer; the filter runs once the input has been quiet for `delay`.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending run and schedule a new one `delay` after `now`.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ReportRecord, VerificationRequest, VerificationStatus};

    fn mk_request(id: &str, name: &str, email: &str) -> VerificationRequest {
        VerificationRequest {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            status: VerificationStatus::Pending,
            requested_at: None,
        }
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let rows = vec![
            mk_request("1", "Alice Doe", "alice@example.com"),
            mk_request("2", "Bob Tables", "bobby@example.com"),
            mk_request("3", "Carol", "carol@BOBCAT.io"),
        ];
        assert_eq!(filter_view(&rows, "bOb"), vec![1, 2]);
        assert_eq!(filter_view(&rows, ""), vec![0, 1, 2]);
        assert!(filter_view(&rows, "zed").is_empty());
    }

    #[test]
    fn missing_optional_fields_never_match() {
        let report = ReportRecord { id: "r1".into(), reporter_email: None, reason: None, created_at: None };
        assert!(!matches(&report, "spam"));
        assert!(matches(&report, ""));
    }

    #[test]
    fn debouncer_restarts_on_every_keystroke() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.restart(t0);
        d.restart(t0 + Duration::from_millis(200));
        assert!(!d.fire(t0 + Duration::from_millis(350)));
        assert!(d.is_pending());
        assert!(d.fire(t0 + Duration::from_millis(500)));
        assert!(!d.fire(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn cancelled_debouncer_never_fires() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.restart(t0);
        d.cancel();
        assert!(!d.fire(t0 + Duration::from_secs(5)));
    }
}
