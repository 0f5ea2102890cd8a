//! Generic list-data controller behind every admin screen.
//!
//! Holds the fetched collection, the derived filtered view, the debounced
//! search input, the page cursor and the set of records with a mutation in
//! flight. All changes to the collection recompute the view in the same
//! call, so a row can never be visible after it left the collection.
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::error::AdminError;
use crate::pager::Pager;
use crate::records::Record;
use crate::search::{Debouncer, filter_view};

/// Where a screen's single fetch stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Terminal for this load; includes the empty-result notice.
    Failed(AdminError),
}

#[derive(Clone, Debug)]
pub struct ListController<R: Record> {
    collection: Vec<R>,
    view: Vec<usize>,
    input: String,
    applied: String,
    debouncer: Debouncer,
    pager: Pager,
    selected: usize,
    state: LoadState,
    in_flight: HashSet<String>,
    empty_message: String,
}

impl<R: Record> ListController<R> {
    pub fn new(page_size: usize, debounce: Duration, empty_message: impl Into<String>) -> Self {
        Self {
            collection: Vec::new(),
            view: Vec::new(),
            input: String::new(),
            applied: String::new(),
            debouncer: Debouncer::new(debounce),
            pager: Pager::new(page_size),
            selected: 0,
            state: LoadState::Loading,
            in_flight: HashSet::new(),
            empty_message: empty_message.into(),
        }
    }

    // ---- loading ----

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready)
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Apply the outcome of a fetch. Success replaces the collection; failure
    /// leaves it empty. A successful fetch with no rows becomes the
    /// empty-result state.
    pub fn finish_load(&mut self, result: Result<Vec<R>, AdminError>) {
        match result {
            Ok(records) if records.is_empty() => {
                self.collection.clear();
                self.state = LoadState::Failed(AdminError::EmptyResult {
                    message: self.empty_message.clone(),
                });
            }
            Ok(records) => {
                self.collection = records;
                self.state = LoadState::Ready;
            }
            Err(err) => {
                self.collection.clear();
                self.state = LoadState::Failed(err);
            }
        }
        self.recompute();
        self.pager.reset();
        self.selected = 0;
    }

    // ---- search ----

    /// Current (possibly not yet applied) search text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Search text the view was last computed with.
    pub fn applied_query(&self) -> &str {
        &self.applied
    }

    pub fn set_input(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.debouncer.restart(now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.debouncer.restart(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        self.input.pop();
        self.debouncer.restart(now);
    }

    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Run the debounced search if its quiet period has elapsed. Returns
    /// whether the view was recomputed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.fire(now) {
            self.apply_search();
            true
        } else {
            false
        }
    }

    /// Recompute the view from the current input immediately and go back to
    /// page 1, even if the result set did not change.
    pub fn apply_search(&mut self) {
        self.debouncer.cancel();
        self.applied = self.input.clone();
        self.recompute();
        self.pager.reset();
        self.selected = 0;
    }

    // ---- views ----

    pub fn collection(&self) -> &[R] {
        &self.collection
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &R> {
        self.view.iter().map(|&i| &self.collection[i])
    }

    /// Records on the current page, in view order.
    pub fn window(&self) -> Vec<&R> {
        self.view[self.pager.window(self.view.len())]
            .iter()
            .map(|&i| &self.collection[i])
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.collection.iter().find(|r| r.id() == id)
    }

    // ---- paging ----

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.view.len())
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.view.len());
        self.clamp_selection();
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
        self.clamp_selection();
    }

    pub fn jump_to_page(&mut self, page: usize) -> bool {
        let moved = self.pager.jump(page, self.view.len());
        if moved {
            self.selected = 0;
        }
        moved
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size, self.view.len());
        self.clamp_selection();
    }

    // ---- selection within the window ----

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&R> {
        self.window().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.window_len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn window_len(&self) -> usize {
        self.pager.window(self.view.len()).len()
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.window_len().saturating_sub(1));
    }

    // ---- mutations ----

    /// Remove a record after the server confirmed the delete. The view is
    /// recomputed and the page clamped in the same step.
    pub fn remove(&mut self, id: &str) -> Option<R> {
        let pos = self.collection.iter().position(|r| r.id() == id)?;
        let removed = self.collection.remove(pos);
        self.after_change();
        Some(removed)
    }

    /// Replace a record in place with a fresh copy from the server.
    pub fn replace(&mut self, record: R) -> bool {
        match self.collection.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                self.after_change();
                true
            }
            None => false,
        }
    }

    /// Patch a record in place.
    pub fn update<F: FnOnce(&mut R)>(&mut self, id: &str, f: F) -> bool {
        match self.collection.iter_mut().find(|r| r.id() == id) {
            Some(slot) => {
                f(slot);
                self.after_change();
                true
            }
            None => false,
        }
    }

    /// Mark `id` as having a mutation in flight. Returns false when one is
    /// already pending, in which case the caller must not issue another.
    pub fn begin_mutation(&mut self, id: &str) -> bool {
        self.in_flight.insert(id.to_string())
    }

    pub fn end_mutation(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    fn recompute(&mut self) {
        self.view = filter_view(&self.collection, &self.applied);
    }

    fn after_change(&mut self) {
        self.recompute();
        self.pager.clamp(self.view.len());
        self.clamp_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{VerificationRequest, VerificationStatus};

    fn rows(n: usize) -> Vec<VerificationRequest> {
        (0..n)
            .map(|i| VerificationRequest {
                id: format!("id{i}"),
                name: format!("User {i}"),
                email: format!("user{i}@example.com"),
                status: VerificationStatus::Pending,
                requested_at: None,
            })
            .collect()
    }

    fn loaded(n: usize) -> ListController<VerificationRequest> {
        let mut c = ListController::new(10, Duration::from_millis(300), "Nothing here.");
        c.finish_load(Ok(rows(n)));
        c
    }

    #[test]
    fn empty_fetch_is_a_distinct_state() {
        let mut c: ListController<VerificationRequest> =
            ListController::new(10, Duration::from_millis(300), "No reports at the moment.");
        c.finish_load(Ok(Vec::new()));
        match c.state() {
            LoadState::Failed(e) => {
                assert!(e.is_empty_result());
                assert_eq!(e.user_message(), "No reports at the moment.");
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn failed_fetch_leaves_collection_empty() {
        let mut c = loaded(5);
        c.begin_load();
        c.finish_load(Err(AdminError::transport("users", "boom")));
        assert!(c.collection().is_empty());
        assert_eq!(c.view_len(), 0);
        assert!(!c.is_ready());
    }

    #[test]
    fn search_runs_after_quiet_period_and_resets_page() {
        let t0 = Instant::now();
        let mut c = loaded(25);
        c.next_page();
        c.next_page();
        assert_eq!(c.page(), 3);
        c.push_char('u', t0);
        assert!(!c.tick(t0 + Duration::from_millis(100)));
        assert_eq!(c.page(), 3);
        assert!(c.tick(t0 + Duration::from_millis(300)));
        assert_eq!(c.page(), 1);
        assert_eq!(c.view_len(), 25);
    }

    #[test]
    fn delete_on_last_page_clamps() {
        let mut c = loaded(21);
        c.jump_to_page(3);
        assert_eq!(c.window().len(), 1);
        assert!(c.remove("id20").is_some());
        assert_eq!(c.collection().len(), 20);
        assert_eq!(c.view_len(), 20);
        assert_eq!(c.page(), 2);
    }

    #[test]
    fn update_that_stops_matching_drops_out_of_view() {
        let t0 = Instant::now();
        let mut c = loaded(3);
        c.set_input("user 1", t0);
        c.apply_search();
        assert_eq!(c.view_len(), 1);
        c.update("id1", |r| r.name = "Renamed".into());
        assert_eq!(c.view_len(), 0);
        assert_eq!(c.collection().len(), 3);
    }

    #[test]
    fn second_mutation_on_same_record_is_refused() {
        let mut c = loaded(2);
        assert!(c.begin_mutation("id0"));
        assert!(!c.begin_mutation("id0"));
        assert!(c.begin_mutation("id1"));
        c.end_mutation("id0");
        assert!(!c.is_in_flight("id0"));
        assert!(c.begin_mutation("id0"));
    }

    #[test]
    fn selection_stays_inside_window() {
        let mut c = loaded(12);
        c.next_page();
        for _ in 0..5 {
            c.select_next();
        }
        assert_eq!(c.selected_index(), 1);
        assert_eq!(c.selected().map(|r| r.id.as_str()), Some("id11"));
    }
}
