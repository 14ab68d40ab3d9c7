//! View state of the residents table: sort, filters, paging, selection.
//!
//! Nothing here talks to the network. The state only derives the
//! [`ResidentsQuery`] that the view hands to the cache.

use std::collections::BTreeSet;

use super::key::{normalize_search, ResidentsQuery, SortDirection, SortField};
use crate::api::{page_count, Gender, Resident};

pub const PAGE_SIZES: [u32; 5] = [10, 20, 30, 40, 50];

#[derive(Debug, Clone)]
pub struct TableState {
  search: Option<String>,
  sort: Option<(SortField, SortDirection)>,
  gender: Option<Gender>,
  barangay: Option<String>,
  /// 0-based
  page_index: u32,
  page_size: u32,
  total: Option<u64>,
  selected: BTreeSet<i64>,
}

impl TableState {
  pub fn new(page_size: u32) -> Self {
    Self {
      search: None,
      sort: None,
      gender: None,
      barangay: None,
      page_index: 0,
      page_size: page_size.max(1),
      total: None,
      selected: BTreeSet::new(),
    }
  }

  /// Query for the current state; the server's page numbers start at 1
  pub fn query(&self) -> ResidentsQuery {
    ResidentsQuery {
      q: self.search.clone(),
      page: self.page_index + 1,
      page_size: self.page_size,
      sort_by: self.sort.map(|(field, _)| field),
      sort_dir: self.sort.map(|(_, dir)| dir),
      gender: self.gender,
      barangay: self.barangay.clone(),
    }
  }

  // --------------------------------------------------------------------------
  // Search, sort, filters
  // --------------------------------------------------------------------------

  pub fn search(&self) -> Option<&str> {
    self.search.as_deref()
  }

  pub fn set_search(&mut self, q: &str) {
    let q = normalize_search(q);
    if q != self.search {
      self.search = q;
      self.page_index = 0;
    }
  }

  pub fn sort(&self) -> Option<(SortField, SortDirection)> {
    self.sort
  }

  /// Cycle `field` through ascending, descending and unsorted.
  ///
  /// A column other than the sorted one starts at ascending.
  pub fn toggle_sort(&mut self, field: SortField) {
    self.sort = match self.sort {
      Some((current, SortDirection::Asc)) if current == field => {
        Some((field, SortDirection::Desc))
      }
      Some((current, SortDirection::Desc)) if current == field => None,
      _ => Some((field, SortDirection::Asc)),
    };
    self.page_index = 0;
  }

  pub fn set_sort(&mut self, sort: Option<(SortField, SortDirection)>) {
    if sort != self.sort {
      self.sort = sort;
      self.page_index = 0;
    }
  }

  pub fn gender_filter(&self) -> Option<Gender> {
    self.gender
  }

  pub fn set_gender_filter(&mut self, gender: Option<Gender>) {
    if gender != self.gender {
      self.gender = gender;
      self.page_index = 0;
    }
  }

  pub fn barangay_filter(&self) -> Option<&str> {
    self.barangay.as_deref()
  }

  pub fn set_barangay_filter(&mut self, barangay: Option<String>) {
    let barangay = barangay.filter(|b| !b.trim().is_empty());
    if barangay != self.barangay {
      self.barangay = barangay;
      self.page_index = 0;
    }
  }

  pub fn has_filters(&self) -> bool {
    self.search.is_some() || self.gender.is_some() || self.barangay.is_some()
  }

  /// Drop search and column filters
  pub fn reset_filters(&mut self) {
    self.set_search("");
    self.set_gender_filter(None);
    self.set_barangay_filter(None);
  }

  // --------------------------------------------------------------------------
  // Pagination
  // --------------------------------------------------------------------------

  pub fn page_index(&self) -> u32 {
    self.page_index
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn total(&self) -> Option<u64> {
    self.total
  }

  /// Record the server-side row count of the latest result
  pub fn set_total(&mut self, total: u64) {
    self.total = Some(total);
  }

  /// Known number of pages (at least one), if a result has arrived
  pub fn page_count(&self) -> Option<u32> {
    self.total.map(|total| page_count(total, self.page_size))
  }

  pub fn set_page_size(&mut self, size: u32) {
    let size = size.max(1);
    if size != self.page_size {
      self.page_size = size;
      self.page_index = 0;
    }
  }

  /// Step through `PAGE_SIZES`; `forward` picks the next larger size
  pub fn cycle_page_size(&mut self, forward: bool) {
    let next = if forward {
      PAGE_SIZES.iter().find(|&&s| s > self.page_size)
    } else {
      PAGE_SIZES.iter().rev().find(|&&s| s < self.page_size)
    };
    if let Some(&size) = next {
      self.set_page_size(size);
    }
  }

  /// Jump to `index`, clamped to the known page range
  pub fn go_to_page(&mut self, index: u32) {
    self.page_index = match self.page_count() {
      Some(count) => index.min(count - 1),
      None => index,
    };
  }

  pub fn can_next_page(&self) -> bool {
    self
      .page_count()
      .map(|count| self.page_index + 1 < count)
      .unwrap_or(false)
  }

  pub fn can_prev_page(&self) -> bool {
    self.page_index > 0
  }

  pub fn next_page(&mut self) {
    if self.can_next_page() {
      self.page_index += 1;
    }
  }

  pub fn prev_page(&mut self) {
    self.page_index = self.page_index.saturating_sub(1);
  }

  // --------------------------------------------------------------------------
  // Selection (by record id, so it survives re-sorting)
  // --------------------------------------------------------------------------

  pub fn is_selected(&self, id: i64) -> bool {
    self.selected.contains(&id)
  }

  pub fn toggle_row(&mut self, id: i64) {
    if !self.selected.remove(&id) {
      self.selected.insert(id);
    }
  }

  /// Select every row on the page, or clear them all when already all selected
  pub fn toggle_all(&mut self, page: &[Resident]) {
    if self.all_selected(page) {
      for r in page {
        self.selected.remove(&r.id);
      }
    } else {
      self.selected.extend(page.iter().map(|r| r.id));
    }
  }

  pub fn all_selected(&self, page: &[Resident]) -> bool {
    !page.is_empty() && page.iter().all(|r| self.selected.contains(&r.id))
  }

  pub fn some_selected(&self, page: &[Resident]) -> bool {
    page.iter().any(|r| self.selected.contains(&r.id)) && !self.all_selected(page)
  }

  pub fn selected_ids(&self) -> Vec<i64> {
    self.selected.iter().copied().collect()
  }

  pub fn clear_selection(&mut self) {
    self.selected.clear();
  }
}

/// Distinct non-empty barangays on the current page, sorted
pub fn barangay_options(rows: &[Resident]) -> Vec<String> {
  rows
    .iter()
    .map(|r| r.barangay.trim())
    .filter(|b| !b.is_empty())
    .map(String::from)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures::{named, resident};

  fn with_total(total: u64) -> TableState {
    let mut table = TableState::new(10);
    table.set_total(total);
    table
  }

  #[test]
  fn test_query_uses_one_based_pages() {
    let mut table = with_total(100);
    assert_eq!(table.query().page, 1);
    table.next_page();
    table.next_page();
    assert_eq!(table.query().page, 3);
    assert_eq!(table.query().page_size, 10);
  }

  #[test]
  fn test_sort_and_filters_reset_page() {
    let mut table = with_total(100);

    table.go_to_page(4);
    table.toggle_sort(SortField::LastName);
    assert_eq!(table.page_index(), 0);

    table.go_to_page(4);
    table.set_gender_filter(Some(Gender::Female));
    assert_eq!(table.page_index(), 0);

    table.go_to_page(4);
    table.set_barangay_filter(Some("Poblacion".to_string()));
    assert_eq!(table.page_index(), 0);

    table.go_to_page(4);
    table.set_search("ana");
    assert_eq!(table.page_index(), 0);

    table.go_to_page(4);
    table.set_page_size(20);
    assert_eq!(table.page_index(), 0);
  }

  #[test]
  fn test_unchanged_filter_keeps_page() {
    let mut table = with_total(100);
    table.set_search("ana");
    table.go_to_page(3);
    table.set_search(" ana ");
    table.set_gender_filter(None);
    assert_eq!(table.page_index(), 3);
  }

  #[test]
  fn test_sort_cycle() {
    let mut table = TableState::new(10);
    table.toggle_sort(SortField::Age);
    assert_eq!(table.sort(), Some((SortField::Age, SortDirection::Asc)));
    table.toggle_sort(SortField::Age);
    assert_eq!(table.sort(), Some((SortField::Age, SortDirection::Desc)));
    table.toggle_sort(SortField::Age);
    assert_eq!(table.sort(), None);

    table.toggle_sort(SortField::Age);
    table.toggle_sort(SortField::Barangay);
    assert_eq!(table.sort(), Some((SortField::Barangay, SortDirection::Asc)));

    let query = table.query();
    assert_eq!(query.sort_by, Some(SortField::Barangay));
    assert_eq!(query.sort_dir, Some(SortDirection::Asc));
  }

  #[test]
  fn test_page_count_and_sort_resets_to_first_page() {
    let mut table = with_total(25);
    assert_eq!(table.page_count(), Some(3));

    table.next_page();
    table.next_page();
    assert_eq!(table.query().page, 3);
    assert!(!table.can_next_page());
    table.next_page();
    assert_eq!(table.query().page, 3);

    table.toggle_sort(SortField::FirstName);
    assert_eq!(table.query().page, 1);
  }

  #[test]
  fn test_navigation_is_clamped() {
    let mut table = with_total(0);
    assert_eq!(table.page_count(), Some(1));
    table.go_to_page(7);
    assert_eq!(table.page_index(), 0);
    table.prev_page();
    assert_eq!(table.page_index(), 0);
    assert!(!table.can_prev_page());

    let mut unknown = TableState::new(10);
    assert!(!unknown.can_next_page());
    unknown.go_to_page(2);
    assert_eq!(unknown.page_index(), 2);
  }

  #[test]
  fn test_page_size_cycle() {
    let mut table = TableState::new(10);
    table.cycle_page_size(true);
    assert_eq!(table.page_size(), 20);
    table.cycle_page_size(false);
    table.cycle_page_size(false);
    assert_eq!(table.page_size(), 10);

    let mut odd = TableState::new(15);
    odd.cycle_page_size(true);
    assert_eq!(odd.page_size(), 20);
  }

  #[test]
  fn test_selection_is_by_id() {
    let mut table = TableState::new(10);
    let page = vec![resident(1), resident(2), resident(3)];

    table.toggle_row(2);
    assert!(table.is_selected(2));
    assert!(table.some_selected(&page));
    assert!(!table.all_selected(&page));

    // Same ids in another order
    let resorted = vec![resident(3), resident(2), resident(1)];
    assert!(table.some_selected(&resorted));

    table.toggle_all(&resorted);
    assert!(table.all_selected(&page));
    assert!(!table.some_selected(&page));
    assert_eq!(table.selected_ids(), vec![1, 2, 3]);

    table.toggle_all(&page);
    assert!(table.selected_ids().is_empty());

    table.toggle_row(1);
    table.toggle_row(1);
    assert!(!table.is_selected(1));

    table.toggle_row(5);
    table.clear_selection();
    assert!(table.selected_ids().is_empty());
    assert!(!table.all_selected(&[]));
  }

  #[test]
  fn test_barangay_options_are_unique_and_sorted() {
    let rows = vec![
      named(1, "A", "San Roque"),
      named(2, "B", "Poblacion"),
      named(3, "C", ""),
      named(4, "D", "San Roque"),
      named(5, "E", "Bagong Silang"),
    ];
    assert_eq!(
      barangay_options(&rows),
      vec!["Bagong Silang", "Poblacion", "San Roque"]
    );
  }

  #[test]
  fn test_reset_filters() {
    let mut table = TableState::new(10);
    table.set_search("x");
    table.set_gender_filter(Some(Gender::Male));
    table.set_barangay_filter(Some("  ".to_string()));
    assert_eq!(table.barangay_filter(), None);
    assert!(table.has_filters());

    table.reset_filters();
    assert!(!table.has_filters());
    assert_eq!(table.query(), ResidentsQuery::new(1, 10));
  }
}
