//! Speculative edits of a cached residents page.
//!
//! Each function maps the page as cached (if any) to the page to show while
//! the request is in flight. `None` means "leave the cache alone".

use chrono::Utc;
use rand::Rng;

use crate::api::{NewResident, Paginated, Resident, ResidentPatch};

/// Temporary id for a record the server has not assigned one to yet
pub fn placeholder_id() -> i64 {
  rand::thread_rng().gen_range(1..1_000_000_000)
}

/// Prepend the new record and count it
pub fn apply_create(
  previous: Option<Paginated<Resident>>,
  payload: NewResident,
  page_size: u32,
  id: i64,
) -> Option<Paginated<Resident>> {
  let now = Utc::now().to_rfc3339();
  let record = payload.into_resident(id, &now);

  Some(match previous {
    Some(mut page) => {
      page.items.insert(0, record);
      page.total += 1;
      page
    }
    None => Paginated {
      items: vec![record],
      page: 1,
      page_size,
      total: 1,
    },
  })
}

/// Merge the patch into the record with `id`
pub fn apply_update(
  previous: Option<Paginated<Resident>>,
  id: i64,
  patch: &ResidentPatch,
) -> Option<Paginated<Resident>> {
  let mut page = previous?;
  for resident in page.items.iter_mut().filter(|r| r.id == id) {
    patch.apply_to(resident);
  }
  Some(page)
}

/// Drop the record with `id`; the count never goes below zero
pub fn apply_delete(previous: Option<Paginated<Resident>>, id: i64) -> Option<Paginated<Resident>> {
  let mut page = previous?;
  page.items.retain(|r| r.id != id);
  page.total = page.total.saturating_sub(1);
  Some(page)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures::{new_resident, page, resident};
  use crate::cache::{optimistic, QueryCache};
  use crate::residents::ResidentsQuery;
  use std::time::Duration;

  #[test]
  fn test_placeholder_id_range() {
    for _ in 0..1000 {
      let id = placeholder_id();
      assert!((1..1_000_000_000).contains(&id));
    }
  }

  #[test]
  fn test_create_prepends_and_counts() {
    let before = page(vec![resident(1), resident(2)], 12);
    let after = apply_create(Some(before), new_resident("Ana"), 10, 777).unwrap();

    assert_eq!(after.total, 13);
    assert_eq!(after.items.len(), 3);
    assert_eq!(after.items[0].id, 777);
    assert_eq!(after.items[0].first_name, "Ana");
    assert!(after.items[0].created_at.is_some());
    assert_eq!(after.items[1].id, 1);
  }

  #[test]
  fn test_create_without_cached_page_synthesizes_one() {
    let after = apply_create(None, new_resident("Ana"), 20, 5).unwrap();
    assert_eq!(after.page, 1);
    assert_eq!(after.page_size, 20);
    assert_eq!(after.total, 1);
    assert_eq!(after.items.len(), 1);
  }

  #[test]
  fn test_update_merges_matching_record_only() {
    let before = page(vec![resident(1), resident(2)], 2);
    let patch = ResidentPatch {
      occupation: Some(Some("Teacher".to_string())),
      age: Some(31),
      ..Default::default()
    };
    let after = apply_update(Some(before.clone()), 2, &patch).unwrap();

    assert_eq!(after.items[1].occupation.as_deref(), Some("Teacher"));
    assert_eq!(after.items[1].age, 31);
    assert_eq!(after.items[0], before.items[0]);
    assert_eq!(after.total, 2);

    assert_eq!(apply_update(None, 2, &patch), None);
  }

  #[test]
  fn test_delete_removes_and_floors_total() {
    let before = page(vec![resident(1), resident(2)], 2);
    let after = apply_delete(Some(before), 1).unwrap();
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.total, 1);

    let empty = page(vec![], 0);
    assert_eq!(apply_delete(Some(empty), 1).unwrap().total, 0);

    assert_eq!(apply_delete(None, 1), None);
  }

  #[test]
  fn test_failed_mutations_restore_exact_page() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let key = ResidentsQuery::new(1, 10);
    let before = page(vec![resident(1), resident(2)], 2);
    cache.set(&key, &before);

    let snapshot = optimistic::begin(&cache, &key, |prev| {
      apply_create(prev, new_resident("Ana"), 10, 99)
    });
    assert_eq!(cache.get::<Paginated<Resident>>(&key).unwrap().total, 3);
    snapshot.rollback(&cache);
    assert_eq!(cache.get::<Paginated<Resident>>(&key), Some(before.clone()));

    let snapshot = optimistic::begin(&cache, &key, |prev| apply_delete(prev, 2));
    assert_eq!(cache.get::<Paginated<Resident>>(&key).unwrap().items.len(), 1);
    snapshot.rollback(&cache);
    assert_eq!(cache.get::<Paginated<Resident>>(&key), Some(before.clone()));

    let patch = ResidentPatch {
      first_name: Some("Pedro".to_string()),
      ..Default::default()
    };
    let snapshot = optimistic::begin(&cache, &key, |prev| apply_update(prev, 1, &patch));
    assert_eq!(
      cache.get::<Paginated<Resident>>(&key).unwrap().items[0].first_name,
      "Pedro"
    );
    snapshot.rollback(&cache);
    assert_eq!(cache.get::<Paginated<Resident>>(&key), Some(before));
  }
}
