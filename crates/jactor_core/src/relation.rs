//! Lazy resolution of foreign-key relations.
//!
//! # Responsibility
//! - Resolve one related record by id through an injected fetch function,
//!   memoizing the last successful fetch.
//! - Resolve the children of a parent id through an injected list fetch.
//!
//! # Invariants
//! - A cached value is returned only for the exact id it was fetched for.
//! - A fetch that finds nothing never populates the slot.
//! - Fetch errors are returned unchanged; the resolver never fails on its own.
//! - The slot is guarded by a mutex; the fetch itself runs outside the lock,
//!   so concurrent misses may fetch twice but never observe a torn slot.

use crate::model::persistent::RecordId;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-entry cache for one foreign-key relation.
pub struct RelationSlot<T, F> {
    fetch: F,
    slot: Mutex<Option<(RecordId, T)>>,
}

impl<T, E, F> RelationSlot<T, F>
where
    T: Clone,
    F: Fn(RecordId) -> Result<Option<T>, E>,
{
    /// Creates an empty slot around `fetch`.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            slot: Mutex::new(None),
        }
    }

    /// Resolves the related record for `id`.
    ///
    /// - `None` resolves to `None` without fetching.
    /// - A hit on the cached id returns the cached value without fetching.
    /// - Any other id is fetched; a found record replaces the slot.
    pub fn resolve_one(&self, id: Option<RecordId>) -> Result<Option<T>, E> {
        let Some(id) = id else {
            return Ok(None);
        };

        if let Some((cached_id, cached)) = self.lock().as_ref() {
            if *cached_id == id {
                return Ok(Some(cached.clone()));
            }
        }

        let fetched = (self.fetch)(id)?;
        if let Some(record) = &fetched {
            *self.lock() = Some((id, record.clone()));
        }
        Ok(fetched)
    }

    /// Id of the record currently held by the slot.
    pub fn cached_id(&self) -> Option<RecordId> {
        self.lock().as_ref().map(|(id, _)| *id)
    }

    /// Empties the slot so the next resolve fetches again.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<(RecordId, T)>> {
        // The slot holds plain data; a panic elsewhere cannot leave it torn.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pass-through for 1:N relations; every call queries again.
pub struct RelationListFetcher<T, F> {
    fetch: F,
    _record: PhantomData<fn() -> T>,
}

impl<T, E, F> RelationListFetcher<T, F>
where
    F: Fn(RecordId) -> Result<Vec<T>, E>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            _record: PhantomData,
        }
    }

    /// Returns all children of `parent_id`, empty when there are none.
    pub fn resolve_many(&self, parent_id: RecordId) -> Result<Vec<T>, E> {
        (self.fetch)(parent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{RelationListFetcher, RelationSlot};
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[test]
    fn resolve_one_caches_last_fetched_id() {
        let id_a = Uuid::now_v7();
        let id_b = Uuid::now_v7();
        let rows = HashMap::from([(id_a, "a"), (id_b, "b")]);
        let calls = Cell::new(0);
        let slot = RelationSlot::new(|id| {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(rows.get(&id).copied())
        });

        assert_eq!(slot.resolve_one(Some(id_a)), Ok(Some("a")));
        assert_eq!(slot.resolve_one(Some(id_a)), Ok(Some("a")));
        assert_eq!(calls.get(), 1);

        assert_eq!(slot.resolve_one(Some(id_b)), Ok(Some("b")));
        assert_eq!(calls.get(), 2);
        assert_eq!(slot.cached_id(), Some(id_b));

        assert_eq!(slot.resolve_one(None), Ok(None));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn missing_record_does_not_populate_slot() {
        let calls = Cell::new(0);
        let slot = RelationSlot::new(|_| {
            calls.set(calls.get() + 1);
            Ok::<Option<&str>, ()>(None)
        });
        let id = Uuid::now_v7();

        assert_eq!(slot.resolve_one(Some(id)), Ok(None));
        assert_eq!(slot.resolve_one(Some(id)), Ok(None));
        assert_eq!(calls.get(), 2);
        assert_eq!(slot.cached_id(), None);
    }

    #[test]
    fn fetch_errors_propagate_unchanged() {
        let slot = RelationSlot::new(|_| Err::<Option<&str>, _>("connection lost"));
        assert_eq!(slot.resolve_one(Some(Uuid::now_v7())), Err("connection lost"));
        assert_eq!(slot.cached_id(), None);
    }

    #[test]
    fn clear_forces_refetch() {
        let calls = Cell::new(0);
        let slot = RelationSlot::new(|_| {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(Some(1))
        });
        let id = Uuid::now_v7();

        slot.resolve_one(Some(id)).unwrap();
        slot.clear();
        slot.resolve_one(Some(id)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn concurrent_resolvers_see_whole_values() {
        let fetches = AtomicUsize::new(0);
        let slot = RelationSlot::new(|id: Uuid| {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(Some(id.to_string()))
        });
        let ids: Vec<_> = (0..4).map(|_| Uuid::now_v7()).collect();

        std::thread::scope(|scope| {
            for id in &ids {
                let slot = &slot;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let value = slot.resolve_one(Some(*id)).unwrap().unwrap();
                        assert_eq!(value, id.to_string());
                    }
                });
            }
        });

        assert!(fetches.load(Ordering::SeqCst) >= ids.len());
    }

    #[test]
    fn resolve_many_queries_every_time() {
        let calls = Cell::new(0);
        let fetcher = RelationListFetcher::new(|_| {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(vec![calls.get(); calls.get()])
        });
        let parent = Uuid::now_v7();

        assert_eq!(fetcher.resolve_many(parent), Ok(vec![1]));
        assert_eq!(fetcher.resolve_many(parent), Ok(vec![2, 2]));
        assert_eq!(calls.get(), 2);
    }
}
