//! Identity map shared by all roster repositories.
//!
//! # Invariants
//! - At most one `Shared<T>` per primary key is registered at a time.
//! - Entries leave the map only through `evict` (on delete) or `clear`.
//! - `update`/`delete` accept only the registered handle for an id.

use crate::repo::error::{RepoError, RepoResult};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to a live record. Clones point at the same instance.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps an unsaved record into a handle suitable for `save`.
pub fn share<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Primary key to live record map owned by one repository.
#[derive(Debug)]
pub struct IdentityMap<T> {
    entity: &'static str,
    entries: HashMap<i64, Shared<T>>,
}

impl<T> IdentityMap<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: HashMap::new(),
        }
    }

    /// Returns the registered handle for `id`, if any.
    pub fn get(&self, id: i64) -> Option<Shared<T>> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every registered handle. Later lookups produce fresh
    /// instances; handles held by callers can no longer be updated or
    /// deleted through this repository.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn register(&mut self, id: i64, record: &Shared<T>) {
        self.entries.insert(id, Rc::clone(record));
    }

    /// Fails with `UntrackedInstance` unless `record` is the handle
    /// registered for `id`.
    pub(crate) fn ensure_tracked(&self, id: i64, record: &Shared<T>) -> RepoResult<()> {
        match self.entries.get(&id) {
            Some(mapped) if Rc::ptr_eq(mapped, record) => Ok(()),
            _ => Err(RepoError::UntrackedInstance {
                entity: self.entity,
                id,
            }),
        }
    }

    pub(crate) fn evict(&mut self, id: i64) -> Option<Shared<T>> {
        self.entries.remove(&id)
    }

    /// Refreshes the mapped instance for `id`, or builds and registers one.
    ///
    /// Fails with `InstanceBorrowed` when the mapped instance is borrowed.
    pub(crate) fn hydrate(
        &mut self,
        id: i64,
        refresh: impl FnOnce(&mut T),
        build: impl FnOnce() -> T,
    ) -> RepoResult<Shared<T>> {
        if let Some(existing) = self.entries.get(&id) {
            refresh(&mut *borrow_record_mut(self.entity, existing)?);
            return Ok(Rc::clone(existing));
        }

        let record = share(build());
        self.register(id, &record);
        Ok(record)
    }
}

pub(crate) fn borrow_record<'a, T>(
    entity: &'static str,
    record: &'a Shared<T>,
) -> RepoResult<Ref<'a, T>> {
    record
        .try_borrow()
        .map_err(|_| RepoError::InstanceBorrowed(entity))
}

pub(crate) fn borrow_record_mut<'a, T>(
    entity: &'static str,
    record: &'a Shared<T>,
) -> RepoResult<RefMut<'a, T>> {
    record
        .try_borrow_mut()
        .map_err(|_| RepoError::InstanceBorrowed(entity))
}
