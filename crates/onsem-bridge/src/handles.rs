//! Handle allocation and owning registries
//!
//! Native objects never cross the boundary. Each one is owned by a
//! [`Registry`] and the host only ever sees its [`Handle`].

use std::collections::BTreeSet;

use onsem_sdk::{BridgeError, BridgeResult, Handle};

/// Smallest positive handle not in `existing`.
///
/// Keys below 1 are ignored. `allocate(&{1, 3}) == 2`,
/// `allocate(&{1, 2, 3}) == 4`.
pub fn allocate(existing: &BTreeSet<Handle>) -> Handle {
    first_gap(existing.iter().copied())
}

/// First gap in an ascending sequence of handles, starting after 0
fn first_gap(ascending: impl IntoIterator<Item = Handle>) -> Handle {
    let mut candidate = 1;
    for handle in ascending {
        if handle < candidate {
            continue;
        }
        if handle > candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Owning registry mapping handles to native objects.
///
/// Slots are indexed by `handle - 1`; released handles go to an ordered
/// free set so the next insertion fills the lowest gap.
pub struct Registry<T> {
    name: &'static str,
    slots: Vec<Option<T>>,
    free: BTreeSet<Handle>,
    live: usize,
}

impl<T> Registry<T> {
    /// Create an empty registry; `name` appears in errors and logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Vec::new(),
            free: BTreeSet::new(),
            live: 0,
        }
    }

    /// Registry name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take ownership of `value` and return its new handle
    pub fn insert(&mut self, value: T) -> Handle {
        let handle = match self.free.pop_first() {
            Some(handle) => handle,
            None => self.slots.len() as Handle + 1,
        };
        debug_assert_eq!(handle, first_gap(self.handles()));

        let index = (handle - 1) as usize;
        if index == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[index] = Some(value);
        }
        self.live += 1;
        tracing::debug!(registry = self.name, handle, "handle created");
        handle
    }

    /// Insert a value the engine may have failed to produce
    pub fn insert_present(&mut self, value: Option<T>, what: &str) -> BridgeResult<Handle> {
        match value {
            Some(value) => Ok(self.insert(value)),
            None => Err(BridgeError::EmptyObject(what.to_string())),
        }
    }

    /// Borrow the object behind `handle`
    pub fn get(&self, handle: Handle) -> BridgeResult<&T> {
        self.slot(handle)
            .and_then(|i| self.slots[i].as_ref())
            .ok_or_else(|| self.not_found(handle))
    }

    /// Mutably borrow the object behind `handle`
    pub fn get_mut(&mut self, handle: Handle) -> BridgeResult<&mut T> {
        let err = self.not_found(handle);
        match self.slot(handle) {
            Some(i) => self.slots[i].as_mut().ok_or(err),
            None => Err(err),
        }
    }

    /// Mutably borrow `main` while sharing `other`.
    ///
    /// `other` resolves to `None` when it is absent or not live. Fails when
    /// both handles are the same.
    pub fn get_mut_with(&mut self, main: Handle, other: Option<Handle>) -> BridgeResult<(&mut T, Option<&T>)> {
        if other == Some(main) {
            return Err(BridgeError::InvalidArgument(format!(
                "{} {} cannot be linked to itself",
                self.name, main
            )));
        }
        let main_index = self.slot(main).filter(|&i| self.slots[i].is_some());
        let Some(i) = main_index else {
            return Err(self.not_found(main));
        };
        let not_found = self.not_found(main);
        let (main_slot, other_slot) = match other.and_then(|h| self.slot(h)) {
            Some(j) if i < j => {
                let (low, high) = self.slots.split_at_mut(j);
                (&mut low[i], Some(&high[0]))
            }
            Some(j) => {
                let (low, high) = self.slots.split_at_mut(i);
                (&mut high[0], Some(&low[j]))
            }
            None => (&mut self.slots[i], None),
        };
        let main_value = main_slot.as_mut().ok_or(not_found)?;
        Ok((main_value, other_slot.and_then(Option::as_ref)))
    }

    /// Whether `handle` is live
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    /// Remove and return the object behind `handle`
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let index = self.slot(handle)?;
        let value = self.slots[index].take()?;
        self.free.insert(handle);
        self.live -= 1;
        while let Some(None) = self.slots.last() {
            self.slots.pop();
            self.free.remove(&(self.slots.len() as Handle + 1));
        }
        tracing::debug!(registry = self.name, handle, "handle deleted");
        Some(value)
    }

    /// Drop the object behind `handle`; absent handles are ignored
    pub fn erase(&mut self, handle: Handle) {
        self.remove(handle);
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no object is live
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live handles in ascending order
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i as Handle + 1)
    }

    /// Live objects with their handles, in ascending handle order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|value| (i as Handle + 1, value)))
    }

    fn slot(&self, handle: Handle) -> Option<usize> {
        let index = usize::try_from(handle).ok()?.checked_sub(1)?;
        (index < self.slots.len()).then_some(index)
    }

    fn not_found(&self, handle: Handle) -> BridgeError {
        BridgeError::NotFound {
            registry: self.name,
            handle,
        }
    }
}
