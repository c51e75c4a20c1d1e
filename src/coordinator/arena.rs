//! Generational arena that owns every live coordinator node.
//!
//! Handles are `(index, generation)` pairs. Freed slots go back to a pool
//! for O(1) reuse, and the generation is bumped so a stale handle can never
//! alias whatever moves into the slot next.

use std::fmt;

/// Stable handle to a coordinator owned by a [`Navigator`](super::Navigator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordinatorId {
    index: u32,
    generation: u32,
}

impl fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}g{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> CoordinatorId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return CoordinatorId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        CoordinatorId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, id: CoordinatorId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, id: CoordinatorId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: CoordinatorId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn contains(&self, id: CoordinatorId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Handles of every live value, in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = CoordinatorId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|_| CoordinatorId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }
}
