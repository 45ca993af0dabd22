//! Fixed-capacity ring storage of transitions.
use crate::{error::ReplayError, Transition};
use rand::Rng;

/// Ring buffer over slot indices `0..capacity`.
///
/// Slots are written at an internal cursor which advances modulo `capacity`,
/// so once the store is full the oldest transition is overwritten first.
#[derive(Debug, Clone)]
pub struct TransitionStore<S, A> {
    capacity: usize,

    /// Next slot to be written.
    i: usize,

    slots: Vec<Transition<S, A>>,
}

impl<S, A> TransitionStore<S, A> {
    /// Creates an empty store.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity of a transition store must be positive");
        Self {
            capacity,
            i: 0,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a transition at the cursor and returns the slot it was written to.
    pub fn add(&mut self, tr: Transition<S, A>) -> usize {
        let ix = self.i;
        if self.slots.len() < self.capacity {
            self.slots.push(tr);
        } else {
            self.slots[ix] = tr;
        }
        self.i = (ix + 1) % self.capacity;
        ix
    }

    /// Number of occupied slots, saturating at the capacity.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The slot the next transition will be written to.
    pub fn cursor(&self) -> usize {
        self.i
    }

    /// Returns the transition in slot `ix`, if populated.
    pub fn get(&self, ix: usize) -> Option<&Transition<S, A>> {
        self.slots.get(ix)
    }

    /// Iterates over the populated slots in slot order.
    pub fn iter_slots(&self) -> impl Iterator<Item = &Transition<S, A>> {
        self.slots.iter()
    }

    /// Draws `batch_size` slot indices uniformly at random with replacement.
    pub fn sample_uniform<R>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<usize>, ReplayError>
    where
        R: Rng + ?Sized,
    {
        let len = self.len();
        if len < batch_size || len == 0 {
            return Err(ReplayError::InsufficientData {
                requested: batch_size,
                available: len,
            });
        }
        Ok((0..batch_size).map(|_| rng.gen_range(0..len)).collect())
    }
}

impl<S: Clone, A: Clone> TransitionStore<S, A> {
    /// Clones the transitions at the given slots.
    ///
    /// All indices must refer to populated slots.
    pub fn gather(&self, ixs: &[usize]) -> Vec<Transition<S, A>> {
        ixs.iter().map(|&ix| self.slots[ix].clone()).collect()
    }
}
