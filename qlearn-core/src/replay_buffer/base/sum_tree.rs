//! Sum tree for prioritized sampling.
//!
//! The tree is an array-backed binary heap with `n_leaves` leaves, the next
//! power of two not smaller than the capacity. Leaf `n_leaves - 1 + ix` holds
//! the priority of slot `ix` and every internal node the sum of its two
//! children, so the root is the total priority.
use super::super::weight::{importance_weights, max_weight, normalize_weights};
use crate::error::ReplayError;
use rand::Rng;
use segment_tree::{ops::MinIgnoreNaN, SegmentPoint};
use serde::{Deserialize, Serialize};

/// Priority assigned to the first transition, before any priority is known.
const INITIAL_MAX_PRIORITY: f32 = 1.0;

/// How importance weights of a batch are normalized.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum WeightNormalizer {
    /// Divide by the largest weight in the batch.
    Batch,

    /// Divide by the largest weight any stored transition could get,
    /// i.e. the weight of the transition with the smallest priority.
    All,
}

/// Array-backed sum tree over the slots of a replay buffer.
#[derive(Debug)]
pub struct SumTree {
    eps: f32,
    alpha: f32,
    capacity: usize,
    n_leaves: usize,

    /// Number of populated slots.
    n_samples: usize,

    tree: Vec<f32>,

    /// The largest priority ever set; new transitions start with it.
    max_p: f32,

    min_tree: SegmentPoint<f32, MinIgnoreNaN>,
    normalize: WeightNormalizer,
}

impl SumTree {
    /// Creates a sum tree for `capacity` slots.
    ///
    /// Priorities set by [`SumTree::update`] are `|td_err|^alpha + eps`.
    pub fn new(capacity: usize, alpha: f32, eps: f32, normalize: WeightNormalizer) -> Self {
        assert!(capacity > 0, "Capacity of a sum tree must be positive");
        let n_leaves = capacity.next_power_of_two();
        Self {
            eps,
            alpha,
            capacity,
            n_leaves,
            n_samples: 0,
            tree: vec![0f32; 2 * n_leaves - 1],
            max_p: INITIAL_MAX_PRIORITY,
            min_tree: SegmentPoint::build(vec![f32::MAX; capacity], MinIgnoreNaN),
            normalize,
        }
    }

    #[inline]
    fn leaf(&self, ix: usize) -> usize {
        ix + self.n_leaves - 1
    }

    /// Writes a leaf and recomputes the sums on the path to the root.
    fn set(&mut self, ix: usize, p: f32) {
        debug_assert!(ix < self.capacity);
        debug_assert!(p >= 0.0);
        self.min_tree.modify(ix, p);
        self.max_p = self.max_p.max(p);

        let mut node = self.leaf(ix);
        self.tree[node] = p;
        while node > 0 {
            node = (node - 1) / 2;
            let left = 2 * node + 1;
            self.tree[node] = self.tree[left] + self.tree[left + 1];
        }
    }

    /// Returns the leaf index whose cumulative-priority range contains `s`.
    fn retrieve(&self, s: f32) -> usize {
        let mut node = 0;
        let mut s = s;
        while node < self.n_leaves - 1 {
            let left = 2 * node + 1;
            let right = left + 1;
            // An empty right subtree absorbs rounding at the upper end of the range.
            if s < self.tree[left] || self.tree[right] == 0f32 {
                node = left;
            } else {
                s -= self.tree[left];
                node = right;
            }
        }
        node + 1 - self.n_leaves
    }

    /// Sum of all priorities.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// The largest priority ever set.
    pub fn max(&self) -> f32 {
        self.max_p
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.n_samples
    }

    /// Returns `true` if no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Priority of slot `ix`, if populated.
    pub fn priority(&self, ix: usize) -> Option<f32> {
        if ix < self.n_samples {
            Some(self.tree[self.leaf(ix)])
        } else {
            None
        }
    }

    /// Sets the priority of a newly written slot.
    ///
    /// Without an explicit priority the slot gets the maximum priority seen so far,
    /// so it is sampled at least once before its TD error is known.
    pub fn insert(&mut self, ix: usize, priority: Option<f32>) -> Result<(), ReplayError> {
        if ix >= self.capacity {
            return Err(ReplayError::IndexOutOfRange {
                ix,
                len: self.capacity,
            });
        }
        let p = priority.unwrap_or(self.max_p);
        self.set(ix, p);
        if ix >= self.n_samples {
            self.n_samples = ix + 1;
        }
        Ok(())
    }

    /// Sets the priority of slot `ix` to `|td_err|^alpha + eps`.
    pub fn update(&mut self, ix: usize, td_err: f32) -> Result<(), ReplayError> {
        self.check_index(ix)?;
        let p = td_err.abs().powf(self.alpha) + self.eps;
        self.set(ix, p);
        Ok(())
    }

    /// Fails if slot `ix` was never populated.
    pub fn check_index(&self, ix: usize) -> Result<(), ReplayError> {
        if ix < self.n_samples {
            Ok(())
        } else {
            Err(ReplayError::IndexOutOfRange {
                ix,
                len: self.n_samples,
            })
        }
    }

    /// Get the slot whose cumulative-priority range contains `s`.
    pub fn get(&self, s: f32) -> usize {
        self.retrieve(s)
    }

    /// Samples `batch_size` slots with stratification.
    ///
    /// `[0, total)` is split into `batch_size` segments of equal width and one
    /// value is drawn uniformly from each. Returns the slots and their sampling
    /// probabilities `p_i / total`.
    pub fn sample<R>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<(Vec<usize>, Vec<f32>), ReplayError>
    where
        R: Rng + ?Sized,
    {
        if self.n_samples < batch_size || self.n_samples == 0 {
            return Err(ReplayError::InsufficientData {
                requested: batch_size,
                available: self.n_samples,
            });
        }

        let p_sum = self.total();
        let segment = p_sum / batch_size as f32;
        let ixs = (0..batch_size)
            .map(|i| {
                let s = segment * (i as f32 + rng.gen::<f32>());
                self.retrieve(s.min(p_sum))
            })
            .collect::<Vec<_>>();
        let probs = ixs
            .iter()
            .map(|&ix| self.tree[self.leaf(ix)] / p_sum)
            .collect();

        Ok((ixs, probs))
    }

    /// Normalized importance-sampling weights of a sampled batch.
    pub fn weights(&self, ixs: &[usize], probs: &[f32], beta: f32) -> Result<Vec<f32>, ReplayError> {
        let ws = importance_weights(probs, self.n_samples, beta);
        if ws.is_empty() {
            return Ok(ws);
        }
        let w_max = match self.normalize {
            WeightNormalizer::Batch => max_weight(&ws),
            WeightNormalizer::All => {
                let p_min = self.min_tree.query(0, self.n_samples) / self.total();
                importance_weights(&[p_min], self.n_samples, beta)[0]
            }
        };
        normalize_weights(ws, w_max, ixs)
    }
}
