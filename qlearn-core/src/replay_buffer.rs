//! Replay buffer with uniform and prioritized sampling.
//!
//! [`ReplayBuffer`] stores transitions in a ring of fixed capacity. When it is
//! built with a [`PerConfig`], every slot also gets a leaf in a sum tree and
//! batches are drawn in proportion to the stored priorities, together with
//! normalized importance-sampling weights.
//!
//! ```rust
//! use qlearn_core::{
//!     replay_buffer::{PerConfig, ReplayBuffer, ReplayBufferConfig},
//!     Transition,
//! };
//!
//! let config = ReplayBufferConfig::default()
//!     .capacity(4)
//!     .seed(42)
//!     .per_config(Some(PerConfig::default().alpha(0.6)));
//! let mut buffer = ReplayBuffer::<Vec<f32>, usize>::build(&config);
//!
//! for i in 0..3 {
//!     buffer.push(Transition::new(vec![i as f32], 0, 1.0, vec![i as f32 + 1.0], false)).unwrap();
//! }
//! let batch = buffer.batch(2, 0.4).unwrap();
//! assert_eq!(batch.len(), 2);
//! ```
mod base;
mod batch;
mod config;
mod store;
mod weight;
pub use base::{ReplayBuffer, SumTree, WeightNormalizer};
pub use batch::TransitionBatch;
pub use config::{PerConfig, ReplayBufferConfig};
pub use store::TransitionStore;
pub use weight::{importance_weights, normalize_weights};
