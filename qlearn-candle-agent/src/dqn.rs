//! DQN agent.
//!
//! [`Dqn`] covers four variants selected by [`DqnVariant`]: the standard
//! target, the double-estimator target, and both of them with prioritized
//! experience replay.
mod base;
mod config;
mod explorer;
mod model;
pub use base::Dqn;
pub use config::{DqnConfig, DqnVariant};
pub use explorer::EpsilonGreedy;
pub use model::{DqnModel, DqnModelConfig};
