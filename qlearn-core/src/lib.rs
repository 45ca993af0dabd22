#![warn(missing_docs)]
//! Experience replay and the training loop of off-policy value learning.
pub mod error;
pub mod replay_buffer;

mod base;
pub use base::{Agent, Env, Step, Transition};

mod trainer;
pub use trainer::{
    EpsilonConfig, EpsilonSchedule, IwScheduler, Trainer, TrainerConfig, TrainingSummary,
};
