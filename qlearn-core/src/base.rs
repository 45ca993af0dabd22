//! Core functionalities.
mod agent;
mod env;
mod transition;
pub use agent::Agent;
pub use env::{Env, Step};
pub use transition::Transition;
