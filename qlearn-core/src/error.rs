//! Errors in the library.
use thiserror::Error;

/// Errors raised by the replay buffer and its priority index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// A batch was requested before the buffer holds enough transitions.
    ///
    /// This is expected during warm-up; agents skip the learning step.
    #[error("Insufficient data: requested {requested} transitions, {available} available")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,

        /// Number of transitions in the buffer.
        available: usize,
    },

    /// A priority update referred to a slot that was never populated.
    #[error("Slot index {ix} is out of range, {len} slots are populated")]
    IndexOutOfRange {
        /// The offending slot index.
        ix: usize,

        /// Number of populated slots.
        len: usize,
    },

    /// The numbers of slot indices and TD errors in a priority update differ.
    #[error("Priority update with {n_ixs} slot indices and {n_td_errs} TD errors")]
    LengthMismatch {
        /// Number of slot indices.
        n_ixs: usize,

        /// Number of TD errors.
        n_td_errs: usize,
    },

    /// Importance weights of a batch cannot be normalized.
    #[error("Degenerate importance weights in the batch sampled from slots {ixs:?}")]
    DegenerateWeight {
        /// Slot indices of the batch.
        ixs: Vec<usize>,
    },
}
