//! Importance-sampling weights for prioritized replay.
use crate::error::ReplayError;

/// Returns unnormalized importance-sampling weights `w_i = (N * p_i)^(-beta)`.
///
/// * `probs` - Sampling probabilities of the batch.
/// * `n` - Number of transitions in the buffer.
/// * `beta` - Strength of the bias correction, in `[0, 1]`.
pub fn importance_weights(probs: &[f32], n: usize, beta: f32) -> Vec<f32> {
    let n = n as f32;
    probs.iter().map(|&p| (n * p).powf(-beta)).collect()
}

/// Divides the weights by `w_max`.
///
/// With `w_max = max_j w_j` the largest weight of the batch becomes exactly 1.
/// Fails with [`ReplayError::DegenerateWeight`] if `w_max` is zero, negative
/// or not finite.
pub fn normalize_weights(
    ws: Vec<f32>,
    w_max: f32,
    ixs: &[usize],
) -> Result<Vec<f32>, ReplayError> {
    if !(w_max.is_finite() && w_max > 0.0) || ws.iter().any(|w| !w.is_finite()) {
        return Err(ReplayError::DegenerateWeight { ixs: ixs.to_vec() });
    }
    Ok(ws.into_iter().map(|w| w / w_max).collect())
}

/// Maximum of the weights, `NaN` for an empty slice.
pub(crate) fn max_weight(ws: &[f32]) -> f32 {
    ws.iter().fold(f32::NAN, |m, &w| w.max(m))
}
