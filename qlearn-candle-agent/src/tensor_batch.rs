use anyhow::{bail, Result};
use candle_core::{Device, Tensor};

/// Observations that can be stacked into a batch tensor.
///
/// The first dimension of the resulting tensor is the batch dimension.
pub trait ObsTensor: Clone {
    /// Stacks observations into a tensor of shape `(n, ...)`.
    fn to_tensor(obs: &[Self], device: &Device) -> Result<Tensor>;
}

impl ObsTensor for Vec<f32> {
    fn to_tensor(obs: &[Self], device: &Device) -> Result<Tensor> {
        let n = obs.len();
        let dim = obs.first().map_or(0, |o| o.len());
        if obs.iter().any(|o| o.len() != dim) {
            bail!("Observations of different lengths cannot be stacked");
        }
        let data = obs.iter().flatten().copied().collect::<Vec<_>>();
        Ok(Tensor::from_vec(data, (n, dim), device)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_vec_obs() -> Result<()> {
        let obs = vec![vec![1f32, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let t = Vec::<f32>::to_tensor(&obs, &Device::Cpu)?;
        assert_eq!(t.dims(), &[3, 2]);
        assert_eq!(t.to_vec2::<f32>()?, obs);

        let ragged = vec![vec![1f32, 2.0], vec![3.0]];
        assert!(Vec::<f32>::to_tensor(&ragged, &Device::Cpu).is_err());
        Ok(())
    }
}
