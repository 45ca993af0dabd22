//! Optimizers.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::Optimizer as _;
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of the optimizer updating the action-value network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

impl OptimizerConfig {
    /// Constructs the optimizer over the given variables.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::Adam { lr } => {
                let params = ParamsAdam {
                    lr: *lr,
                    ..ParamsAdam::default()
                };
                Ok(Optimizer::Adam(Adam::new(vars, params)?))
            }
        }
    }

    /// Override learning rate.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::Adam { .. } => Self::Adam { lr },
        }
    }
}

impl Default for OptimizerConfig {
    /// Adam with learning rate `5e-4`.
    fn default() -> Self {
        Self::Adam { lr: 5e-4 }
    }
}

/// Thin wrapper of the optimizers of `candle-optimisers`.
pub enum Optimizer {
    /// Adam optimizer.
    Adam(Adam),
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => Ok(opt.backward_step(loss)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_rate_override() {
        let config = OptimizerConfig::default();
        assert_eq!(config, OptimizerConfig::Adam { lr: 5e-4 });
        assert_eq!(config.learning_rate(1e-3), OptimizerConfig::Adam { lr: 1e-3 });
    }

    #[test]
    fn test_adam_reduces_loss() -> Result<()> {
        let x = Var::new(&[2f32], &candle_core::Device::Cpu)?;
        let mut opt = OptimizerConfig::Adam { lr: 0.1 }.build(vec![x.clone()])?;
        let before = x.as_tensor().sqr()?.sum_all()?.to_scalar::<f32>()?;
        for _ in 0..10 {
            let loss = x.as_tensor().sqr()?.sum_all()?;
            opt.backward_step(&loss)?;
        }
        let after = x.as_tensor().sqr()?.sum_all()?.to_scalar::<f32>()?;
        assert!(after < before);
        Ok(())
    }
}
