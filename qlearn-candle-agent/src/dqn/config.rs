//! Configuration of DQN agent.
use super::DqnModelConfig;
use crate::{util::OutDim, Device};
use anyhow::Result;
use log::info;
use qlearn_core::replay_buffer::{PerConfig, ReplayBufferConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Variants of the DQN agent.
///
/// Each variant is a combination of two choices: whether the next-state action
/// is selected by the online network (double estimator) and whether the replay
/// buffer is prioritized.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum DqnVariant {
    /// Next-state action and value from the target network.
    Dqn,

    /// Next-state action from the online network, value from the target network.
    DoubleDqn,

    /// [`DqnVariant::Dqn`] with prioritized experience replay.
    DqnPer,

    /// [`DqnVariant::DoubleDqn`] with prioritized experience replay.
    DoubleDqnPer,
}

impl Default for DqnVariant {
    fn default() -> Self {
        Self::Dqn
    }
}

impl DqnVariant {
    /// Constructs the variant from its two choices.
    pub fn new(double_dqn: bool, prioritized: bool) -> Self {
        match (double_dqn, prioritized) {
            (false, false) => Self::Dqn,
            (true, false) => Self::DoubleDqn,
            (false, true) => Self::DqnPer,
            (true, true) => Self::DoubleDqnPer,
        }
    }

    /// Returns `true` if the next-state action is selected by the online network.
    pub fn is_double(&self) -> bool {
        matches!(self, Self::DoubleDqn | Self::DoubleDqnPer)
    }

    /// Returns `true` if the replay buffer is prioritized.
    pub fn is_prioritized(&self) -> bool {
        matches!(self, Self::DqnPer | Self::DoubleDqnPer)
    }
}

/// Constructs [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig<Q>
where
    Q: OutDim,
{
    pub(super) model_config: DqnModelConfig<Q>,
    pub(super) replay_buffer_config: ReplayBufferConfig,
    #[serde(default)]
    pub(super) variant: DqnVariant,
    pub(super) batch_size: usize,
    pub(super) update_every: usize,
    pub(super) discount_factor: f64,
    pub(super) tau: f64,
    pub(super) seed: u64,
    #[serde(default)]
    pub device: Device,
}

impl<Q> Default for DqnConfig<Q>
where
    Q: OutDim,
{
    /// Constructs DQN config with default parameters.
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            replay_buffer_config: Default::default(),
            variant: DqnVariant::Dqn,
            batch_size: 64,
            update_every: 4,
            discount_factor: 0.99,
            tau: 1e-3,
            seed: 42,
            device: Device::Cpu,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: DqnModelConfig<Q>) -> Self {
        self.model_config = model_config;
        self
    }

    /// Sets the configuration of the replay buffer.
    pub fn replay_buffer_config(mut self, v: ReplayBufferConfig) -> Self {
        self.replay_buffer_config = v;
        self
    }

    /// Sets the variant of the agent.
    pub fn variant(mut self, v: DqnVariant) -> Self {
        self.variant = v;
        self
    }

    /// Returns the variant of the agent.
    pub fn get_variant(&self) -> DqnVariant {
        self.variant
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Number of environment steps between learning updates.
    pub fn update_every(mut self, v: usize) -> Self {
        self.update_every = v;
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Soft update coefficient.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Seed of the explorer.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Returns the replay buffer configuration matching the variant.
    ///
    /// Prioritized variants get the default [`PerConfig`] if none is set; the
    /// others never get one.
    pub fn effective_replay_buffer_config(&self) -> ReplayBufferConfig {
        let mut config = self.replay_buffer_config.clone();
        if self.variant.is_prioritized() {
            if config.per_config.is_none() {
                config.per_config = Some(PerConfig::default());
            }
        } else {
            config.per_config = None;
        }
        config
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {:?}", path_);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::MlpConfig, opt::OptimizerConfig};
    use tempdir::TempDir;

    #[test]
    fn test_variant_choices() {
        assert_eq!(DqnVariant::new(false, false), DqnVariant::Dqn);
        assert_eq!(DqnVariant::new(true, true), DqnVariant::DoubleDqnPer);
        assert!(DqnVariant::DoubleDqn.is_double());
        assert!(!DqnVariant::DoubleDqn.is_prioritized());
        assert!(DqnVariant::DqnPer.is_prioritized());
        assert!(!DqnVariant::DqnPer.is_double());
    }

    #[test]
    fn test_effective_replay_buffer_config() {
        let config = DqnConfig::<MlpConfig>::default().variant(DqnVariant::DqnPer);
        assert_eq!(
            config.effective_replay_buffer_config().per_config,
            Some(PerConfig::default())
        );

        let config = DqnConfig::<MlpConfig>::default()
            .replay_buffer_config(
                ReplayBufferConfig::default().per_config(Some(PerConfig::default().alpha(0.3))),
            )
            .variant(DqnVariant::Dqn);
        assert_eq!(config.effective_replay_buffer_config().per_config, None);
    }

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let model_config = DqnModelConfig::default()
            .q_config(MlpConfig::new(4, vec![16, 16], 2, false))
            .opt_config(OptimizerConfig::Adam { lr: 1e-3 });
        let config = DqnConfig::default()
            .model_config(model_config)
            .variant(DqnVariant::DoubleDqnPer)
            .batch_size(32)
            .update_every(2)
            .discount_factor(0.9)
            .tau(0.01);

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::<MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
