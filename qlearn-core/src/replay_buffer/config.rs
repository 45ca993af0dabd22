//! Configuration of [`ReplayBuffer`](super::ReplayBuffer).
use super::WeightNormalizer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of prioritized experience replay.
///
/// A priority is computed from a TD error as `|td_err|^alpha + eps`.
///
/// ```rust
/// use qlearn_core::replay_buffer::{PerConfig, WeightNormalizer};
///
/// let config = PerConfig::default()
///     .alpha(0.6)
///     .eps(1e-6)
///     .normalize(WeightNormalizer::Batch);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerConfig {
    /// Exponent for prioritization. A value of 0 results in uniform sampling.
    pub alpha: f32,

    /// Offset added to every priority so that no transition becomes
    /// permanently unsamplable. Must be positive.
    pub eps: f32,

    /// Method for normalizing importance sampling weights.
    #[serde(default = "default_normalize")]
    pub normalize: WeightNormalizer,
}

fn default_normalize() -> WeightNormalizer {
    WeightNormalizer::Batch
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            eps: 1e-8,
            normalize: default_normalize(),
        }
    }
}

impl PerConfig {
    /// Sets the prioritization exponent `alpha`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the priority offset `eps`.
    pub fn eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the method for normalizing importance weights.
    pub fn normalize(mut self, normalize: WeightNormalizer) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Configuration of the replay buffer.
///
/// ```rust
/// use qlearn_core::replay_buffer::{PerConfig, ReplayBufferConfig};
///
/// let config = ReplayBufferConfig::default()
///     .capacity(10000)
///     .seed(42)
///     .per_config(Some(PerConfig::default()));
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions. The oldest transition is overwritten
    /// when a new one is pushed into a full buffer.
    pub capacity: usize,

    /// Random seed used for sampling.
    pub seed: u64,

    /// Configuration of prioritized experience replay. If `None`,
    /// transitions are sampled uniformly at random.
    pub per_config: Option<PerConfig>,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            per_config: None,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the configuration for prioritized experience replay.
    pub fn per_config(mut self, per_config: Option<PerConfig>) -> Self {
        self.per_config = per_config;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
