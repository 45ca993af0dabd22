//! Configuration of [`Trainer`](super::Trainer).
use super::EpsilonConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of training episodes.
    pub num_episodes: usize,

    /// Episodes are truncated after this many environment steps.
    pub max_steps_per_episode: usize,

    /// Exploration rate schedule.
    pub epsilon: EpsilonConfig,

    /// Initial importance-sampling exponent.
    pub beta_0: f32,

    /// Final importance-sampling exponent.
    pub beta_final: f32,

    /// Learning updates over which beta is annealed to `beta_final`.
    pub n_learns_final: usize,

    /// Interval of progress logs in episodes.
    pub report_interval: usize,

    /// Number of recent episodes averaged in progress logs.
    pub score_window: usize,

    /// Where to save the trained agent.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_steps_per_episode: usize::MAX,
            epsilon: EpsilonConfig::default(),
            beta_0: 0.4,
            beta_final: 1.0,
            n_learns_final: 500_000,
            report_interval: 100,
            score_window: 100,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn num_episodes(mut self, v: usize) -> Self {
        self.num_episodes = v;
        self
    }

    /// Sets the step limit of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the exploration rate schedule.
    pub fn epsilon(mut self, v: EpsilonConfig) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the schedule of the importance-sampling exponent.
    pub fn beta(mut self, beta_0: f32, beta_final: f32, n_learns_final: usize) -> Self {
        self.beta_0 = beta_0;
        self.beta_final = beta_final;
        self.n_learns_final = n_learns_final;
        self
    }

    /// Sets the interval of progress logs in episodes.
    pub fn report_interval(mut self, v: usize) -> Self {
        self.report_interval = v;
        self
    }

    /// Sets the directory where the trained agent is saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
