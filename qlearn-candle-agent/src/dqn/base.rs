//! DQN agent implemented with candle.
use super::{
    config::{DqnConfig, DqnVariant},
    explorer::EpsilonGreedy,
    model::DqnModel,
};
use crate::{model::SubModel1, util::track, util::OutDim, ObsTensor};
use anyhow::{bail, Context, Result};
use candle_core::{shape::D, Device, Tensor};
use log::{debug, info};
use qlearn_core::{error::ReplayError, replay_buffer::ReplayBuffer, Agent, Transition};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, fs, path::Path};

/// Values of the next states used for bootstrapping.
///
/// The action is selected by `q_select` (the online network for the double
/// estimator) or by `q_tgt` itself, and its value is always read from `q_tgt`.
fn next_state_value(q_tgt: &Tensor, q_select: Option<&Tensor>) -> Result<Tensor> {
    let selector = q_select.unwrap_or(q_tgt);
    let a = selector.argmax_keepdim(D::Minus1)?;
    Ok(q_tgt.gather(&a, D::Minus1)?.squeeze(D::Minus1)?)
}

/// `reward + gamma * next_value * is_not_done`.
fn td_target(
    reward: &Tensor,
    is_not_done: &Tensor,
    gamma: f64,
    next_value: &Tensor,
) -> Result<Tensor> {
    let bootstrap = is_not_done.mul(next_value)?.affine(gamma, 0.0)?;
    Ok(reward.add(&bootstrap)?)
}

/// Mean of squared TD errors, each scaled by its importance weight.
fn weighted_mse(td_err: &Tensor, weight: &Tensor) -> Result<Tensor> {
    Ok(td_err.sqr()?.mul(weight)?.mean_all()?)
}

#[allow(clippy::upper_case_acronyms)]
/// DQN agent implemented with candle.
///
/// The agent owns the online network, the target network and the replay
/// buffer. See [`DqnVariant`] for the supported target computations.
pub struct Dqn<Q, S>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    S: ObsTensor,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    buffer: ReplayBuffer<S, usize>,
    explorer: EpsilonGreedy,
    variant: DqnVariant,
    batch_size: usize,
    update_every: usize,
    discount_factor: f64,
    tau: f64,
    beta: f32,
    n_steps: usize,
    n_learns: usize,
    device: Device,
}

impl<Q, S> Dqn<Q, S>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    S: ObsTensor,
{
    /// Constructs DQN agent.
    ///
    /// The target network starts as a copy of the online network.
    pub fn build(config: DqnConfig<Q::Config>) -> Result<Self> {
        if !(config.tau > 0.0 && config.tau <= 1.0) {
            bail!("tau must be in (0, 1], got {}", config.tau);
        }
        if config.update_every == 0 {
            bail!("update_every must be positive");
        }
        if config.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if config.replay_buffer_config.capacity == 0 {
            bail!("Capacity of the replay buffer must be positive");
        }

        let device = Device::try_from(config.device)?;
        let qnet = DqnModel::<Q>::build(config.model_config.clone(), &device)?;
        let qnet_tgt = DqnModel::<Q>::build(config.model_config.clone(), &device)?;
        track(qnet_tgt.vars(), qnet.vars(), 1.0)?;

        let buffer = ReplayBuffer::build(&config.effective_replay_buffer_config());
        let explorer = EpsilonGreedy::new(qnet.out_dim(), config.seed);
        info!(
            "Build {:?} agent with {} actions, batch size {}, update every {} steps",
            config.variant,
            qnet.out_dim(),
            config.batch_size,
            config.update_every
        );

        Ok(Self {
            qnet,
            qnet_tgt,
            buffer,
            explorer,
            variant: config.variant,
            batch_size: config.batch_size,
            update_every: config.update_every,
            discount_factor: config.discount_factor,
            tau: config.tau,
            beta: 0.4,
            n_steps: 0,
            n_learns: 0,
            device,
        })
    }

    /// Returns the replay buffer.
    pub fn buffer(&self) -> &ReplayBuffer<S, usize> {
        &self.buffer
    }

    /// Returns the variant of the agent.
    pub fn variant(&self) -> DqnVariant {
        self.variant
    }

    /// Returns the number of ingested transitions.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Returns the number of learning updates.
    pub fn n_learns(&self) -> usize {
        self.n_learns
    }

    /// Returns the current importance-sampling exponent.
    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Returns action values of the online network, shape `(n, n_actions)`.
    pub fn action_values(&self, states: &[S]) -> Result<Tensor> {
        let obs = S::to_tensor(states, &self.device)?;
        Ok(self.qnet.forward(&obs)?.detach())
    }

    /// Returns action values of the target network, shape `(n, n_actions)`.
    pub fn target_action_values(&self, states: &[S]) -> Result<Tensor> {
        let obs = S::to_tensor(states, &self.device)?;
        Ok(self.qnet_tgt.forward(&obs)?.detach())
    }

    /// Samples a batch and applies one learning update.
    ///
    /// Returns `None` if the buffer does not hold enough transitions.
    fn learn(&mut self) -> Result<Option<f32>> {
        let batch = match self.buffer.batch(self.batch_size, self.beta) {
            Ok(batch) => batch,
            Err(ReplayError::InsufficientData { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let (obs, act, next_obs, reward, is_terminated, ixs, weight) = batch.unpack();
        let n = reward.len();
        let obs = S::to_tensor(&obs, &self.device)?;
        let next_obs = S::to_tensor(&next_obs, &self.device)?;
        let act = {
            let act = act.iter().map(|&a| a as u32).collect::<Vec<_>>();
            Tensor::from_vec(act, (n, 1), &self.device)?
        };
        let reward = Tensor::from_vec(reward, (n,), &self.device)?;
        let is_not_done = {
            let is_not_done = is_terminated
                .into_iter()
                .map(|v| (1 - v) as f32)
                .collect::<Vec<_>>();
            Tensor::from_vec(is_not_done, (n,), &self.device)?
        };

        let pred = self
            .qnet
            .forward(&obs)?
            .gather(&act, D::Minus1)?
            .squeeze(D::Minus1)?;

        let tgt = {
            let q_tgt = self.qnet_tgt.forward(&next_obs)?.detach();
            let q_select = match self.variant.is_double() {
                true => Some(self.qnet.forward(&next_obs)?.detach()),
                false => None,
            };
            let next_value = next_state_value(&q_tgt, q_select.as_ref())?;
            td_target(&reward, &is_not_done, self.discount_factor, &next_value)?
        };

        let td_err = pred.sub(&tgt)?;
        let loss = match weight {
            Some(ws) => {
                let ws = Tensor::from_vec(ws, (n,), &self.device)?;
                weighted_mse(&td_err, &ws)?
            }
            None => td_err.sqr()?.mean_all()?,
        };

        self.qnet.backward_step(&loss)?;

        if let Some(ixs) = ixs {
            let td_err = td_err.detach().to_vec1::<f32>()?;
            self.buffer.update_priority(&ixs, &td_err)?;
        }

        track(self.qnet_tgt.vars(), self.qnet.vars(), self.tau)?;
        self.n_learns += 1;

        let loss = loss.to_scalar::<f32>()?;
        debug!("learn {}: loss = {}", self.n_learns, loss);
        Ok(Some(loss))
    }
}

impl<Q, S> Agent<S> for Dqn<Q, S>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    S: ObsTensor,
{
    fn act(&mut self, state: &S, epsilon: f64) -> Result<usize> {
        let qnet = &self.qnet;
        let device = &self.device;
        self.explorer.action(epsilon, || {
            let obs = S::to_tensor(std::slice::from_ref(state), device)?;
            let a = qnet
                .forward(&obs)?
                .detach()
                .argmax(D::Minus1)?
                .to_vec1::<u32>()?;
            a.first()
                .map(|&a| a as usize)
                .context("Empty action values")
        })
    }

    fn step(
        &mut self,
        state: S,
        action: usize,
        reward: f32,
        next_state: S,
        is_terminated: bool,
    ) -> Result<Option<f32>> {
        if action >= self.qnet.out_dim() {
            bail!(
                "Action {} is out of range for {} actions",
                action,
                self.qnet.out_dim()
            );
        }
        self.buffer.push(Transition::new(
            state,
            action,
            reward,
            next_state,
            is_terminated,
        ))?;
        self.n_steps += 1;

        if self.n_steps % self.update_every == 0 && self.buffer.len() > self.batch_size {
            self.learn()
        } else {
            Ok(None)
        }
    }

    fn set_beta(&mut self, beta: f32) {
        self.beta = beta;
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors"))?;
        self.qnet_tgt.save(path.join("qnet_tgt.safetensors"))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors"))?;
        self.qnet_tgt.load(path.join("qnet_tgt.safetensors"))?;
        Ok(())
    }
}
