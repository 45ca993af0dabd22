//! Train [`Agent`].
mod config;
mod epsilon;
mod iw_scheduler;
use crate::{Agent, Env};
use anyhow::Result;
pub use config::TrainerConfig;
pub use epsilon::{EpsilonConfig, EpsilonSchedule};
pub use iw_scheduler::IwScheduler;
use log::info;
use std::path::Path;

/// Scores and losses collected by [`Trainer::train`].
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    /// Sum of rewards of each episode.
    pub scores: Vec<f32>,

    /// Mean loss of each episode, `None` if no learning update happened in it.
    pub losses: Vec<Option<f32>>,

    /// Total number of learning updates.
    pub n_learns: usize,
}

impl TrainingSummary {
    /// Mean score of the last `n` episodes.
    pub fn recent_mean_score(&self, n: usize) -> f32 {
        let n = n.min(self.scores.len());
        if n == 0 {
            return 0.0;
        }
        self.scores[self.scores.len() - n..].iter().sum::<f32>() / n as f32
    }
}

/// Manages the episode loop.
///
/// Every environment step goes through the agent: the agent picks an action
/// with the current exploration rate, the environment produces the next
/// observation and reward, and [`Agent::step`] ingests the transition and
/// learns when its schedule says so. The exploration rate decays after every
/// episode; the importance-sampling exponent advances after every learning
/// update and is handed to the agent before each step.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Runs one episode. Returns the score, the summed loss and the number of
    /// learning updates.
    fn run_episode<E, A>(
        &self,
        env: &mut E,
        agent: &mut A,
        epsilon: f64,
        iw_scheduler: &mut IwScheduler,
    ) -> Result<(f32, f32, usize)>
    where
        E: Env,
        A: Agent<E::Obs>,
    {
        let mut obs = env.reset()?;
        let mut score = 0f32;
        let mut loss_sum = 0f32;
        let mut n_learns = 0;

        for _ in 0..self.config.max_steps_per_episode {
            let act = agent.act(&obs, epsilon)?;
            let step = env.step(act)?;
            agent.set_beta(iw_scheduler.beta());
            let is_done = step.is_done();
            let loss = agent.step(
                obs,
                act,
                step.reward,
                step.obs.clone(),
                step.is_terminated,
            )?;
            if let Some(loss) = loss {
                loss_sum += loss;
                n_learns += 1;
                iw_scheduler.add_n_learns();
            }
            score += step.reward;
            obs = step.obs;
            if is_done {
                break;
            }
        }

        Ok((score, loss_sum, n_learns))
    }

    /// Trains the agent on the environment.
    pub fn train<E, A>(&mut self, env: &mut E, agent: &mut A) -> Result<TrainingSummary>
    where
        E: Env,
        A: Agent<E::Obs>,
    {
        let mut epsilon = EpsilonSchedule::new(&self.config.epsilon);
        let mut iw_scheduler = IwScheduler::new(
            self.config.beta_0,
            self.config.beta_final,
            self.config.n_learns_final,
        );
        let mut summary = TrainingSummary::default();
        let report_interval = self.config.report_interval.max(1);

        for episode in 1..=self.config.num_episodes {
            let (score, loss_sum, n_learns) =
                self.run_episode(env, agent, epsilon.value(), &mut iw_scheduler)?;
            summary.scores.push(score);
            summary.losses.push(match n_learns {
                0 => None,
                n => Some(loss_sum / n as f32),
            });
            summary.n_learns += n_learns;

            if episode % report_interval == 0 {
                info!(
                    "Episode {}: score = {:.3}, mean score = {:.3}, epsilon = {:.4}, beta = {:.4}",
                    episode,
                    score,
                    summary.recent_mean_score(self.config.score_window),
                    epsilon.value(),
                    iw_scheduler.beta(),
                );
            }
            epsilon.decay();
        }

        if let Some(model_dir) = &self.config.model_dir {
            agent.save_params(Path::new(model_dir))?;
            info!("Saved the model in {:?}.", model_dir);
        }

        Ok(summary)
    }
}
