//! Corridor environment.
use anyhow::{bail, Result};
use qlearn_core::{Env, Step};

/// Reward of reaching the right end.
const GOAL_REWARD: f32 = 1.0;

/// Reward of any other step.
const STEP_REWARD: f32 = -0.01;

/// A walk along a corridor of `len` cells.
///
/// The agent starts at the left end and moves left (action 0) or right
/// (action 1). Reaching the right end terminates the episode; episodes are
/// truncated after `max_steps` steps. Observations are one-hot positions.
pub struct Corridor {
    len: usize,
    max_steps: usize,
    pos: usize,
    t: usize,
}

impl Corridor {
    /// Constructs a corridor.
    pub fn new(len: usize, max_steps: usize) -> Result<Self> {
        if len < 2 {
            bail!("A corridor needs at least 2 cells, got {}", len);
        }
        Ok(Self {
            len,
            max_steps,
            pos: 0,
            t: 0,
        })
    }

    /// Dimension of observations.
    pub fn obs_dim(&self) -> usize {
        self.len
    }

    fn obs(&self) -> Vec<f32> {
        let mut obs = vec![0f32; self.len];
        obs[self.pos] = 1.0;
        obs
    }
}

impl Env for Corridor {
    type Obs = Vec<f32>;

    fn action_dim(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.pos = 0;
        self.t = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: usize) -> Result<Step<Vec<f32>>> {
        match act {
            0 => self.pos = self.pos.saturating_sub(1),
            1 => self.pos += 1,
            _ => bail!("Invalid action {}", act),
        }
        self.t += 1;

        let is_terminated = self.pos == self.len - 1;
        let is_truncated = !is_terminated && self.t >= self.max_steps;
        let reward = match is_terminated {
            true => GOAL_REWARD,
            false => STEP_REWARD,
        };

        Ok(Step::new(self.obs(), reward, is_terminated, is_truncated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_to_goal() -> Result<()> {
        let mut env = Corridor::new(3, 10)?;
        assert_eq!(env.reset()?, vec![1.0, 0.0, 0.0]);

        let step = env.step(0)?;
        assert_eq!(step.obs, vec![1.0, 0.0, 0.0]);
        assert_eq!(step.reward, STEP_REWARD);
        assert!(!step.is_done());

        let step = env.step(1)?;
        assert_eq!(step.obs, vec![0.0, 1.0, 0.0]);

        let step = env.step(1)?;
        assert_eq!(step.obs, vec![0.0, 0.0, 1.0]);
        assert_eq!(step.reward, GOAL_REWARD);
        assert!(step.is_terminated);
        assert!(!step.is_truncated);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let mut env = Corridor::new(5, 2)?;
        env.reset()?;
        assert!(!env.step(0)?.is_done());
        let step = env.step(0)?;
        assert!(step.is_truncated);
        assert!(!step.is_terminated);

        // reset starts a new episode
        assert_eq!(env.reset()?, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(!env.step(1)?.is_done());
        Ok(())
    }

    #[test]
    fn test_invalid() {
        assert!(Corridor::new(1, 10).is_err());
        let mut env = Corridor::new(3, 10).unwrap();
        assert!(env.step(2).is_err());
    }
}
