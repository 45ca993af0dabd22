use anyhow::Result;
use qlearn_core::{Agent, EpsilonConfig, Env, Step, Trainer, TrainerConfig};
use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};
use tempdir::TempDir;

/// Episodes terminate after `len` steps; every step is rewarded with 1.
struct CountingEnv {
    len: usize,
    t: usize,
}

impl Env for CountingEnv {
    type Obs = usize;

    fn action_dim(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<usize> {
        self.t = 0;
        Ok(0)
    }

    fn step(&mut self, _act: usize) -> Result<Step<usize>> {
        self.t += 1;
        Ok(Step::new(self.t, 1.0, self.t == self.len, false))
    }
}

#[derive(Default)]
struct Log {
    epsilons: Vec<f64>,
    betas: Vec<f32>,
    transitions: Vec<(usize, usize, bool)>,
    saved: Option<PathBuf>,
}

/// Learns on every second step with loss 0.5.
struct MockAgent {
    n_steps: usize,
    beta: f32,
    log: Rc<RefCell<Log>>,
}

impl Agent<usize> for MockAgent {
    fn act(&mut self, _state: &usize, epsilon: f64) -> Result<usize> {
        self.log.borrow_mut().epsilons.push(epsilon);
        Ok(0)
    }

    fn step(
        &mut self,
        state: usize,
        _action: usize,
        _reward: f32,
        next_state: usize,
        is_terminated: bool,
    ) -> Result<Option<f32>> {
        self.n_steps += 1;
        let mut log = self.log.borrow_mut();
        log.transitions.push((state, next_state, is_terminated));
        log.betas.push(self.beta);
        Ok(match self.n_steps % 2 {
            0 => Some(0.5),
            _ => None,
        })
    }

    fn set_beta(&mut self, beta: f32) {
        self.beta = beta;
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.log.borrow_mut().saved = Some(path.to_owned());
        Ok(())
    }

    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

fn mock_agent() -> (MockAgent, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let agent = MockAgent {
        n_steps: 0,
        beta: 0.0,
        log: log.clone(),
    };
    (agent, log)
}

#[test]
fn test_episode_loop() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new("trainer")?;
    let model_dir = dir.path().join("model");
    let config = TrainerConfig::default()
        .num_episodes(3)
        .epsilon(EpsilonConfig {
            init: 1.0,
            decay: 0.5,
            min: 0.2,
        })
        .beta(0.0, 1.0, 4)
        .model_dir(model_dir.to_string_lossy());
    let mut env = CountingEnv { len: 3, t: 0 };
    let (mut agent, log) = mock_agent();

    let summary = Trainer::build(config).train(&mut env, &mut agent)?;

    assert_eq!(summary.scores, vec![3.0, 3.0, 3.0]);
    // Learning happens on global steps 2, 4, 6, 8.
    assert_eq!(summary.losses, vec![Some(0.5), Some(0.5), Some(0.5)]);
    assert_eq!(summary.n_learns, 4);
    assert_eq!(summary.recent_mean_score(2), 3.0);

    let log = log.borrow();
    // Epsilon decays once per episode.
    assert_eq!(
        log.epsilons,
        vec![1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.25, 0.25, 0.25]
    );
    // Beta advances once per learning update and saturates.
    assert_eq!(
        log.betas,
        vec![0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0]
    );
    // Only the last step of an episode is terminal and observations are chained.
    assert_eq!(
        &log.transitions[..3],
        &[(0, 1, false), (1, 2, false), (2, 3, true)]
    );
    assert_eq!(log.saved.as_deref(), Some(model_dir.as_path()));
    Ok(())
}

#[test]
fn test_truncation_by_step_limit() -> Result<()> {
    let config = TrainerConfig::default()
        .num_episodes(2)
        .max_steps_per_episode(4);
    let mut env = CountingEnv { len: 100, t: 0 };
    let (mut agent, log) = mock_agent();

    let summary = Trainer::build(config).train(&mut env, &mut agent)?;

    assert_eq!(summary.scores, vec![4.0, 4.0]);
    let log = log.borrow();
    assert_eq!(log.transitions.len(), 8);
    // A truncated step is not terminal.
    assert!(log.transitions.iter().all(|(_, _, is_terminated)| !is_terminated));
    assert!(log.saved.is_none());
    Ok(())
}
