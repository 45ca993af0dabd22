use anyhow::Result;
use qlearn_candle_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig, DqnVariant},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
};
use qlearn_core::{replay_buffer::ReplayBufferConfig, Agent};
use tempdir::TempDir;

type Obs = Vec<f32>;

fn config(variant: DqnVariant, batch_size: usize, update_every: usize) -> DqnConfig<MlpConfig> {
    let model_config = DqnModelConfig::default()
        .q_config(MlpConfig::new(2, vec![16, 16], 2, false))
        .opt_config(OptimizerConfig::Adam { lr: 1e-2 });
    DqnConfig::default()
        .model_config(model_config)
        .replay_buffer_config(ReplayBufferConfig::default().capacity(1000).seed(7))
        .variant(variant)
        .batch_size(batch_size)
        .update_every(update_every)
        .tau(0.1)
        .seed(7)
}

fn state(i: usize) -> Obs {
    match i {
        0 => vec![1.0, 0.0],
        _ => vec![0.0, 1.0],
    }
}

fn max_abs_diff(a: &[Vec<f32>], b: &[Vec<f32>]) -> f32 {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .map(|(x, y)| (x - y).abs())
        .fold(0f32, f32::max)
}

#[test]
fn test_learning_cadence() -> Result<()> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 2))?;

    // Learning needs an even step count and more than 4 stored transitions.
    let mut learned = vec![];
    for t in 1..=10 {
        let loss = agent.step(state(0), 0, 1.0, state(1), false)?;
        learned.push((t, loss.is_some()));
    }
    let expected = vec![
        (1, false),
        (2, false),
        (3, false),
        (4, false),
        (5, false),
        (6, true),
        (7, false),
        (8, true),
        (9, false),
        (10, true),
    ];
    assert_eq!(learned, expected);
    assert_eq!(agent.n_steps(), 10);
    assert_eq!(agent.n_learns(), 3);
    Ok(())
}

#[test]
fn test_invalid_config() {
    assert!(Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 2).tau(0.0)).is_err());
    assert!(Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 2).tau(1.5)).is_err());
    assert!(Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 0)).is_err());

    for variant in [DqnVariant::Dqn, DqnVariant::DqnPer].iter() {
        let zero_capacity = config(*variant, 4, 2)
            .replay_buffer_config(ReplayBufferConfig::default().capacity(0));
        assert!(Dqn::<Mlp, Obs>::build(zero_capacity).is_err(), "{:?}", variant);
    }
}

#[test]
fn test_terminal_transitions_do_not_bootstrap() -> Result<()> {
    // A self-loop with reward 0.5: bootstrapping would drive Q(s, 0) towards
    // 0.5 / (1 - 0.99), while terminal transitions pin it to the reward.
    let config = config(DqnVariant::Dqn, 16, 1).discount_factor(0.99);
    let mut agent = Dqn::<Mlp, Obs>::build(config)?;
    let mut last_loss = None;
    for _ in 0..400 {
        if let Some(loss) = agent.step(state(0), 0, 0.5, state(0), true)? {
            last_loss = Some(loss);
        }
    }

    let q = agent.action_values(&[state(0)])?.to_vec2::<f32>()?;
    assert!((q[0][0] - 0.5).abs() < 0.05, "q = {}", q[0][0]);
    let last_loss = last_loss.expect("agent never learned");
    assert!(last_loss < 1e-2, "loss = {}", last_loss);
    Ok(())
}

#[test]
fn test_invalid_action() -> Result<()> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 2))?;
    assert!(agent.step(state(0), 2, 1.0, state(1), false).is_err());
    assert!(agent.buffer().is_empty());
    Ok(())
}

#[test]
fn test_target_starts_as_copy_and_tracks() -> Result<()> {
    let states = vec![state(0), state(1)];
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 2, 1).tau(1.0))?;
    let q = agent.action_values(&states)?.to_vec2::<f32>()?;
    let q_tgt = agent.target_action_values(&states)?.to_vec2::<f32>()?;
    assert_eq!(q, q_tgt);

    // With tau = 1 the target is a hard copy after every learning update.
    for _ in 0..3 {
        agent.step(state(0), 1, 1.0, state(1), true)?;
    }
    assert_eq!(agent.n_learns(), 1);
    let q = agent.action_values(&states)?.to_vec2::<f32>()?;
    let q_tgt = agent.target_action_values(&states)?.to_vec2::<f32>()?;
    assert!(max_abs_diff(&q, &q_tgt) < 1e-6);
    Ok(())
}

#[test]
fn test_greedy_action_is_deterministic() -> Result<()> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 4, 2))?;
    let a = agent.act(&state(0), 0.0)?;
    assert!(a < 2);
    for _ in 0..10 {
        assert_eq!(agent.act(&state(0), 0.0)?, a);
    }
    Ok(())
}

#[test]
fn test_prioritized_learning_revises_priorities() -> Result<()> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::DqnPer, 4, 1))?;
    assert!(agent.buffer().is_prioritized());
    agent.set_beta(0.5);

    let mut loss = None;
    for i in 0..5 {
        loss = agent.step(state(i % 2), i % 2, 1.0, state(1), true)?;
    }
    assert!(loss.is_some());

    // Fresh transitions enter with priority 1; the sampled ones are revised
    // from their TD errors.
    let n_revised = (0..5)
        .filter_map(|ix| agent.buffer().priority(ix))
        .filter(|p| (p - 1.0).abs() > 1e-6)
        .count();
    assert!(n_revised > 0);
    Ok(())
}

#[test]
fn test_uniform_variant_has_no_priorities() -> Result<()> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::DoubleDqn, 4, 1))?;
    for _ in 0..6 {
        agent.step(state(0), 0, 0.0, state(1), false)?;
    }
    assert!(!agent.buffer().is_prioritized());
    assert_eq!(agent.buffer().priority(0), None);
    Ok(())
}

fn train_contextual_bandit(variant: DqnVariant) -> Result<Dqn<Mlp, Obs>> {
    let mut agent = Dqn::<Mlp, Obs>::build(config(variant, 16, 1))?;
    agent.set_beta(1.0);

    // The rewarded action equals the index of the state. Every transition
    // terminates, so the action values converge to the expected rewards.
    for t in 0..600 {
        let s = t % 2;
        let a = agent.act(&state(s), 1.0)?;
        let r = if a == s { 1.0 } else { 0.0 };
        agent.step(state(s), a, r, state(1 - s), true)?;
    }
    Ok(agent)
}

#[test]
fn test_learns_contextual_bandit() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    for variant in [DqnVariant::Dqn, DqnVariant::DoubleDqnPer].iter() {
        let mut agent = train_contextual_bandit(*variant)?;
        assert_eq!(agent.act(&state(0), 0.0)?, 0, "{:?}", variant);
        assert_eq!(agent.act(&state(1), 0.0)?, 1, "{:?}", variant);

        let q = agent.action_values(&[state(0), state(1)])?.to_vec2::<f32>()?;
        assert!((q[0][0] - 1.0).abs() < 0.2, "{:?}: {:?}", variant, q);
        assert!(q[0][1].abs() < 0.2, "{:?}: {:?}", variant, q);
    }
    Ok(())
}

#[test]
fn test_save_and_load() -> Result<()> {
    let states = vec![state(0), state(1)];
    let mut agent = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 2, 1))?;
    for _ in 0..5 {
        agent.step(state(0), 1, 1.0, state(1), false)?;
    }

    let dir = TempDir::new("dqn")?;
    agent.save_params(dir.path())?;
    assert!(dir.path().join("qnet.safetensors").exists());
    assert!(dir.path().join("qnet_tgt.safetensors").exists());

    let mut agent_ = Dqn::<Mlp, Obs>::build(config(DqnVariant::Dqn, 2, 1))?;
    agent_.load_params(dir.path())?;

    let q = agent.action_values(&states)?.to_vec2::<f32>()?;
    let q_ = agent_.action_values(&states)?.to_vec2::<f32>()?;
    assert!(max_abs_diff(&q, &q_) < 1e-6);

    let q_tgt = agent.target_action_values(&states)?.to_vec2::<f32>()?;
    let q_tgt_ = agent_.target_action_values(&states)?.to_vec2::<f32>()?;
    assert!(max_abs_diff(&q_tgt, &q_tgt_) < 1e-6);

    // The replay buffer is not part of the saved parameters.
    assert!(agent_.buffer().is_empty());
    Ok(())
}
