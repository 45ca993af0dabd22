mod env;
mod report;
use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};
use env::Corridor;
use log::info;
use qlearn_candle_agent::{
    dqn::{Dqn, DqnConfig, DqnModelConfig, DqnVariant},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
};
use qlearn_core::{
    replay_buffer::{PerConfig, ReplayBufferConfig},
    EpsilonConfig, Env as _, Trainer, TrainerConfig,
};
use std::{fs, path::PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentType {
    /// Next-state action selected by the target network
    Dqn,
    /// Next-state action selected by the online network
    Ddqn,
}

/// Train a DQN agent in the corridor environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Agent type
    #[arg(value_enum, default_value_t = AgentType::Dqn)]
    agent_type: AgentType,

    /// Use prioritized experience replay
    #[arg(long, default_value_t = false)]
    prioritized: bool,

    /// Exponent for prioritization
    #[arg(long, default_value_t = 0.6)]
    alpha: f32,

    /// Initial exponent of importance sampling weights
    #[arg(long, default_value_t = 0.4)]
    beta: f32,

    /// Final exponent of importance sampling weights
    #[arg(long, default_value_t = 1.0)]
    beta_final: f32,

    /// Learning updates over which beta is annealed
    #[arg(long, default_value_t = 500_000)]
    beta_n_learns: usize,

    /// Additive constant of priorities
    #[arg(long, default_value_t = 1e-8)]
    eps: f32,

    /// Soft update coefficient of the target network
    #[arg(long, default_value_t = 1e-3)]
    tau: f64,

    /// Environment steps between learning updates
    #[arg(long, default_value_t = 4)]
    update_every: usize,

    /// Batch size
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 5e-4)]
    lr: f64,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    /// Capacity of the replay buffer
    #[arg(long, default_value_t = 10000)]
    replay_buffer_size: usize,

    /// Initial exploration rate
    #[arg(long, default_value_t = 1.0)]
    init_epsilon: f64,

    /// Per-episode decay of the exploration rate
    #[arg(long, default_value_t = 0.995)]
    epsilon_decay: f64,

    /// Minimum exploration rate
    #[arg(long, default_value_t = 0.01)]
    min_epsilon: f64,

    /// Number of training episodes
    #[arg(long, default_value_t = 1000)]
    num_episodes: usize,

    /// Number of cells of the corridor
    #[arg(long, default_value_t = 8)]
    corridor_len: usize,

    /// Step limit of an episode
    #[arg(long, default_value_t = 100)]
    max_steps: usize,

    /// Base directory of trained parameters
    #[arg(long, default_value = "./data/models")]
    model_dir: String,

    /// Base directory of training reports
    #[arg(long, default_value = "./reports")]
    reports_dir: String,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// YAML file of the agent configuration, overriding the agent options
    #[arg(long)]
    config: Option<String>,
}

fn agent_config(args: &Args, in_dim: usize, out_dim: usize) -> Result<DqnConfig<MlpConfig>> {
    if let Some(path) = &args.config {
        return DqnConfig::load(path);
    }

    let variant = DqnVariant::new(matches!(args.agent_type, AgentType::Ddqn), args.prioritized);
    let per_config = match args.prioritized {
        true => Some(PerConfig::default().alpha(args.alpha).eps(args.eps)),
        false => None,
    };
    let replay_buffer_config = ReplayBufferConfig::default()
        .capacity(args.replay_buffer_size)
        .seed(args.seed)
        .per_config(per_config);
    let model_config = DqnModelConfig::default()
        .q_config(MlpConfig::new(in_dim, vec![256, 128, 64], out_dim, false))
        .opt_config(OptimizerConfig::default().learning_rate(args.lr));

    Ok(DqnConfig::default()
        .model_config(model_config)
        .replay_buffer_config(replay_buffer_config)
        .variant(variant)
        .batch_size(args.batch_size)
        .update_every(args.update_every)
        .discount_factor(args.gamma)
        .tau(args.tau)
        .seed(args.seed))
}

fn run_name(variant: DqnVariant) -> String {
    let variant = match variant {
        DqnVariant::Dqn => "dqn",
        DqnVariant::DoubleDqn => "ddqn",
        DqnVariant::DqnPer => "dqn_per",
        DqnVariant::DoubleDqnPer => "ddqn_per",
    };
    format!("{}_{}", variant, Local::now().format("%Y%m%d_%H%M%S"))
}

fn train(args: &Args) -> Result<PathBuf> {
    let mut env = Corridor::new(args.corridor_len, args.max_steps)?;
    let agent_config = agent_config(args, env.obs_dim(), env.action_dim())?;
    let run_name = run_name(agent_config.get_variant());
    let model_dir = PathBuf::from(&args.model_dir).join(&run_name);
    let reports_dir = PathBuf::from(&args.reports_dir).join(&run_name);
    fs::create_dir_all(&reports_dir)?;

    let trainer_config = TrainerConfig::default()
        .num_episodes(args.num_episodes)
        .epsilon(EpsilonConfig {
            init: args.init_epsilon,
            decay: args.epsilon_decay,
            min: args.min_epsilon,
        })
        .beta(args.beta, args.beta_final, args.beta_n_learns)
        .model_dir(model_dir.to_string_lossy());
    agent_config.save(reports_dir.join("agent.yaml"))?;
    trainer_config.save(reports_dir.join("trainer.yaml"))?;

    let mut agent = Dqn::<Mlp, Vec<f32>>::build(agent_config)?;
    let summary = Trainer::build(trainer_config).train(&mut env, &mut agent)?;
    report::write_scores(reports_dir.join("scores.csv"), &summary)?;
    info!(
        "Finished {} episodes with {} learning updates, mean score of the last 100 episodes = {:.3}",
        summary.scores.len(),
        summary.n_learns,
        summary.recent_mean_score(100)
    );

    Ok(reports_dir)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    train(&args)?;
    Ok(())
}
