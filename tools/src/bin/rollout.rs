use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap()]
struct Arguments {
    #[clap(default_value = "training")]
    scenario: String,

    #[clap(short, long, default_value = "0")]
    seed: u32,

    #[clap(short = 'n', long, default_value = "20000")]
    steps: u32,

    #[clap(short, long)]
    policy: Option<String>,

    /// Curriculum arrival radius.
    #[clap(long)]
    checkpoint_radius: Option<f64>,

    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("rollout=info"))
        .init();

    let args = Arguments::parse();
    wingdash_tools::check_scenario(&args.scenario)?;
    let config = wingdash_tools::load_config(args.config.as_deref())?;

    let episodes = wingdash_tools::run_rollout(
        &args.scenario,
        args.seed,
        &config,
        args.policy.as_deref(),
        args.steps,
        args.checkpoint_radius,
    )?;

    let mut total = 0.0;
    for (agent, summary) in episodes.iter() {
        println!(
            "{:?} episode {:3}: {:>14?} after {:5} steps, reward {:8.3}",
            agent, summary.number, summary.end, summary.steps, summary.reward
        );
        total += summary.reward;
    }
    if episodes.is_empty() {
        log::info!("No episode ended in {} steps", args.steps);
    } else {
        log::info!(
            "{} episodes, mean reward {:.3}",
            episodes.len(),
            total / episodes.len() as f64
        );
    }
    Ok(())
}
