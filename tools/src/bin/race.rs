use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use wingdash_simulator::scenario::{self, Status};

#[derive(Parser, Debug)]
#[clap()]
struct Arguments {
    #[clap(default_value = "race")]
    scenario: String,

    /// Number of seeds to race, starting from --seed.
    #[clap(short, long, default_value = "10")]
    rounds: u32,

    #[clap(short, long, default_value = "0")]
    seed: u32,

    /// Fly every aircraft with this builtin policy.
    #[clap(short, long)]
    policy: Option<String>,

    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("race=info"))
        .init();

    let args = Arguments::parse();
    wingdash_tools::check_scenario(&args.scenario)?;
    let config = wingdash_tools::load_config(args.config.as_deref())?;

    log::info!(
        "Running {} races of {}",
        args.rounds,
        scenario::load(&args.scenario).human_name()
    );
    let results = (args.seed..args.seed + args.rounds)
        .into_par_iter()
        .map(|seed| {
            wingdash_tools::run_race(&args.scenario, seed, &config, args.policy.as_deref())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let mut wins = std::collections::BTreeMap::new();
    let mut draws = vec![];
    for result in results.iter() {
        match result.status {
            Status::Finished { agent } => {
                println!(
                    "seed {:4}: {:?} finished at tick {} ({} crashes)",
                    result.seed, agent, result.ticks, result.crashes
                );
                *wins.entry(agent).or_insert(0) += 1;
            }
            _ => {
                println!("seed {:4}: no finisher", result.seed);
                draws.push(result.seed);
            }
        }
    }
    let mean_tick_ms = results.iter().map(|r| r.timing.total()).sum::<f64>() * 1e3
        / results.len().max(1) as f64;
    log::info!("Mean step time {:.3} ms", mean_tick_ms);
    for (agent, count) in wins {
        log::info!("{:?} won {} races", agent, count);
    }
    if !draws.is_empty() {
        log::info!("No finisher for seeds {:?}", draws);
    }
    Ok(())
}
