use clap::Parser;
use std::path::PathBuf;
use wingdash_simulator::scenario;
use wingdash_simulator::simulation::Simulation;
use wingdash_simulator::snapshot::Snapshot;

#[derive(Parser, Debug)]
#[clap()]
struct Arguments {
    scenario: String,

    #[clap(short, long)]
    seed: u32,

    #[clap(short, long)]
    policy: Option<String>,

    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Arguments::parse();
    wingdash_tools::check_scenario(&args.scenario)?;
    let config = wingdash_tools::load_config(args.config.as_deref())?;

    let mut sims = Vec::new();
    for _ in 0..2 {
        let mut sim = Simulation::new(&args.scenario, args.seed, &config);
        if let Some(policy) = args.policy.as_deref() {
            wingdash_tools::override_policy(&mut sim, policy)?;
        }
        sims.push(sim);
    }
    while sims[0].status() == scenario::Status::Running && sims[0].tick() < scenario::MAX_TICKS {
        let hashes = sims.iter().map(|sim| sim.hash()).collect::<Vec<_>>();
        if hashes[0] != hashes[1] {
            println!("hashes differ at tick {}", sims[0].tick());
            diff_snapshots(&sims[0].snapshot(0), &sims[1].snapshot(0));
            return Ok(());
        }
        sims.iter_mut().for_each(|sim| sim.step());
    }
    println!("identical through tick {}", sims[0].tick());

    Ok(())
}

fn diff_snapshots(a: &Snapshot, b: &Snapshot) {
    if a.agents.len() != b.agents.len() {
        println!("agent count differs");
        println!("  a: {}", a.agents.len());
        println!("  b: {}", b.agents.len());
    }

    for (a, b) in a.agents.iter().zip(b.agents.iter()) {
        let epsilon = 0.0;

        if (a.position - b.position).magnitude() > epsilon {
            println!("{:?} position differs", a.id);
            println!("  a: {:?}", a.position);
            println!("  b: {:?}", b.position);
        }

        if (a.velocity - b.velocity).magnitude() > epsilon {
            println!("{:?} velocity differs", a.id);
            println!("  a: {:?}", a.velocity);
            println!("  b: {:?}", b.velocity);
        }

        if a.rotation.angle_to(&b.rotation) > epsilon {
            println!("{:?} rotation differs", a.id);
            println!("  a: {:?}", a.rotation);
            println!("  b: {:?}", b.rotation);
        }

        if a.progress != b.progress {
            println!("{:?} progress differs", a.id);
            println!("  a: {:?}", a.progress);
            println!("  b: {:?}", b.progress);
        }

        if (a.reward - b.reward).abs() > epsilon {
            println!("{:?} reward differs", a.id);
            println!("  a: {:?}", a.reward);
            println!("  b: {:?}", b.reward);
        }
    }
}
