use serde::Serialize;
use std::path::Path;
use wingdash_api::ActionSource;
use wingdash_simulator::config::SimConfig;
use wingdash_simulator::episode::EpisodeSummary;
use wingdash_simulator::policy;
use wingdash_simulator::scenario::{self, Status};
use wingdash_simulator::simulation::{AgentId, Simulation};
use wingdash_simulator::snapshot::Timing;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<SimConfig> {
    match path {
        Some(path) => Ok(SimConfig::load(path)?),
        None => Ok(SimConfig::default()),
    }
}

pub fn check_scenario(name: &str) -> anyhow::Result<()> {
    match scenario::load_safe(name) {
        Some(_) => Ok(()),
        None => Err(anyhow::anyhow!(
            "Unknown scenario {:?}, expected one of {:?}",
            name,
            scenario::list()
        )),
    }
}

pub fn builtin_policy(name: &str, seed: u32) -> anyhow::Result<Box<dyn ActionSource>> {
    policy::builtin(name, seed).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown policy {:?}, expected one of {:?}",
            name,
            policy::BUILTIN_NAMES
        )
    })
}

/// Replaces every agent's action source with a fresh instance of `policy`.
pub fn override_policy(sim: &mut Simulation, policy: &str) -> anyhow::Result<()> {
    for (i, id) in sim.agent_ids().into_iter().enumerate() {
        let seed = sim.seed().wrapping_add(i as u32);
        sim.set_action_source(id, builtin_policy(policy, seed)?);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct RaceResult {
    pub seed: u32,
    pub status: Status,
    pub ticks: u32,
    pub crashes: usize,
    /// Mean wall-clock seconds per tick, by phase.
    pub timing: Timing,
}

pub fn run_race(
    scenario_name: &str,
    seed: u32,
    config: &SimConfig,
    policy: Option<&str>,
) -> anyhow::Result<RaceResult> {
    let mut sim = Simulation::new(scenario_name, seed, config);
    if let Some(policy) = policy {
        override_policy(&mut sim, policy)?;
    }
    let mut crashes = 0;
    let mut timing = Timing::default();
    while sim.status() == Status::Running && sim.tick() < scenario::MAX_TICKS {
        sim.step();
        crashes += sim.events().crashes.len();
        timing += sim.timing().clone();
    }
    let ticks = sim.tick();
    Ok(RaceResult {
        seed,
        status: sim.status(),
        ticks,
        crashes,
        timing: timing * (1.0 / ticks.max(1) as f64),
    })
}

pub fn run_rollout(
    scenario_name: &str,
    seed: u32,
    config: &SimConfig,
    policy: Option<&str>,
    steps: u32,
    checkpoint_radius: Option<f64>,
) -> anyhow::Result<Vec<(AgentId, EpisodeSummary)>> {
    let mut sim = Simulation::new(scenario_name, seed, config);
    if let Some(policy) = policy {
        override_policy(&mut sim, policy)?;
    }
    if let Some(radius) = checkpoint_radius {
        sim.environment_parameters_mut().set(
            wingdash_simulator::episode::EnvironmentParameters::CHECKPOINT_RADIUS,
            radius,
        );
    }
    let mut episodes = vec![];
    for _ in 0..steps {
        sim.step();
        episodes.extend(sim.events().episodes.iter().cloned());
    }
    Ok(episodes)
}
