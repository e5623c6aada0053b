mod race;
mod test;
mod time_trial;
mod training;

use crate::agent::Mode;
use crate::path::RacePath;
use crate::simulation::{AgentId, Simulation};
use nalgebra::point;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub mod prelude {
    pub use super::Scenario;
    pub use super::Status;
    pub use super::{check_race_finished, oval_course, straight_course};
    pub use super::MAX_TICKS;
    pub use crate::agent::Mode;
    pub use crate::collision::{add_ground, add_obstacle};
    pub use crate::path::RacePath;
    pub use crate::policy::{Autopilot, RandomPolicy};
    pub use crate::rng::{agent_rng, new_rng, SeededRng};
    pub use crate::simulation::{AgentId, Simulation};
    pub use nalgebra::{point, vector, Point3, UnitQuaternion, Vector3};
    pub use rand::Rng;
}

pub const MAX_TICKS: u32 = 60 * 60 * 5;

#[derive(PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Copy, Clone)]
pub enum Status {
    Running,
    Finished { agent: AgentId },
    Draw,
}

pub trait Scenario {
    fn name(&self) -> String;

    fn human_name(&self) -> String {
        self.name()
    }

    fn mode(&self) -> Mode;

    fn course(&self) -> RacePath;

    fn init(&mut self, sim: &mut Simulation, seed: u32);

    fn tick(&mut self, _: &mut Simulation) {}

    fn status(&self, _: &Simulation) -> Status {
        Status::Running
    }
}

pub fn load_safe(name: &str) -> Option<Box<dyn Scenario>> {
    let scenario: Option<Box<dyn Scenario>> = match name {
        "training" => Some(Box::new(training::Training::new())),
        "race" => Some(Box::new(race::Race::new())),
        "time_trial" => Some(Box::new(time_trial::TimeTrial::new())),
        // Testing
        "test" => Some(Box::new(test::TestScenario::new(Mode::Racing))),
        "test_training" => Some(Box::new(test::TestScenario::new(Mode::Training))),
        _ => None,
    };
    if let Some(scenario) = scenario.as_ref() {
        assert_eq!(scenario.name(), name);
    }
    scenario
}

pub fn load(name: &str) -> Box<dyn Scenario> {
    match load_safe(name) {
        Some(scenario) => scenario,
        None => panic!("Unknown scenario {name:?}"),
    }
}

pub fn list() -> Vec<String> {
    vec!["training", "race", "time_trial"]
        .iter()
        .map(|x| x.to_string())
        .collect()
}

/// Eight waypoints on an ellipse around the origin, alternating between two
/// altitudes.
pub fn oval_course() -> RacePath {
    let n = 8;
    let waypoints = (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64;
            let altitude = if i % 2 == 0 { 50.0 } else { 80.0 };
            point![300.0 * angle.sin(), altitude, 200.0 * angle.cos()]
        })
        .collect();
    RacePath::looped(waypoints)
}

/// Five waypoints 200 m apart heading north (+z) at 50 m altitude.
pub fn straight_course() -> RacePath {
    RacePath::open(
        (0..5)
            .map(|i| point![0.0, 50.0, 200.0 * i as f64])
            .collect(),
    )
}

/// The first agent to complete `laps` laps wins. Agents reaching it in the
/// same tick are ordered by id.
pub fn check_race_finished(sim: &Simulation, laps: u32) -> Option<AgentId> {
    sim.events()
        .laps
        .iter()
        .find(|(_, completed)| *completed >= laps)
        .map(|(id, _)| *id)
}
