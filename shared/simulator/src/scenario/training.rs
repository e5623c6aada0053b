use super::prelude::*;

/// Several agents learning on the oval. Episodes restart independently at
/// random points of the course.
pub struct Training {
    agents: usize,
}

impl Training {
    pub fn new() -> Self {
        Self { agents: 4 }
    }
}

impl Scenario for Training {
    fn name(&self) -> String {
        "training".into()
    }

    fn human_name(&self) -> String {
        "Training".into()
    }

    fn mode(&self) -> Mode {
        Mode::Training
    }

    fn course(&self) -> RacePath {
        oval_course()
    }

    fn init(&mut self, sim: &mut Simulation, seed: u32) {
        add_ground(sim, 0.0);
        for rank in 0..self.agents {
            sim.add_agent(Box::new(RandomPolicy::from_rng(agent_rng(seed, rank))));
        }
    }
}
