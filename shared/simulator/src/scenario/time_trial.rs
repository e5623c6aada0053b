use super::prelude::*;

pub struct TimeTrial {
    finished: Option<AgentId>,
}

impl TimeTrial {
    pub fn new() -> Self {
        Self { finished: None }
    }
}

impl Scenario for TimeTrial {
    fn name(&self) -> String {
        "time_trial".into()
    }

    fn human_name(&self) -> String {
        "Time Trial".into()
    }

    fn mode(&self) -> Mode {
        Mode::Racing
    }

    fn course(&self) -> RacePath {
        oval_course()
    }

    fn init(&mut self, sim: &mut Simulation, _seed: u32) {
        add_ground(sim, 0.0);
        sim.add_agent(Box::new(Autopilot::default()));
    }

    fn tick(&mut self, sim: &mut Simulation) {
        if self.finished.is_none() {
            self.finished = check_race_finished(sim, sim.config().laps);
        }
    }

    fn status(&self, sim: &Simulation) -> Status {
        if let Some(agent) = self.finished {
            Status::Finished { agent }
        } else if sim.tick() >= MAX_TICKS {
            Status::Draw
        } else {
            Status::Running
        }
    }
}
