use super::prelude::*;

pub struct Race {
    agents: usize,
    winner: Option<AgentId>,
}

impl Race {
    pub fn new() -> Self {
        Self {
            agents: 4,
            winner: None,
        }
    }
}

impl Scenario for Race {
    fn name(&self) -> String {
        "race".into()
    }

    fn human_name(&self) -> String {
        "Race".into()
    }

    fn mode(&self) -> Mode {
        Mode::Racing
    }

    fn course(&self) -> RacePath {
        oval_course()
    }

    fn init(&mut self, sim: &mut Simulation, seed: u32) {
        add_ground(sim, 0.0);

        // Tower in the infield and pylons just outside the racing line.
        add_obstacle(
            sim,
            point![0.0, 100.0, 0.0],
            UnitQuaternion::identity(),
            vector![20.0, 100.0, 20.0],
        );
        let mut rng = new_rng(seed);
        for i in 0..4 {
            let angle = std::f64::consts::FRAC_PI_4 * (2 * i + 1) as f64;
            let height = rng.gen_range(40.0..120.0);
            add_obstacle(
                sim,
                point![420.0 * angle.sin(), height / 2.0, 300.0 * angle.cos()],
                UnitQuaternion::identity(),
                vector![10.0, height / 2.0, 10.0],
            );
        }

        for _ in 0..self.agents {
            sim.add_agent(Box::new(Autopilot::default()));
        }
    }

    fn tick(&mut self, sim: &mut Simulation) {
        if self.winner.is_none() {
            self.winner = check_race_finished(sim, sim.config().laps);
            if let Some(agent) = self.winner {
                log::info!("{:?} won at tick {}", agent, sim.tick());
            }
        }
    }

    fn status(&self, sim: &Simulation) -> Status {
        if let Some(agent) = self.winner {
            Status::Finished { agent }
        } else if sim.tick() >= MAX_TICKS {
            Status::Draw
        } else {
            Status::Running
        }
    }
}
