use super::prelude::*;

/// A straight course with nothing on it. Tests add their own agents.
pub struct TestScenario {
    mode: Mode,
}

impl TestScenario {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }
}

impl Scenario for TestScenario {
    fn name(&self) -> String {
        match self.mode {
            Mode::Racing => "test".into(),
            Mode::Training => "test_training".into(),
        }
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn course(&self) -> RacePath {
        straight_course()
    }

    fn init(&mut self, _sim: &mut Simulation, _seed: u32) {}
}
