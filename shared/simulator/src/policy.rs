//! Builtin action sources.
use crate::rng::{new_rng, SeededRng};
use rand::Rng;
use wingdash_api::{ActionSource, DiscreteActions, Observation, BRANCH_SIZES};

/// Steers straight at the next checkpoint.
#[derive(Clone, Debug)]
pub struct Autopilot {
    /// Lateral or vertical offset, as a fraction of the distance, that is
    /// tolerated before steering.
    pub deadband: f64,
    /// Boost when the checkpoint is within this fraction of dead ahead.
    pub boost_cone: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            deadband: 0.05,
            boost_cone: 0.2,
        }
    }
}

impl ActionSource for Autopilot {
    fn act(&mut self, observation: &Observation) -> DiscreteActions {
        let [x, y, z] = observation.to_next_checkpoint;
        let distance = (x * x + y * y + z * z).sqrt();
        if distance < 1e-6 {
            return DiscreteActions::HOLD;
        }
        let threshold = self.deadband * distance;

        let yaw = if z < 0.0 {
            if x >= 0.0 {
                1
            } else {
                2
            }
        } else if x > threshold {
            1
        } else if x < -threshold {
            2
        } else {
            0
        };

        // Positive pitch lowers the nose.
        let pitch = if y > threshold {
            2
        } else if y < -threshold {
            1
        } else {
            0
        };

        let ahead = z > 0.0 && (x * x + y * y).sqrt() < self.boost_cone * z;
        DiscreteActions {
            pitch,
            yaw,
            boost: ahead as i32,
        }
    }
}

/// Uniformly random actions from a seeded stream.
pub struct RandomPolicy {
    rng: SeededRng,
}

impl RandomPolicy {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: new_rng(seed),
        }
    }

    pub fn from_rng(rng: SeededRng) -> Self {
        Self { rng }
    }
}

impl ActionSource for RandomPolicy {
    fn act(&mut self, _: &Observation) -> DiscreteActions {
        DiscreteActions {
            pitch: self.rng.gen_range(0..BRANCH_SIZES[0]),
            yaw: self.rng.gen_range(0..BRANCH_SIZES[1]),
            boost: self.rng.gen_range(0..BRANCH_SIZES[2]),
        }
    }
}

/// Never touches the controls.
#[derive(Clone, Debug, Default)]
pub struct Hold;

impl ActionSource for Hold {
    fn act(&mut self, _: &Observation) -> DiscreteActions {
        DiscreteActions::HOLD
    }
}

pub const BUILTIN_NAMES: &[&str] = &["autopilot", "random", "hold"];

pub fn builtin(name: &str, seed: u32) -> Option<Box<dyn ActionSource>> {
    match name {
        "autopilot" => Some(Box::new(Autopilot::default())),
        "random" => Some(Box::new(RandomPolicy::new(seed))),
        "hold" => Some(Box::new(Hold)),
        _ => None,
    }
}
