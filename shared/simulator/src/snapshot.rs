use crate::agent::{Mode, Visuals};
use crate::checkpoint::{Checkpoint, Progress};
use crate::scenario::Status;
use crate::simulation::AgentId;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Snapshot {
    pub nonce: u32,
    pub tick: u32,
    pub time: f64,
    pub status: Status,
    pub mode: Mode,
    pub agents: Vec<AgentSnapshot>,
    pub checkpoints: Vec<Checkpoint>,
    pub timing: Timing,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub rank: usize,
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub velocity: Vector3<f64>,
    pub progress: Progress,
    pub frozen: bool,
    pub visuals: Visuals,
    pub episode: u32,
    pub reward: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Timing {
    pub agents: f64,
    pub physics: f64,
    pub collision: f64,
    pub scenario: f64,
}

impl Timing {
    pub fn total(&self) -> f64 {
        self.agents + self.physics + self.collision + self.scenario
    }
}

impl std::ops::Add for Timing {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            agents: self.agents + other.agents,
            physics: self.physics + other.physics,
            collision: self.collision + other.collision,
            scenario: self.scenario + other.scenario,
        }
    }
}

impl std::ops::AddAssign for Timing {
    fn add_assign(&mut self, other: Self) {
        *self = self.clone() + other;
    }
}

impl std::ops::Mul<f64> for Timing {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            agents: self.agents * other,
            physics: self.physics * other,
            collision: self.collision * other,
            scenario: self.scenario * other,
        }
    }
}

/// Moves agents along their velocity for rendering between ticks. Frozen
/// agents stay put.
pub fn interpolate(snapshot: &mut Snapshot, dt: f64) {
    snapshot.time += dt;

    for agent in snapshot.agents.iter_mut() {
        if !agent.frozen {
            agent.position += agent.velocity * dt;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn test_timing_mean() {
        let mut sum = Timing::default();
        sum += Timing {
            agents: 1.0,
            physics: 2.0,
            collision: 0.5,
            scenario: 0.0,
        };
        sum += Timing {
            agents: 3.0,
            physics: 4.0,
            collision: 0.5,
            scenario: 1.0,
        };
        let mean = sum * 0.5;
        assert_abs_diff_eq!(mean.agents, 2.0);
        assert_abs_diff_eq!(mean.physics, 3.0);
        assert_abs_diff_eq!(mean.collision, 0.5);
        assert_abs_diff_eq!(mean.scenario, 0.5);
        assert_abs_diff_eq!(mean.total(), 6.0);
    }
}
