//! The course shared by every agent, and where agents are put back on it.
use crate::checkpoint::{CheckpointSequence, Progress};
use crate::path::PathEvaluator;
use crate::rng::{new_rng, SeededRng};
use nalgebra::{Isometry3, Translation3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Lateral spacing between agents is drawn from this integer range
    /// (inclusive min, exclusive max) on every reset.
    pub lateral_jitter_min: i32,
    pub lateral_jitter_max: i32,
    /// Radius of the checkpoint trigger volumes.
    pub checkpoint_trigger_radius: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            lateral_jitter_min: 8,
            lateral_jitter_max: 11,
            checkpoint_trigger_radius: 30.0,
        }
    }
}

pub struct RaceArea {
    path: Box<dyn PathEvaluator>,
    checkpoints: CheckpointSequence,
    ranks: BTreeSet<usize>,
    config: AreaConfig,
    rng: SeededRng,
}

impl RaceArea {
    pub fn new(path: Box<dyn PathEvaluator>, config: AreaConfig, seed: u32) -> Self {
        assert!(
            config.lateral_jitter_min < config.lateral_jitter_max,
            "Empty lateral jitter range"
        );
        let checkpoints = CheckpointSequence::from_path(path.as_ref());
        Self {
            path,
            checkpoints,
            ranks: BTreeSet::new(),
            config,
            rng: new_rng(seed),
        }
    }

    pub fn checkpoints(&self) -> &CheckpointSequence {
        &self.checkpoints
    }

    pub fn path(&self) -> &dyn PathEvaluator {
        self.path.as_ref()
    }

    pub fn config(&self) -> &AreaConfig {
        &self.config
    }

    pub fn agent_count(&self) -> usize {
        self.ranks.len()
    }

    /// Returns the rank of the new agent: the lowest one no live agent
    /// holds, so ranks stay unique after removals.
    pub fn register_agent(&mut self) -> usize {
        let rank = (0..).find(|r| !self.ranks.contains(r)).unwrap_or_default();
        self.ranks.insert(rank);
        rank
    }

    pub fn unregister_agent(&mut self, rank: usize) {
        self.ranks.remove(&rank);
    }

    /// Sideways distance from the centerline for the agent at `rank`.
    ///
    /// Ranks are centered with integer division, so with four agents the
    /// slots are -2, -1, 0 and 1 times the jitter.
    pub fn lateral_offset(&mut self, rank: usize) -> f64 {
        let slot = rank as i64 - (self.agent_count() / 2) as i64;
        let jitter = self
            .rng
            .gen_range(self.config.lateral_jitter_min..self.config.lateral_jitter_max);
        (slot * jitter as i64) as f64
    }

    /// Picks where an agent restarts: the checkpoint just before its target.
    ///
    /// With `randomize` a new target is drawn uniformly from 1..N first, so
    /// training episodes start all along the course. Otherwise the target is
    /// kept. The returned progress carries the target; its deadline and laps
    /// are left as they were.
    pub fn reset_placement(
        &mut self,
        rank: usize,
        progress: Progress,
        randomize: bool,
    ) -> (Progress, Isometry3<f64>) {
        assert!(!self.ranks.is_empty(), "Race area has no agents");
        let len = self.checkpoints.len();
        let next_checkpoint = if randomize {
            if len < 2 {
                0
            } else {
                self.rng.gen_range(1..len)
            }
        } else {
            progress.next_checkpoint % len
        };

        let previous = self.checkpoints.previous_index(next_checkpoint);
        let pos = self.path.from_path_units(previous);
        let position = self.path.evaluate_position(pos);
        let rotation = self.path.evaluate_orientation(pos);
        let offset = rotation * (Vector3::x() * self.lateral_offset(rank));

        let pose = Isometry3::from_parts(Translation3::from(position.coords + offset), rotation);
        (
            Progress {
                next_checkpoint,
                ..progress
            },
            pose,
        )
    }
}
