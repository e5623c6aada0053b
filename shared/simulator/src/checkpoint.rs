//! The ordered checkpoints of a course and an agent's progress along them.
use crate::episode::{Episode, EpisodeEnd};
use crate::path::PathEvaluator;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    /// Set on the last checkpoint of the course.
    pub finish: bool,
}

impl Checkpoint {
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation * Vector3::z()
    }
}

/// Non-empty, fixed after construction. Indices wrap around so laps repeat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSequence {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointSequence {
    /// One checkpoint per path waypoint, oriented along the path.
    pub fn from_path(path: &dyn PathEvaluator) -> Self {
        let n = path.waypoint_count();
        let checkpoints = (0..n)
            .map(|i| {
                let pos = path.from_path_units(i);
                Checkpoint {
                    position: path.evaluate_position(pos),
                    rotation: path.evaluate_orientation(pos),
                    finish: i == n - 1,
                }
            })
            .collect();
        Self::new(checkpoints)
    }

    pub fn new(checkpoints: Vec<Checkpoint>) -> Self {
        assert!(!checkpoints.is_empty(), "Checkpoint sequence is empty");
        Self { checkpoints }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> &Checkpoint {
        &self.checkpoints[index % self.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn finish_index(&self) -> usize {
        self.len() - 1
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.len()
    }

    pub fn previous_index(&self, index: usize) -> usize {
        (index % self.len() + self.len() - 1) % self.len()
    }
}

/// Where an agent is along the course.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Checkpoint the agent is heading for. Zero is the start line.
    pub next_checkpoint: usize,
    /// Number of times the finish checkpoint was reached.
    pub laps: u32,
    /// Training only: the episode ends once the step count passes this.
    pub step_deadline: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            next_checkpoint: 1,
            laps: 0,
            step_deadline: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub checkpoint_bonus: f64,
    pub timeout_penalty: f64,
    pub crash_penalty: f64,
    /// Steps allowed between checkpoints.
    pub step_timeout: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            checkpoint_bonus: 1.0,
            timeout_penalty: -0.5,
            crash_penalty: -1.0,
            step_timeout: 300,
        }
    }
}

/// Checkpoint arrival and the training rewards tied to it.
pub struct CheckpointTracker<'a> {
    checkpoints: &'a CheckpointSequence,
    rewards: &'a RewardConfig,
    training: bool,
}

impl<'a> CheckpointTracker<'a> {
    pub fn new(
        checkpoints: &'a CheckpointSequence,
        rewards: &'a RewardConfig,
        training: bool,
    ) -> Self {
        Self {
            checkpoints,
            rewards,
            training,
        }
    }

    pub fn target(&self, progress: &Progress) -> &'a Checkpoint {
        self.checkpoints.get(progress.next_checkpoint)
    }

    /// Moves on to the checkpoint after the current target.
    pub fn advance(&self, progress: Progress, episode: &mut Episode) -> Progress {
        let reached = progress.next_checkpoint % self.checkpoints.len();
        let mut progress = Progress {
            next_checkpoint: self.checkpoints.next_index(reached),
            ..progress
        };
        if self.checkpoints.get(reached).finish {
            progress.laps += 1;
        }
        if self.training {
            episode.add_reward(self.rewards.checkpoint_bonus);
            progress.step_deadline = episode.step_count() + self.rewards.step_timeout;
        }
        log::debug!(
            "reached checkpoint {reached}, next {}",
            progress.next_checkpoint
        );
        progress
    }

    /// Entering any trigger other than the target's is ignored.
    pub fn on_trigger_enter(
        &self,
        progress: Progress,
        entered: usize,
        episode: &mut Episode,
    ) -> Progress {
        if entered == progress.next_checkpoint % self.checkpoints.len() {
            self.advance(progress, episode)
        } else {
            progress
        }
    }

    pub fn reset_deadline(&self, progress: Progress, episode: &Episode) -> Progress {
        Progress {
            step_deadline: episode.step_count() + self.rewards.step_timeout,
            ..progress
        }
    }

    /// Per-step reward shaping in training. Every step costs 1 / max_step,
    /// missing the deadline ends the episode, and coming within `radius` of
    /// the target counts as arrival.
    ///
    /// `to_target` is the offset to the target in the agent's frame.
    pub fn training_tick(
        &self,
        progress: Progress,
        to_target: &Vector3<f64>,
        radius: f64,
        episode: &mut Episode,
    ) -> Progress {
        debug_assert!(self.training);
        if episode.max_step() > 0 {
            episode.add_reward(-1.0 / episode.max_step() as f64);
        }

        if episode.step_count() > progress.step_deadline {
            episode.add_reward(self.rewards.timeout_penalty);
            episode.end(EpisodeEnd::Timeout);
            return progress;
        }

        if within_radius(to_target, radius) {
            log::debug!("within checkpoint radius {radius}");
            return self.advance(progress, episode);
        }

        progress
    }

    pub fn crash(&self, episode: &mut Episode) {
        if self.training {
            episode.add_reward(self.rewards.crash_penalty);
            episode.end(EpisodeEnd::Crash);
        }
    }
}

pub fn within_radius(to_target: &Vector3<f64>, radius: f64) -> bool {
    to_target.norm() < radius
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::point;
    use test_log::test;

    fn sequence(n: usize) -> CheckpointSequence {
        CheckpointSequence::new(
            (0..n)
                .map(|i| Checkpoint {
                    position: point![0.0, 0.0, i as f64 * 100.0],
                    rotation: UnitQuaternion::identity(),
                    finish: i == n - 1,
                })
                .collect(),
        )
    }

    #[test]
    fn test_indices_wrap() {
        let checkpoints = sequence(4);
        assert_eq!(checkpoints.next_index(3), 0);
        assert_eq!(checkpoints.previous_index(0), 3);
        assert_eq!(checkpoints.previous_index(2), 1);
        assert_eq!(checkpoints.get(5).position, point![0.0, 0.0, 100.0]);
        assert_eq!(checkpoints.finish_index(), 3);
    }

    #[test]
    fn test_single_checkpoint() {
        let checkpoints = sequence(1);
        assert_eq!(checkpoints.next_index(0), 0);
        assert_eq!(checkpoints.previous_index(0), 0);
        assert!(checkpoints.get(0).finish);
    }

    #[test]
    #[should_panic(expected = "Checkpoint sequence is empty")]
    fn test_empty() {
        CheckpointSequence::new(vec![]);
    }

    #[test]
    fn test_within_radius() {
        assert!(within_radius(&Vector3::new(3.0, 4.0, 0.0), 5.1));
        assert!(!within_radius(&Vector3::new(3.0, 4.0, 0.0), 5.0));
        assert!(!within_radius(&Vector3::zeros(), 0.0));
    }
}
