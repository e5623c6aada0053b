use crate::DiscreteActions;
use serde::{Deserialize, Serialize};

/// Number of scalar values in an [`Observation`].
pub const OBSERVATION_SIZE: usize = 9;

/// What an aircraft reports about itself each tick.
///
/// All three vectors are expressed in the aircraft's local frame: x is the
/// right wing, y is up, z is the nose.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Linear velocity.
    pub velocity: [f64; 3],
    /// Offset from the aircraft to the checkpoint it is heading for.
    pub to_next_checkpoint: [f64; 3],
    /// Forward direction of that checkpoint.
    pub next_checkpoint_forward: [f64; 3],
}

impl Observation {
    /// Flattens the observation in the order velocity, offset, forward.
    pub fn to_array(&self) -> [f64; OBSERVATION_SIZE] {
        let mut values = [0.0; OBSERVATION_SIZE];
        values[0..3].copy_from_slice(&self.velocity);
        values[3..6].copy_from_slice(&self.to_next_checkpoint);
        values[6..9].copy_from_slice(&self.next_checkpoint_forward);
        values
    }
}

/// Produces one set of actions per tick.
pub trait ActionSource {
    /// Chooses the actions for the coming tick.
    fn act(&mut self, observation: &Observation) -> DiscreteActions;
}

impl<F> ActionSource for F
where
    F: FnMut(&Observation) -> DiscreteActions,
{
    fn act(&mut self, observation: &Observation) -> DiscreteActions {
        self(observation)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_to_array() {
        let obs = Observation {
            velocity: [1.0, 2.0, 3.0],
            to_next_checkpoint: [4.0, 5.0, 6.0],
            next_checkpoint_forward: [7.0, 8.0, 9.0],
        };
        assert_eq!(
            obs.to_array(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_closure_source() {
        let mut calls = 0;
        let mut source = |_: &Observation| {
            calls += 1;
            DiscreteActions::new(1, 0, 1)
        };
        assert_eq!(
            source.act(&Observation::default()),
            DiscreteActions::new(1, 0, 1)
        );
        assert_eq!(calls, 1);
    }
}
