use serde::{Deserialize, Serialize};

/// Number of discrete action branches.
pub const NUM_BRANCHES: usize = 3;

/// Number of values each branch accepts: pitch, yaw, boost.
pub const BRANCH_SIZES: [i32; NUM_BRANCHES] = [3, 3, 2];

/// One decision, as produced by a policy.
///
/// | branch | 0    | 1         | 2       |
/// |--------|------|-----------|---------|
/// | pitch  | hold | nose down | nose up |
/// | yaw    | hold | right     | left    |
/// | boost  | off  | on        |         |
///
/// Values outside these ranges are a broken action source, not something the
/// aircraft tries to make sense of.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteActions {
    /// Pitch branch.
    pub pitch: i32,
    /// Yaw branch.
    pub yaw: i32,
    /// Boost branch.
    pub boost: i32,
}

/// Control input decoded from [`DiscreteActions`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// -1, 0 or 1.
    pub pitch: f64,
    /// -2, 0 or 1. Left turns are driven twice as hard as right turns.
    pub yaw: f64,
    /// Whether the boost multiplier applies to thrust.
    pub boost: bool,
}

impl DiscreteActions {
    /// Hold course, no boost.
    pub const HOLD: DiscreteActions = DiscreteActions {
        pitch: 0,
        yaw: 0,
        boost: 0,
    };

    /// Creates a set of actions from raw branch values.
    pub fn new(pitch: i32, yaw: i32, boost: i32) -> Self {
        Self { pitch, yaw, boost }
    }

    /// Returns the branch values in branch order.
    pub fn branches(&self) -> [i32; NUM_BRANCHES] {
        [self.pitch, self.yaw, self.boost]
    }

    /// Returns true if every branch holds a value it accepts.
    pub fn is_valid(&self) -> bool {
        self.branches()
            .iter()
            .zip(BRANCH_SIZES.iter())
            .all(|(&v, &size)| (0..size).contains(&v))
    }

    /// Decodes the branches into control input.
    pub fn decode(&self) -> ControlInput {
        debug_assert!(self.is_valid(), "invalid actions {self:?}");
        let pitch = match self.pitch {
            2 => -1.0,
            v => v as f64,
        };
        let yaw = match self.yaw {
            2 => -2.0,
            v => v as f64,
        };
        ControlInput {
            pitch,
            yaw,
            boost: self.boost == 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_decode() {
        assert_eq!(
            DiscreteActions::new(0, 0, 0).decode(),
            ControlInput {
                pitch: 0.0,
                yaw: 0.0,
                boost: false
            }
        );
        assert_eq!(
            DiscreteActions::new(1, 1, 1).decode(),
            ControlInput {
                pitch: 1.0,
                yaw: 1.0,
                boost: true
            }
        );
        assert_eq!(
            DiscreteActions::new(2, 2, 0).decode(),
            ControlInput {
                pitch: -1.0,
                yaw: -2.0,
                boost: false
            }
        );
    }

    #[test]
    fn test_validity() {
        assert!(DiscreteActions::HOLD.is_valid());
        assert!(DiscreteActions::new(2, 2, 1).is_valid());
        assert!(!DiscreteActions::new(3, 0, 0).is_valid());
        assert!(!DiscreteActions::new(0, 0, 2).is_valid());
        assert!(!DiscreteActions::new(0, -1, 0).is_valid());
    }
}
