use crate::{ActionSource, DiscreteActions, Observation};
use serde::{Deserialize, Serialize};

/// Axis readings from an input device, nominally in [-1, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputAxes {
    /// Positive pushes the nose down, like a stick pushed forward.
    pub pitch: f64,
    /// Positive turns right.
    pub yaw: f64,
    /// Anything above one half counts as pressed.
    pub boost: f64,
}

/// A keyboard, gamepad or anything else a person steers with.
pub trait InputDevice {
    /// Reads the current axis values.
    fn read(&mut self) -> InputAxes;
}

impl<F> InputDevice for F
where
    F: FnMut() -> InputAxes,
{
    fn read(&mut self) -> InputAxes {
        self()
    }
}

/// Maps device axes onto the discrete action branches.
///
/// Each axis is rounded to the nearest integer (ties to even) and -1 becomes
/// branch value 2.
pub fn heuristic(axes: &InputAxes) -> DiscreteActions {
    let encode = |v: f64| {
        let v = v.clamp(-1.0, 1.0).round_ties_even() as i32;
        if v == -1 {
            2
        } else {
            v
        }
    };
    DiscreteActions {
        pitch: encode(axes.pitch),
        yaw: encode(axes.yaw),
        boost: axes.boost.clamp(0.0, 1.0).round_ties_even() as i32,
    }
}

/// Flies an aircraft from an [`InputDevice`].
pub struct PlayerController<D> {
    device: D,
}

impl<D: InputDevice> PlayerController<D> {
    /// Wraps a device.
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Returns the wrapped device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: InputDevice> ActionSource for PlayerController<D> {
    fn act(&mut self, _: &Observation) -> DiscreteActions {
        heuristic(&self.device.read())
    }
}
