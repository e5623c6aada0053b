//! Turns decoded control input into thrust and attitude.
use crate::attitude::{normalize_degrees, EulerAngles};
use crate::physics::PhysicsBody;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use wingdash_api::ControlInput;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Forward force in newtons.
    pub thrust: f64,
    /// Degrees per second at full pitch input.
    pub pitch_speed: f64,
    pub yaw_speed: f64,
    pub roll_speed: f64,
    pub boost_multiplier: f64,
    pub max_pitch_angle: f64,
    pub max_roll_angle: f64,
    /// Control units per second the smoothed controls move toward their targets.
    pub smoothing_rate: f64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            thrust: 1e6,
            pitch_speed: 100.0,
            yaw_speed: 100.0,
            roll_speed: 100.0,
            boost_multiplier: 2.0,
            max_pitch_angle: 45.0,
            max_roll_angle: 120.0,
            smoothing_rate: 2.0,
        }
    }
}

/// Smoothed control values carried from one tick to the next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Step lengths in seconds.
///
/// Pitch smoothing and all angle integration use the fixed physics step. Yaw
/// and roll smoothing use the frame step.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickTiming {
    pub fixed_dt: f64,
    pub frame_dt: f64,
}

impl TickTiming {
    pub fn fixed(dt: f64) -> Self {
        Self {
            fixed_dt: dt,
            frame_dt: dt,
        }
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

#[derive(Clone, Debug, Default)]
pub struct FlightController {
    config: FlightConfig,
}

impl FlightController {
    pub fn new(config: FlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Magnitude of the forward force for this input.
    pub fn thrust(&self, input: &ControlInput) -> f64 {
        let boost = if input.boost {
            self.config.boost_multiplier
        } else {
            1.0
        };
        self.config.thrust * boost
    }

    /// Banking follows turning. With no yaw input the aircraft levels its
    /// wings in proportion to the current roll angle.
    pub fn target_roll(&self, yaw: f64, current_roll: f64) -> f64 {
        if yaw == 0.0 {
            -normalize_degrees(current_roll) / self.config.max_roll_angle
        } else {
            -yaw
        }
    }

    pub fn smooth(
        &self,
        controls: ControlState,
        target: ControlState,
        timing: TickTiming,
    ) -> ControlState {
        let rate = self.config.smoothing_rate;
        ControlState {
            pitch: move_towards(controls.pitch, target.pitch, rate * timing.fixed_dt),
            yaw: move_towards(controls.yaw, target.yaw, rate * timing.frame_dt),
            roll: move_towards(controls.roll, target.roll, rate * timing.frame_dt),
        }
    }

    /// Integrates the smoothed controls over one step. Pitch and roll come out
    /// clamped to their limits, yaw is free.
    ///
    /// The roll accumulator starts from the pitch reading, not the roll reading.
    pub fn integrate(&self, current: EulerAngles, controls: &ControlState, dt: f64) -> EulerAngles {
        let c = &self.config;
        let pitch = normalize_degrees(current.pitch + c.pitch_speed * controls.pitch * dt)
            .clamp(-c.max_pitch_angle, c.max_pitch_angle);
        let yaw = current.yaw + c.yaw_speed * controls.yaw * dt;
        let roll = normalize_degrees(current.pitch + c.roll_speed * controls.roll * dt)
            .clamp(-c.max_roll_angle, c.max_roll_angle);
        EulerAngles { pitch, yaw, roll }
    }

    /// Applies one tick of input to the body and returns the new smoothed
    /// controls. Thrust acts along the body's nose; attitude is overwritten.
    pub fn process(
        &self,
        controls: ControlState,
        input: &ControlInput,
        body: &mut dyn PhysicsBody,
        timing: TickTiming,
    ) -> ControlState {
        let rotation = body.rotation();
        body.add_force(rotation * Vector3::z() * self.thrust(input));

        let current = EulerAngles::from_rotation(&rotation);
        let target = ControlState {
            pitch: input.pitch,
            yaw: input.yaw,
            roll: self.target_roll(input.yaw, current.roll),
        };
        let controls = self.smooth(controls, target, timing);
        let angles = self.integrate(current, &controls, timing.fixed_dt);
        body.set_rotation(angles.to_rotation());
        controls
    }
}
