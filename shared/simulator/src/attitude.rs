//! Euler-angle attitude, in degrees, composed yaw then pitch then roll.
//!
//! The aircraft frame has x along the right wing, y up and z along the nose.
//! Positive pitch lowers the nose, positive yaw turns it right and positive
//! roll raises the right wing.
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Wraps an angle into (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl EulerAngles {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Reads the angles of a rotation. Each angle is in [0, 360).
    pub fn from_rotation(rotation: &UnitQuaternion<f64>) -> Self {
        let m = rotation.to_rotation_matrix();
        let m = m.matrix();
        let sin_pitch = (-m[(1, 2)]).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();
        let (yaw, roll) = if pitch.cos() > 1e-6 {
            (m[(0, 2)].atan2(m[(2, 2)]), m[(1, 0)].atan2(m[(1, 1)]))
        } else {
            // Gimbal lock, attribute all heading to yaw.
            ((-m[(2, 0)]).atan2(m[(0, 0)]), 0.0)
        };
        let wrap = |radians: f64| radians.to_degrees().rem_euclid(360.0);
        Self {
            pitch: wrap(pitch),
            yaw: wrap(yaw),
            roll: wrap(roll),
        }
    }

    pub fn to_rotation(&self) -> UnitQuaternion<f64> {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll.to_radians());
        yaw * pitch * roll
    }

    pub fn normalized(&self) -> Self {
        Self {
            pitch: normalize_degrees(self.pitch),
            yaw: normalize_degrees(self.yaw),
            roll: normalize_degrees(self.roll),
        }
    }
}
