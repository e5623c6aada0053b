use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d_f64::prelude::*;

/// The rigid body an aircraft flies.
///
/// Forces added with [`PhysicsBody::add_force`] act for the coming tick only.
pub trait PhysicsBody {
    fn position(&self) -> Point3<f64>;
    fn rotation(&self) -> UnitQuaternion<f64>;
    fn set_position(&mut self, position: Point3<f64>);
    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>);
    fn velocity(&self) -> Vector3<f64>;
    fn set_velocity(&mut self, velocity: Vector3<f64>);
    fn angular_velocity(&self) -> Vector3<f64>;
    fn set_angular_velocity(&mut self, angular_velocity: Vector3<f64>);
    fn add_force(&mut self, force: Vector3<f64>);
    fn sleep(&mut self);
    fn wake_up(&mut self);
    fn is_sleeping(&self) -> bool;

    fn pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position().coords), self.rotation())
    }

    fn set_pose(&mut self, pose: &Isometry3<f64>) {
        self.set_position(Point3::from(pose.translation.vector));
        self.set_rotation(pose.rotation);
    }

    fn forward(&self) -> Vector3<f64> {
        self.rotation() * Vector3::z()
    }

    /// Expresses a world direction in the body's local frame.
    fn inverse_transform_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.rotation().inverse_transform_vector(direction)
    }
}

/// A body that only records what is done to it. Nothing is integrated.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryBody {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
    pub force: Vector3<f64>,
    pub sleeping: bool,
}

impl MemoryBody {
    pub fn new(position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            rotation,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            force: Vector3::zeros(),
            sleeping: false,
        }
    }

    pub fn reset_forces(&mut self) {
        self.force = Vector3::zeros();
    }
}

impl Default for MemoryBody {
    fn default() -> Self {
        MemoryBody::new(Point3::origin(), UnitQuaternion::identity())
    }
}

impl PhysicsBody for MemoryBody {
    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vector3<f64>) {
        self.angular_velocity = angular_velocity;
    }

    fn add_force(&mut self, force: Vector3<f64>) {
        self.force += force;
    }

    fn sleep(&mut self) {
        self.sleeping = true;
        self.velocity = Vector3::zeros();
        self.angular_velocity = Vector3::zeros();
    }

    fn wake_up(&mut self) {
        self.sleeping = false;
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

/// A rapier rigid body. Setters never wake a sleeping body, only
/// [`PhysicsBody::wake_up`] and [`PhysicsBody::add_force`] do.
pub struct RapierBody<'a> {
    body: &'a mut RigidBody,
}

impl<'a> RapierBody<'a> {
    pub fn new(body: &'a mut RigidBody) -> Self {
        Self { body }
    }
}

impl PhysicsBody for RapierBody<'_> {
    fn position(&self) -> Point3<f64> {
        Point3::from(*self.body.translation())
    }

    fn rotation(&self) -> UnitQuaternion<f64> {
        *self.body.rotation()
    }

    fn set_position(&mut self, position: Point3<f64>) {
        let rotation = *self.body.rotation();
        self.body.set_position(
            Isometry3::from_parts(Translation3::from(position.coords), rotation),
            false,
        );
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        let translation = Translation3::from(*self.body.translation());
        self.body
            .set_position(Isometry3::from_parts(translation, rotation), false);
    }

    fn velocity(&self) -> Vector3<f64> {
        *self.body.linvel()
    }

    fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.body.set_linvel(velocity, false);
    }

    fn angular_velocity(&self) -> Vector3<f64> {
        *self.body.angvel()
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vector3<f64>) {
        self.body.set_angvel(angular_velocity, false);
    }

    fn add_force(&mut self, force: Vector3<f64>) {
        self.body.add_force(force, true);
    }

    fn sleep(&mut self) {
        self.body.sleep();
    }

    fn wake_up(&mut self) {
        self.body.wake_up(true);
    }

    fn is_sleeping(&self) -> bool {
        self.body.is_sleeping()
    }

    fn set_pose(&mut self, pose: &Isometry3<f64>) {
        self.body.set_position(*pose, false);
    }
}
