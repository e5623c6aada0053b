use crate::agent::Contact;
use crate::simulation::{AgentId, Simulation};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d_f64::prelude::*;

const AGENT_COLLISION_GROUP: Group = Group::GROUP_1;
const OBSTACLE_COLLISION_GROUP: Group = Group::GROUP_2;
const CHECKPOINT_COLLISION_GROUP: Group = Group::GROUP_3;

pub fn agent_interaction_groups() -> InteractionGroups {
    InteractionGroups::new(
        AGENT_COLLISION_GROUP,
        AGENT_COLLISION_GROUP | OBSTACLE_COLLISION_GROUP | CHECKPOINT_COLLISION_GROUP,
    )
}

pub fn obstacle_interaction_groups() -> InteractionGroups {
    InteractionGroups::new(OBSTACLE_COLLISION_GROUP, AGENT_COLLISION_GROUP)
}

pub fn checkpoint_interaction_groups() -> InteractionGroups {
    InteractionGroups::new(CHECKPOINT_COLLISION_GROUP, AGENT_COLLISION_GROUP)
}

#[derive(Copy, Clone, Debug, Ord, Eq, PartialOrd, PartialEq)]
enum Collider {
    Agent(AgentId),
    Checkpoint(usize),
    Obstacle,
}

fn classify(sim: &Simulation, handle: ColliderHandle) -> Option<Collider> {
    sim.colliders.get(handle)?;
    Some(if let Some(&id) = sim.agent_colliders.get(&handle) {
        Collider::Agent(id)
    } else if let Some(&index) = sim.checkpoint_sensors.get(&handle) {
        Collider::Checkpoint(index)
    } else {
        Collider::Obstacle
    })
}

pub fn handle_collisions(sim: &mut Simulation, events: &[CollisionEvent]) {
    for event in events {
        if let CollisionEvent::Started(h1, h2, _flags) = event {
            if let (Some(c1), Some(c2)) = (classify(sim, *h1), classify(sim, *h2)) {
                let mut colliders = [c1, c2];
                colliders.sort();
                match colliders {
                    [Collider::Agent(a), Collider::Agent(b)] => {
                        sim.agent_collision(a, Contact::Agent);
                        sim.agent_collision(b, Contact::Agent);
                    }
                    [Collider::Agent(a), Collider::Checkpoint(index)] => {
                        sim.agent_trigger_enter(a, index);
                    }
                    [Collider::Agent(a), Collider::Obstacle] => {
                        sim.agent_collision(a, Contact::Obstacle);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Adds a fixed box centered at `position`.
pub fn add_obstacle(
    sim: &mut Simulation,
    position: Point3<f64>,
    rotation: UnitQuaternion<f64>,
    half_extents: Vector3<f64>,
) -> ColliderHandle {
    let rigid_body = RigidBodyBuilder::fixed()
        .position(Isometry3::from_parts(
            Translation3::from(position.coords),
            rotation,
        ))
        .build();
    let body_handle = sim.bodies.insert(rigid_body);
    let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        .collision_groups(obstacle_interaction_groups())
        .build();
    sim.colliders
        .insert_with_parent(collider, body_handle, &mut sim.bodies)
}

/// A slab whose top face is the plane y = `height`.
pub fn add_ground(sim: &mut Simulation, height: f64) -> ColliderHandle {
    let size = 10000.0;
    let thickness = 10.0;
    add_obstacle(
        sim,
        Point3::new(0.0, height - thickness, 0.0),
        UnitQuaternion::identity(),
        Vector3::new(size, thickness, size),
    )
}

/// A spherical trigger volume for checkpoint `index`.
pub fn add_checkpoint_sensor(
    sim: &mut Simulation,
    index: usize,
    position: Point3<f64>,
    radius: f64,
) -> ColliderHandle {
    let collider = ColliderBuilder::ball(radius)
        .translation(position.coords)
        .sensor(true)
        .collision_groups(checkpoint_interaction_groups())
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
    let handle = sim.colliders.insert(collider);
    sim.checkpoint_sensors.insert(handle, index);
    handle
}
