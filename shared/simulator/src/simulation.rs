use crate::agent::{Agent, AgentContext, AircraftAgent, Contact, Mode};
use crate::area::RaceArea;
use crate::collision;
use crate::config::SimConfig;
use crate::episode::{EnvironmentParameters, EpisodeSummary};
use crate::flight::TickTiming;
use crate::physics::RapierBody;
use crate::scenario::{self, Scenario};
use crate::snapshot::*;
use crossbeam::channel::Sender;
use instant::Instant;
use nalgebra::{Isometry3, Vector3};
use rapier3d_f64::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use wingdash_api::{ActionSource, DiscreteActions, Observation};

pub const PHYSICS_TICK_LENGTH: f64 = 1.0 / 60.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

struct AgentSlot {
    agent: AircraftAgent,
    body: RigidBodyHandle,
    collider: ColliderHandle,
    source: Box<dyn ActionSource>,
    observation: Observation,
    actions: DiscreteActions,
}

pub struct Simulation {
    scenario: Option<Box<dyn Scenario>>,
    area: RaceArea,
    agents: BTreeMap<AgentId, AgentSlot>,
    next_agent_id: u32,
    pub(crate) agent_colliders: HashMap<ColliderHandle, AgentId>,
    pub(crate) checkpoint_sensors: HashMap<ColliderHandle, usize>,
    pub(crate) bodies: RigidBodySet,
    pub(crate) impulse_joints: ImpulseJointSet,
    pub(crate) multibody_joints: MultibodyJointSet,
    pub(crate) colliders: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    pub(crate) island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    event_collector: CollisionEventHandler,
    contact_recv: crossbeam::channel::Receiver<CollisionEvent>,
    events: SimEvents,
    params: EnvironmentParameters,
    config: SimConfig,
    mode: Mode,
    tick: u32,
    seed: u32,
    timing: Timing,
    tick_timing: TickTiming,
}

impl Simulation {
    pub fn new(scenario_name: &str, seed: u32, config: &SimConfig) -> Box<Simulation> {
        log::info!("seed {seed}");
        let mut scenario = scenario::load(scenario_name);
        let area = RaceArea::new(Box::new(scenario.course()), config.area.clone(), seed);
        let (contact_send, contact_recv) = crossbeam::channel::unbounded();
        let mut sim = Box::new(Simulation {
            scenario: None,
            area,
            agents: BTreeMap::new(),
            next_agent_id: 0,
            agent_colliders: HashMap::new(),
            checkpoint_sensors: HashMap::new(),
            bodies: RigidBodySet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            colliders: ColliderSet::new(),
            integration_parameters: IntegrationParameters {
                dt: PHYSICS_TICK_LENGTH,
                max_ccd_substeps: 2,
                ..Default::default()
            },
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            event_collector: CollisionEventHandler::new(contact_send),
            contact_recv,
            events: SimEvents::new(),
            params: EnvironmentParameters::new(),
            config: config.clone(),
            mode: scenario.mode(),
            tick: 0,
            seed,
            timing: Default::default(),
            tick_timing: TickTiming::fixed(PHYSICS_TICK_LENGTH),
        });

        let radius = sim.config.area.checkpoint_trigger_radius;
        let positions: Vec<_> = sim
            .area
            .checkpoints()
            .iter()
            .map(|checkpoint| checkpoint.position)
            .collect();
        for (index, position) in positions.into_iter().enumerate() {
            collision::add_checkpoint_sensor(&mut sim, index, position, radius);
        }

        scenario.init(&mut sim, seed);
        sim.scenario = Some(scenario);

        sim
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.tick as f64 * PHYSICS_TICK_LENGTH
    }

    /// Wall-clock seconds spent in each phase of the last step.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn area(&self) -> &RaceArea {
        &self.area
    }

    pub fn status(&self) -> scenario::Status {
        match self.scenario.as_ref() {
            Some(scenario) => scenario.status(self),
            None => scenario::Status::Running,
        }
    }

    pub fn environment_parameters(&self) -> &EnvironmentParameters {
        &self.params
    }

    pub fn environment_parameters_mut(&mut self) -> &mut EnvironmentParameters {
        &mut self.params
    }

    /// Frame step used by yaw and roll smoothing. Defaults to the physics step.
    pub fn set_frame_dt(&mut self, frame_dt: f64) {
        self.tick_timing.frame_dt = frame_dt;
    }

    /// Adds an aircraft at the origin. It is placed on the course when its
    /// first episode begins, at the start of the next step.
    pub fn add_agent(&mut self, source: Box<dyn ActionSource>) -> AgentId {
        let aircraft = &self.config.aircraft;
        let [hx, hy, hz] = aircraft.half_extents;
        let rigid_body = RigidBodyBuilder::dynamic()
            .linear_damping(aircraft.linear_damping)
            .angular_damping(aircraft.angular_damping)
            .ccd_enabled(true)
            .build();
        let body_handle = self.bodies.insert(rigid_body);
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .density(aircraft.density)
            .collision_groups(collision::agent_interaction_groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        self.agent_colliders.insert(collider_handle, id);
        self.agents.insert(
            id,
            AgentSlot {
                agent: AircraftAgent::new(self.mode, &self.config),
                body: body_handle,
                collider: collider_handle,
                source,
                observation: Observation::default(),
                actions: DiscreteActions::HOLD,
            },
        );
        self.with_agent(id, |agent, ctx| agent.initialize(ctx));
        id
    }

    /// Removes an aircraft. A crash recovery in progress is dropped with it.
    pub fn remove_agent(&mut self, id: AgentId) {
        if let Some(mut slot) = self.agents.remove(&id) {
            slot.agent.cancel_recovery();
            self.agent_colliders.remove(&slot.collider);
            self.bodies.remove(
                slot.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
            self.area.unregister_agent(slot.agent.rank());
        }
    }

    pub fn set_action_source(&mut self, id: AgentId, source: Box<dyn ActionSource>) {
        if let Some(slot) = self.agents.get_mut(&id) {
            slot.source = source;
        }
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn agent(&self, id: AgentId) -> Option<&AircraftAgent> {
        self.agents.get(&id).map(|slot| &slot.agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &AircraftAgent)> {
        self.agents.iter().map(|(id, slot)| (*id, &slot.agent))
    }

    pub fn body(&self, id: AgentId) -> Option<&RigidBody> {
        self.agents
            .get(&id)
            .and_then(|slot| self.bodies.get(slot.body))
    }

    pub fn agent_pose(&self, id: AgentId) -> Option<Isometry3<f64>> {
        self.body(id).map(|body| *body.position())
    }

    pub fn set_agent_pose(&mut self, id: AgentId, pose: &Isometry3<f64>) {
        if let Some(slot) = self.agents.get(&id) {
            if let Some(body) = self.bodies.get_mut(slot.body) {
                body.set_position(*pose, true);
            }
        }
    }

    pub fn set_agent_velocity(&mut self, id: AgentId, velocity: Vector3<f64>) {
        if let Some(slot) = self.agents.get(&id) {
            if let Some(body) = self.bodies.get_mut(slot.body) {
                body.set_linvel(velocity, true);
            }
        }
    }

    /// Observation the agent acted on in the last step.
    pub fn last_observation(&self, id: AgentId) -> Option<Observation> {
        self.agents.get(&id).map(|slot| slot.observation)
    }

    pub fn last_actions(&self, id: AgentId) -> Option<DiscreteActions> {
        self.agents.get(&id).map(|slot| slot.actions)
    }

    /// Runs `f` with the agent and a context over its rapier body.
    pub fn with_agent<R>(
        &mut self,
        id: AgentId,
        f: impl FnOnce(&mut AircraftAgent, &mut AgentContext) -> R,
    ) -> Option<R> {
        self.with_slot(id, |slot, ctx| f(&mut slot.agent, ctx))
    }

    fn with_slot<R>(
        &mut self,
        id: AgentId,
        f: impl FnOnce(&mut AgentSlot, &mut AgentContext) -> R,
    ) -> Option<R> {
        let slot = self.agents.get_mut(&id)?;
        let body = self.bodies.get_mut(slot.body)?;
        let mut body = RapierBody::new(body);
        let mut ctx = AgentContext {
            body: &mut body,
            area: &mut self.area,
            params: &self.params,
            timing: self.tick_timing,
        };
        Some(f(slot, &mut ctx))
    }

    pub(crate) fn agent_collision(&mut self, id: AgentId, contact: Contact) {
        let crashed = self
            .with_agent(id, |agent, ctx| agent.on_collision(contact, ctx))
            .unwrap_or(false);
        if crashed {
            self.events.crashes.push(id);
        }
    }

    pub(crate) fn agent_trigger_enter(&mut self, id: AgentId, index: usize) {
        if let Some(slot) = self.agents.get_mut(&id) {
            let before = slot.agent.progress();
            slot.agent.on_trigger_enter(index, &self.area);
            self.events
                .record_progress(id, before, slot.agent.progress());
        }
    }

    pub fn step(&mut self) {
        self.events.clear();
        let ids = self.agent_ids();

        let agents_start_time = Instant::now();
        for &id in ids.iter() {
            let summary = self.with_agent(id, |agent, ctx| {
                if !agent.episode().needs_begin() {
                    return None;
                }
                let summary = agent.episode_mut().begin();
                if let Some(summary) = summary.as_ref() {
                    log::info!(
                        "agent {} episode {} ended: {:?} after {} steps, reward {:.3}",
                        agent.rank(),
                        summary.number,
                        summary.end,
                        summary.steps,
                        summary.reward
                    );
                }
                agent.on_episode_begin(ctx);
                summary
            });
            if let Some(Some(summary)) = summary {
                self.events.episodes.push((id, summary));
            }
        }

        for slot in self.agents.values() {
            if let Some(body) = self.bodies.get_mut(slot.body) {
                body.reset_forces(false);
            }
        }

        for &id in ids.iter() {
            let progress = self.with_slot(id, |slot, ctx| {
                let before = slot.agent.progress();
                slot.agent.begin_step();
                let observation = slot.agent.collect_observations(ctx);
                let actions = slot.source.act(&observation);
                slot.observation = observation;
                slot.actions = actions;
                slot.agent.on_action_received(actions, ctx);
                (before, slot.agent.progress())
            });
            if let Some((before, after)) = progress {
                self.events.record_progress(id, before, after);
            }
        }

        for &id in ids.iter() {
            self.with_agent(id, |agent, ctx| agent.tick_recovery(ctx));
        }
        self.timing.agents = (Instant::now() - agents_start_time).as_secs_f64();

        let physics_start_time = Instant::now();
        let gravity = vector![0.0, 0.0, 0.0];
        let physics_hooks = ();
        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &self.event_collector,
        );
        self.timing.physics = (Instant::now() - physics_start_time).as_secs_f64();

        let collision_start_time = Instant::now();
        let collision_events: Vec<CollisionEvent> = self.contact_recv.try_iter().collect();
        collision::handle_collisions(self, &collision_events);
        for slot in self.agents.values_mut() {
            slot.agent.end_step();
        }
        self.timing.collision = (Instant::now() - collision_start_time).as_secs_f64();

        let scenario_start_time = Instant::now();
        let mut scenario = std::mem::take(&mut self.scenario);
        if let Some(scenario) = scenario.as_mut() {
            scenario.tick(self);
        }
        self.scenario = scenario;
        self.timing.scenario = (Instant::now() - scenario_start_time).as_secs_f64();

        self.tick += 1;
    }

    pub fn events(&self) -> &SimEvents {
        &self.events
    }

    pub fn hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher;
        let fixedpoint = |v: f64| (v * 1e9) as i64;
        let mut s = DefaultHasher::new();
        for (id, slot) in self.agents.iter() {
            s.write_u32(id.0);
            if let Some(body) = self.bodies.get(slot.body) {
                let position = body.position();
                for v in position.translation.vector.iter() {
                    s.write_i64(fixedpoint(*v));
                }
                for v in position.rotation.coords.iter() {
                    s.write_i64(fixedpoint(*v));
                }
                for v in body.linvel().iter().chain(body.angvel().iter()) {
                    s.write_i64(fixedpoint(*v));
                }
            }
            let progress = slot.agent.progress();
            s.write_usize(progress.next_checkpoint);
            s.write_u32(progress.laps);
            s.write_i64(fixedpoint(slot.agent.episode().cumulative_reward()));
        }
        s.finish()
    }

    pub fn snapshot(&self, nonce: u32) -> Snapshot {
        let mut snapshot = Snapshot {
            nonce,
            tick: self.tick,
            time: self.time(),
            status: self.status(),
            mode: self.mode,
            agents: vec![],
            checkpoints: self.area.checkpoints().iter().cloned().collect(),
            timing: self.timing.clone(),
        };
        for (&id, slot) in self.agents.iter() {
            let body = match self.bodies.get(slot.body) {
                Some(body) => body,
                None => continue,
            };
            let agent = &slot.agent;
            snapshot.agents.push(AgentSnapshot {
                id,
                rank: agent.rank(),
                position: body.position().translation.vector.into(),
                rotation: body.position().rotation,
                velocity: *body.linvel(),
                progress: agent.progress(),
                frozen: agent.is_frozen(),
                visuals: *agent.visuals(),
                episode: agent.episode().number(),
                reward: agent.episode().cumulative_reward(),
            });
        }
        snapshot
    }
}

pub struct CollisionEventHandler {
    collision_event_sender: Sender<CollisionEvent>,
}

impl CollisionEventHandler {
    pub fn new(collision_event_sender: Sender<CollisionEvent>) -> CollisionEventHandler {
        CollisionEventHandler {
            collision_event_sender,
        }
    }
}

impl EventHandler for CollisionEventHandler {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let _ = self.collision_event_sender.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _: f64,
        _: &RigidBodySet,
        _: &ColliderSet,
        _: &ContactPair,
        _: f64,
    ) {
    }
}

/// Things that happened during the last step.
#[derive(Default, Debug, Clone)]
pub struct SimEvents {
    /// Episodes that ended before this step, with their summaries.
    pub episodes: Vec<(AgentId, EpisodeSummary)>,
    /// Checkpoints reached, by index.
    pub checkpoints: Vec<(AgentId, usize)>,
    pub laps: Vec<(AgentId, u32)>,
    pub crashes: Vec<AgentId>,
}

impl SimEvents {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.episodes.clear();
        self.checkpoints.clear();
        self.laps.clear();
        self.crashes.clear();
    }

    fn record_progress(
        &mut self,
        id: AgentId,
        before: crate::checkpoint::Progress,
        after: crate::checkpoint::Progress,
    ) {
        if before.next_checkpoint != after.next_checkpoint {
            self.checkpoints.push((id, before.next_checkpoint));
        }
        if after.laps > before.laps {
            self.laps.push((id, after.laps));
        }
    }
}
