//! Aircraft agents: flight, checkpoint progress, resets and crash recovery.
use crate::area::RaceArea;
use crate::checkpoint::{CheckpointTracker, Progress, RewardConfig};
use crate::config::SimConfig;
use crate::episode::{EnvironmentParameters, Episode};
use crate::flight::{ControlState, FlightController, TickTiming};
use crate::physics::PhysicsBody;
use crate::recovery::{CrashRecovery, RecoveryPhase, RecoveryStep};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use wingdash_api::{DiscreteActions, Observation};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Episodes with rewards, timeouts and randomized starts.
    Training,
    /// A race. Crashes are recovered from instead of ending the episode.
    Racing,
}

/// What a renderer should show for an agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visuals {
    pub trail_emitting: bool,
    /// Incremented whenever the trail is wiped.
    pub trail_clears: u32,
    pub mesh_visible: bool,
    pub explosion_visible: bool,
}

impl Default for Visuals {
    fn default() -> Self {
        Self {
            trail_emitting: false,
            trail_clears: 0,
            mesh_visible: true,
            explosion_visible: false,
        }
    }
}

impl Visuals {
    fn clear_trail(&mut self) {
        self.trail_emitting = false;
        self.trail_clears += 1;
    }
}

/// Everything an agent touches outside itself during a callback.
pub struct AgentContext<'a> {
    pub body: &'a mut dyn PhysicsBody,
    pub area: &'a mut RaceArea,
    pub params: &'a EnvironmentParameters,
    pub timing: TickTiming,
}

/// Lifecycle callbacks driven by the simulation loop.
pub trait Agent {
    /// Called once, when the agent joins the area.
    fn initialize(&mut self, ctx: &mut AgentContext);

    fn on_episode_begin(&mut self, ctx: &mut AgentContext);

    fn collect_observations(&self, ctx: &AgentContext) -> Observation;

    /// Called once per physics tick with the actions chosen for it.
    fn on_action_received(&mut self, actions: DiscreteActions, ctx: &mut AgentContext);
}

/// Per-agent state carried between ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub progress: Progress,
    pub controls: ControlState,
    pub frozen: bool,
}

/// What an aircraft ran into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Contact {
    Agent,
    Obstacle,
}

fn tracker<'a>(
    area: &'a RaceArea,
    rewards: &'a RewardConfig,
    mode: Mode,
) -> CheckpointTracker<'a> {
    CheckpointTracker::new(area.checkpoints(), rewards, mode == Mode::Training)
}

pub struct AircraftAgent {
    rank: usize,
    mode: Mode,
    state: AgentState,
    episode: Episode,
    controller: FlightController,
    rewards: RewardConfig,
    recovery: CrashRecovery,
    visuals: Visuals,
}

impl AircraftAgent {
    pub fn new(mode: Mode, config: &SimConfig) -> Self {
        let max_step = match mode {
            Mode::Training => config.training_max_step,
            Mode::Racing => 0,
        };
        Self {
            rank: 0,
            mode,
            state: AgentState::default(),
            episode: Episode::new(max_step),
            controller: FlightController::new(config.flight.clone()),
            rewards: config.rewards.clone(),
            recovery: CrashRecovery::new(config.recovery.clone()),
            visuals: Visuals::default(),
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_training(&self) -> bool {
        self.mode == Mode::Training
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        self.state.progress
    }

    pub fn controls(&self) -> ControlState {
        self.state.controls
    }

    pub fn is_frozen(&self) -> bool {
        self.state.frozen
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn episode_mut(&mut self) -> &mut Episode {
        &mut self.episode
    }

    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    pub fn recovery_phase(&self) -> RecoveryPhase {
        self.recovery.phase()
    }

    /// Offset to the target checkpoint in the body's frame.
    pub fn to_target(&self, body: &dyn PhysicsBody, area: &RaceArea) -> Vector3<f64> {
        let target = area.checkpoints().get(self.state.progress.next_checkpoint);
        body.inverse_transform_direction(&(target.position - body.position()))
    }

    /// Stops, wipes the trail, and moves to the checkpoint before the
    /// target. `randomize` draws a new target first.
    pub fn reset(&mut self, ctx: &mut AgentContext, randomize: bool) {
        ctx.body.set_velocity(Vector3::zeros());
        ctx.body.set_angular_velocity(Vector3::zeros());
        self.visuals.clear_trail();
        let (progress, pose) = ctx
            .area
            .reset_placement(self.rank, self.state.progress, randomize);
        self.state.progress = progress;
        ctx.body.set_pose(&pose);
    }

    /// Handles entry into the trigger volume of checkpoint `index`.
    pub fn on_trigger_enter(&mut self, index: usize, area: &RaceArea) {
        if self.episode.is_done() {
            return;
        }
        self.state.progress = tracker(area, &self.rewards, self.mode).on_trigger_enter(
            self.state.progress,
            index,
            &mut self.episode,
        );
    }

    /// Contacts with other aircraft are ignored. Anything else ends a
    /// training episode or starts crash recovery in a race. Returns true if
    /// the contact counted as a crash.
    pub fn on_collision(&mut self, contact: Contact, ctx: &mut AgentContext) -> bool {
        if contact == Contact::Agent || self.episode.is_done() {
            return false;
        }
        match self.mode {
            Mode::Training => {
                log::info!("agent {} crashed", self.rank);
                tracker(ctx.area, &self.rewards, self.mode).crash(&mut self.episode);
            }
            Mode::Racing => {
                if !self.recovery.start() {
                    return false;
                }
                log::info!("agent {} crashed, recovering", self.rank);
                self.freeze(ctx.body);
                self.visuals.mesh_visible = false;
                self.visuals.explosion_visible = true;
            }
        }
        true
    }

    /// Advances a running crash recovery by one fixed step.
    pub fn tick_recovery(&mut self, ctx: &mut AgentContext) {
        match self.recovery.tick(ctx.timing.fixed_dt) {
            Some(RecoveryStep::Reposition) => {
                log::info!("agent {} repositioned", self.rank);
                self.visuals.mesh_visible = true;
                self.visuals.explosion_visible = false;
                self.reset(ctx, false);
            }
            Some(RecoveryStep::Thaw) => {
                log::info!("agent {} recovered", self.rank);
                self.thaw(ctx.body);
            }
            None => {}
        }
    }

    /// Drops a pending crash recovery. The agent stays as it is.
    pub fn cancel_recovery(&mut self) {
        self.recovery.cancel();
    }

    pub fn freeze(&mut self, body: &mut dyn PhysicsBody) {
        assert!(
            !self.is_training(),
            "Freeze/Thaw is not supported in training"
        );
        self.state.frozen = true;
        self.visuals.trail_emitting = false;
        body.sleep();
    }

    pub fn thaw(&mut self, body: &mut dyn PhysicsBody) {
        assert!(
            !self.is_training(),
            "Freeze/Thaw is not supported in training"
        );
        self.state.frozen = false;
        body.wake_up();
    }

    pub fn begin_step(&mut self) {
        self.episode.step();
    }

    pub fn end_step(&mut self) {
        self.episode.check_max_step();
    }

    fn update_trail(&mut self, boost: bool) {
        if boost {
            if !self.visuals.trail_emitting {
                self.visuals.trail_clears += 1;
                self.visuals.trail_emitting = true;
            }
        } else {
            self.visuals.trail_emitting = false;
        }
    }
}

impl Agent for AircraftAgent {
    fn initialize(&mut self, ctx: &mut AgentContext) {
        self.rank = ctx.area.register_agent();
        log::debug!(
            "agent {} initialized, {:?}, {} checkpoints",
            self.rank,
            self.mode,
            ctx.area.checkpoints().len()
        );
    }

    fn on_episode_begin(&mut self, ctx: &mut AgentContext) {
        self.state.progress.laps = 0;
        self.state.controls = ControlState::default();
        self.reset(ctx, self.is_training());
        self.state.progress = tracker(ctx.area, &self.rewards, self.mode)
            .reset_deadline(self.state.progress, &self.episode);
    }

    fn collect_observations(&self, ctx: &AgentContext) -> Observation {
        let body = &*ctx.body;
        let area = &*ctx.area;
        let target = area.checkpoints().get(self.state.progress.next_checkpoint);
        let velocity = body.inverse_transform_direction(&body.velocity());
        let to_target = self.to_target(body, area);
        let forward = body.inverse_transform_direction(&target.forward());
        Observation {
            velocity: velocity.into(),
            to_next_checkpoint: to_target.into(),
            next_checkpoint_forward: forward.into(),
        }
    }

    fn on_action_received(&mut self, actions: DiscreteActions, ctx: &mut AgentContext) {
        if self.state.frozen {
            return;
        }
        let input = actions.decode();
        self.update_trail(input.boost);
        self.state.controls =
            self.controller
                .process(self.state.controls, &input, ctx.body, ctx.timing);

        if self.is_training() {
            let radius = ctx
                .params
                .get_with_default(EnvironmentParameters::CHECKPOINT_RADIUS, 0.0);
            let to_target = self.to_target(&*ctx.body, &*ctx.area);
            self.state.progress = tracker(ctx.area, &self.rewards, self.mode).training_tick(
                self.state.progress,
                &to_target,
                radius,
                &mut self.episode,
            );
        }
    }
}
