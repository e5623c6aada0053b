use approx::assert_abs_diff_eq;
use nalgebra::{point, Vector3};
use test_log::test;
use wingdash_api::DiscreteActions;
use wingdash_simulator::agent::{Agent, AgentContext, AircraftAgent, Contact, Mode};
use wingdash_simulator::area::{AreaConfig, RaceArea};
use wingdash_simulator::config::SimConfig;
use wingdash_simulator::episode::{EnvironmentParameters, EpisodeEnd};
use wingdash_simulator::flight::{ControlState, TickTiming};
use wingdash_simulator::physics::{MemoryBody, PhysicsBody};
use wingdash_simulator::recovery::RecoveryPhase;
use wingdash_simulator::scenario::straight_course;
use wingdash_simulator::simulation::PHYSICS_TICK_LENGTH;

struct Harness {
    agent: AircraftAgent,
    body: MemoryBody,
    area: RaceArea,
    params: EnvironmentParameters,
}

impl Harness {
    fn new(mode: Mode) -> Self {
        let mut harness = Self {
            agent: AircraftAgent::new(mode, &SimConfig::default()),
            body: MemoryBody::default(),
            area: RaceArea::new(Box::new(straight_course()), AreaConfig::default(), 0),
            params: EnvironmentParameters::new(),
        };
        harness.with_ctx(|agent, ctx| {
            agent.initialize(ctx);
            agent.episode_mut().begin();
            agent.on_episode_begin(ctx);
        });
        harness
    }

    fn with_ctx<R>(&mut self, f: impl FnOnce(&mut AircraftAgent, &mut AgentContext) -> R) -> R {
        let mut ctx = AgentContext {
            body: &mut self.body,
            area: &mut self.area,
            params: &self.params,
            timing: TickTiming::fixed(PHYSICS_TICK_LENGTH),
        };
        f(&mut self.agent, &mut ctx)
    }

    fn act(&mut self, actions: DiscreteActions) {
        self.body.reset_forces();
        self.with_ctx(|agent, ctx| {
            agent.begin_step();
            agent.on_action_received(actions, ctx);
            agent.tick_recovery(ctx);
            agent.end_step();
        });
    }
}

#[test]
fn test_crash_recovery_sequence() {
    let mut h = Harness::new(Mode::Racing);
    let boost = DiscreteActions::new(0, 0, 1);
    h.act(boost);
    assert!(h.agent.visuals().trail_emitting);

    // Fly on to just short of checkpoint 1, then crash.
    h.body.position = point![0.0, 50.0, 150.0];
    h.body.velocity = Vector3::new(0.0, 0.0, 90.0);
    assert!(h.with_ctx(|agent, ctx| agent.on_collision(Contact::Obstacle, ctx)));
    assert!(h.agent.is_frozen());
    assert!(h.body.is_sleeping());
    assert_eq!(h.body.velocity, Vector3::zeros());
    assert!(!h.agent.visuals().trail_emitting);
    assert!(!h.agent.visuals().mesh_visible);
    assert!(h.agent.visuals().explosion_visible);

    // Frozen: no thrust, no attitude change, no reposition yet.
    let rotation = h.body.rotation;
    for _ in 0..119 {
        h.act(boost);
        assert_eq!(h.body.force, Vector3::zeros());
        assert_eq!(h.body.rotation, rotation);
        assert!(h.agent.visuals().explosion_visible);
    }
    assert_abs_diff_eq!(h.body.position, point![0.0, 50.0, 150.0]);

    // After the explosion delay it is back at the last completed checkpoint.
    h.act(boost);
    assert!(h.agent.is_frozen());
    assert!(h.agent.visuals().mesh_visible);
    assert!(!h.agent.visuals().explosion_visible);
    assert_abs_diff_eq!(h.body.position, point![0.0, 50.0, 0.0], epsilon = 1e-9);
    assert_eq!(h.agent.progress().next_checkpoint, 1);
    assert!(matches!(
        h.agent.recovery_phase(),
        RecoveryPhase::Recovering { .. }
    ));

    for _ in 0..59 {
        h.act(boost);
        assert!(h.agent.is_frozen());
    }
    h.act(boost);
    assert!(!h.agent.is_frozen());
    assert!(!h.body.is_sleeping());
    assert_eq!(h.agent.recovery_phase(), RecoveryPhase::Normal);

    h.act(boost);
    assert_abs_diff_eq!(h.body.force.norm(), 2e6, epsilon = 1e-6);
    assert!(!h.agent.episode().is_done());
}

#[test]
fn test_agent_contacts_ignored() {
    for mode in [Mode::Racing, Mode::Training] {
        let mut h = Harness::new(mode);
        assert!(!h.with_ctx(|agent, ctx| agent.on_collision(Contact::Agent, ctx)));
        assert!(!h.agent.is_frozen());
        assert!(!h.agent.episode().is_done());
    }
}

#[test]
fn test_crash_during_recovery_ignored() {
    let mut h = Harness::new(Mode::Racing);
    assert!(h.with_ctx(|agent, ctx| agent.on_collision(Contact::Obstacle, ctx)));
    for _ in 0..30 {
        h.act(DiscreteActions::HOLD);
    }
    let phase = h.agent.recovery_phase();
    assert!(!h.with_ctx(|agent, ctx| agent.on_collision(Contact::Obstacle, ctx)));
    assert_eq!(h.agent.recovery_phase(), phase);
}

#[test]
fn test_training_crash_ends_episode() {
    let mut h = Harness::new(Mode::Training);
    h.act(DiscreteActions::HOLD);
    assert!(h.with_ctx(|agent, ctx| agent.on_collision(Contact::Obstacle, ctx)));
    assert!(!h.agent.is_frozen());
    assert_eq!(h.agent.episode().end_reason(), Some(EpisodeEnd::Crash));
    assert_abs_diff_eq!(
        h.agent.episode().cumulative_reward(),
        -1.0 - 1.0 / 5000.0,
        epsilon = 1e-9
    );
    assert_eq!(h.agent.recovery_phase(), RecoveryPhase::Normal);
}

#[test]
#[should_panic(expected = "Freeze/Thaw is not supported in training")]
fn test_freeze_in_training() {
    let mut h = Harness::new(Mode::Training);
    let Harness { agent, body, .. } = &mut h;
    agent.freeze(body);
}

#[test]
#[should_panic(expected = "Freeze/Thaw is not supported in training")]
fn test_thaw_in_training() {
    let mut h = Harness::new(Mode::Training);
    let Harness { agent, body, .. } = &mut h;
    agent.thaw(body);
}

#[test]
fn test_freeze_and_thaw() {
    let mut h = Harness::new(Mode::Racing);
    {
        let Harness { agent, body, .. } = &mut h;
        agent.freeze(body);
    }
    h.act(DiscreteActions::new(1, 1, 1));
    assert_eq!(h.body.force, Vector3::zeros());
    assert_eq!(h.agent.controls(), ControlState::default());
    {
        let Harness { agent, body, .. } = &mut h;
        agent.thaw(body);
    }
    h.act(DiscreteActions::new(1, 1, 1));
    assert!(h.body.force.norm() > 0.0);
    assert_ne!(h.agent.controls(), ControlState::default());
}

#[test]
fn test_cancelled_recovery_does_nothing() {
    let mut h = Harness::new(Mode::Racing);
    h.body.position = point![0.0, 50.0, 150.0];
    assert!(h.with_ctx(|agent, ctx| agent.on_collision(Contact::Obstacle, ctx)));
    h.agent.cancel_recovery();
    for _ in 0..300 {
        h.act(DiscreteActions::HOLD);
    }
    assert_abs_diff_eq!(h.body.position, point![0.0, 50.0, 150.0]);
    assert!(h.agent.is_frozen());
}
