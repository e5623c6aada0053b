use approx::assert_abs_diff_eq;
use nalgebra::UnitQuaternion;
use test_log::test;
use wingdash_api::{ActionSource, ControlInput, DiscreteActions, Observation};
use wingdash_simulator::attitude::{normalize_degrees, EulerAngles};
use wingdash_simulator::flight::{ControlState, FlightConfig, FlightController, TickTiming};
use wingdash_simulator::physics::{MemoryBody, PhysicsBody};
use wingdash_simulator::policy::RandomPolicy;
use wingdash_simulator::simulation::PHYSICS_TICK_LENGTH;

fn controller() -> FlightController {
    FlightController::new(FlightConfig::default())
}

fn timing() -> TickTiming {
    TickTiming::fixed(PHYSICS_TICK_LENGTH)
}

#[test]
fn test_thrust_magnitude() {
    let controller = controller();
    for (boost, expected) in [(0, 1e6), (1, 2e6)] {
        let mut body = MemoryBody::default();
        controller.process(
            ControlState::default(),
            &DiscreteActions::new(0, 0, boost).decode(),
            &mut body,
            timing(),
        );
        assert_abs_diff_eq!(body.force.norm(), expected, epsilon = 1e-6);
        assert_abs_diff_eq!(body.force.z, expected, epsilon = 1e-6);
    }
}

#[test]
fn test_thrust_follows_nose() {
    let controller = controller();
    let mut body = MemoryBody::default();
    body.rotation = EulerAngles::new(0.0, 90.0, 0.0).to_rotation();
    controller.process(
        ControlState::default(),
        &ControlInput::default(),
        &mut body,
        timing(),
    );
    assert_abs_diff_eq!(body.force.x, 1e6, epsilon = 1e-3);
    assert_abs_diff_eq!(body.force.z, 0.0, epsilon = 1e-3);
}

#[test]
fn test_target_roll() {
    let controller = controller();
    assert_abs_diff_eq!(controller.target_roll(0.0, 30.0), -0.25);
    assert_abs_diff_eq!(controller.target_roll(0.0, 330.0), 0.25);
    assert_abs_diff_eq!(controller.target_roll(1.0, 30.0), -1.0);
    assert_abs_diff_eq!(controller.target_roll(1.0, -100.0), -1.0);
    assert_abs_diff_eq!(controller.target_roll(-2.0, 30.0), 2.0);
}

#[test]
fn test_smoothing_never_overshoots() {
    let controller = controller();
    let target = ControlState {
        pitch: 1.0,
        yaw: -2.0,
        roll: 0.5,
    };
    let mut controls = ControlState::default();
    let max_delta = 2.0 * PHYSICS_TICK_LENGTH;
    for _ in 0..120 {
        let next = controller.smooth(controls, target, timing());
        for (before, after, goal) in [
            (controls.pitch, next.pitch, target.pitch),
            (controls.yaw, next.yaw, target.yaw),
            (controls.roll, next.roll, target.roll),
        ] {
            assert!((after - before).abs() <= max_delta + 1e-12);
            assert!((goal - after).abs() <= (goal - before).abs());
            assert!((after - before) * (goal - before) >= 0.0);
        }
        controls = next;
    }
    assert_eq!(controls, target);
}

#[test]
fn test_smoothing_uses_frame_step_for_yaw_and_roll() {
    let controller = controller();
    let target = ControlState {
        pitch: 1.0,
        yaw: 1.0,
        roll: 1.0,
    };
    let timing = TickTiming {
        fixed_dt: 0.01,
        frame_dt: 0.04,
    };
    let controls = controller.smooth(ControlState::default(), target, timing);
    assert_abs_diff_eq!(controls.pitch, 0.02);
    assert_abs_diff_eq!(controls.yaw, 0.08);
    assert_abs_diff_eq!(controls.roll, 0.08);
}

#[test]
fn test_integrate_clamps() {
    let controller = controller();
    let full = ControlState {
        pitch: 1.0,
        yaw: 1.0,
        roll: 1.0,
    };
    let angles = controller.integrate(EulerAngles::new(44.0, 350.0, 0.0), &full, 0.1);
    assert_eq!(angles.pitch, 45.0);
    // Yaw wraps freely, nothing normalizes it here.
    assert_abs_diff_eq!(angles.yaw, 360.0, epsilon = 1e-9);

    let back = ControlState {
        pitch: -1.0,
        yaw: 0.0,
        roll: -1.0,
    };
    let angles = controller.integrate(EulerAngles::new(320.0, 0.0, 0.0), &back, 0.1);
    assert_eq!(angles.pitch, -45.0);
}

#[test]
fn test_roll_integrates_from_pitch_reading() {
    let controller = controller();
    let controls = ControlState {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.5,
    };
    let angles = controller.integrate(EulerAngles::new(10.0, 0.0, 90.0), &controls, 0.1);
    assert_abs_diff_eq!(angles.roll, 15.0, epsilon = 1e-9);
}

#[test]
fn test_attitude_stays_within_limits() {
    let controller = controller();
    let config = controller.config().clone();
    let mut body = MemoryBody::new(Default::default(), UnitQuaternion::identity());
    let mut controls = ControlState::default();
    let mut policy = RandomPolicy::new(1);
    for tick in 0..3000 {
        let actions = if tick < 500 {
            // Hold the nose down long enough to hit the limit.
            DiscreteActions::new(1, 1, 0)
        } else {
            policy.act(&Observation::default())
        };
        controls = controller.process(controls, &actions.decode(), &mut body, timing());
        let angles = EulerAngles::from_rotation(&body.rotation()).normalized();
        assert!(
            angles.pitch.abs() <= config.max_pitch_angle + 1e-6,
            "tick {tick}: pitch {}",
            angles.pitch
        );
        assert!(
            angles.roll.abs() <= config.max_roll_angle + 1e-6,
            "tick {tick}: roll {}",
            angles.roll
        );
        assert!(normalize_degrees(angles.yaw).is_finite());
    }
}

#[test]
fn test_hold_keeps_level_flight() {
    let controller = controller();
    let mut body = MemoryBody::default();
    let mut controls = ControlState::default();
    for _ in 0..60 {
        controls = controller.process(controls, &ControlInput::default(), &mut body, timing());
    }
    assert_eq!(controls, ControlState::default());
    assert_abs_diff_eq!(
        body.rotation().angle_to(&UnitQuaternion::identity()),
        0.0,
        epsilon = 1e-9
    );
}
