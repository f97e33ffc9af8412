//! Scenario tests of the dynamic window planner and the pathfinding stack.

use std::{cell::RefCell, rc::Rc};

use hw_if::{sim::SimActuator, Actuator, HardwareMap};
use nalgebra::Vector2;
use robot_ctrl::{
    controller::RobotController,
    geom,
    layer::{
        drive::{MecanumDrive, MecanumDriveParams},
        Collaborators, RoutineLayer, WinLayer,
    },
    loc::{NewtonLocalizerParams, NewtonRobotLocalizer, RobotLocalizer, StaticLocalizationSource},
    pathfinding::{
        CircleObstacle, DynamicWindowPlanner, KinematicState, PathfindingLayer, PathfindingParams,
        SegmentObstacle,
    },
    task::Task,
};
use util::time::ManualClock;

fn coarse_params() -> PathfindingParams {
    PathfindingParams {
        search_increment: 0.1,
        ..Default::default()
    }
}

#[test]
fn test_deviates_around_obstacle_in_path() {
    let mut planner = DynamicWindowPlanner::new(PathfindingParams {
        interval_s: 1.0,
        ..coarse_params()
    });
    planner.add_obstacle(Box::new(CircleObstacle::new(Vector2::new(0.6, 0.0), 0.1)));

    let state = KinematicState {
        velocity_ms: Vector2::new(1.0, 0.0),
        ..KinematicState::at_rest(geom::transform(Vector2::zeros(), 0.0))
    };
    let goal = geom::transform(Vector2::new(2.0, 0.0), 0.0);
    let traj = planner.plan(&state, &goal);

    assert!(traj.lateral != 0.0 || traj.yaw != 0.0, "{:?}", traj);
    assert!(traj.magnitude() < 1.0);
}

#[test]
fn test_wall_of_segments_forces_spin() {
    let mut planner = DynamicWindowPlanner::new(coarse_params());

    // Robot is already touching a wall across its path
    planner.add_obstacle(Box::new(SegmentObstacle::new(
        geom::transform(Vector2::zeros(), 0.0),
        2.0,
    )));

    let start = KinematicState::at_rest(geom::transform(Vector2::zeros(), 0.0));
    let traj = planner.plan(&start, &geom::transform(Vector2::new(2.0, 0.0), 0.0));
    assert_eq!(traj, robot_ctrl::pathfinding::Trajectory::spin());
}

type Actuators = Vec<Rc<RefCell<SimActuator>>>;

/// Mecanum hardware and a localizer holding the robot at the origin facing along x.
fn stationary_robot(clock: Rc<ManualClock>) -> (Collaborators, Actuators) {
    let mut hw = HardwareMap::new();
    let mut acts = Vec::new();
    for name in MecanumDriveParams::default().motor_names.iter() {
        let act = SimActuator::shared();
        hw.insert(name.as_str(), act.clone());
        acts.push(act);
    }

    let mut loc = NewtonRobotLocalizer::new(NewtonLocalizerParams::default());
    loc.register_source(Box::new(StaticLocalizationSource::position(
        Vector2::zeros(),
        1.0,
        1.0,
    )));
    loc.register_source(Box::new(StaticLocalizationSource::rotation(0.0, 1.0, 1.0)));

    let collab = Collaborators::new(hw)
        .with_localizer(Rc::new(RefCell::new(loc)))
        .with_clock(clock);

    (collab, acts)
}

fn powers(acts: &[Rc<RefCell<SimActuator>>]) -> Vec<f64> {
    acts.iter().map(|a| a.borrow().power()).collect()
}

#[test]
fn test_pathfinding_stack_drives_mecanum() {
    let clock = Rc::new(ManualClock::new(0.0));
    let (collab, acts) = stationary_robot(clock.clone());

    let mut controller = RobotController::new();
    controller
        .setup(
            collab,
            vec![
                Box::new(MecanumDrive::default()),
                Box::new(PathfindingLayer::new(coarse_params())),
                Box::new(RoutineLayer::new(vec![Task::MoveToField {
                    goal: geom::transform(Vector2::new(2.0, 0.0), 0.0),
                }])),
                Box::new(WinLayer::new()),
            ],
        )
        .unwrap();

    assert_eq!(controller.tick().unwrap(), false);
    let first = powers(&acts);
    assert!(first.iter().all(|p| *p > 0.0), "{:?}", first);

    // The robot has not moved, so it keeps being driven towards the goal
    for _ in 0..3 {
        clock.advance(0.1);
        assert_eq!(controller.tick().unwrap(), false);
        assert!(powers(&acts).iter().all(|p| *p > 0.0));
    }
}

#[test]
fn test_pathfinding_stack_stops_at_goal() {
    let clock = Rc::new(ManualClock::new(0.0));
    let (collab, acts) = stationary_robot(clock);

    // Left over from an earlier command
    for act in acts.iter() {
        act.borrow_mut().set_power(0.4);
    }

    let mut controller = RobotController::new();
    controller
        .setup(
            collab,
            vec![
                Box::new(MecanumDrive::default()),
                Box::new(PathfindingLayer::new(coarse_params())),
                Box::new(RoutineLayer::new(vec![Task::MoveToField {
                    goal: geom::transform(Vector2::zeros(), 0.0),
                }])),
                Box::new(WinLayer::new()),
            ],
        )
        .unwrap();

    assert_eq!(controller.tick().unwrap(), false);
    assert_eq!(powers(&acts), vec![0.0; 4]);

    assert_eq!(controller.tick().unwrap(), true);
    assert!(!controller.is_running());
}
