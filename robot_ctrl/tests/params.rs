//! The parameter files shipped with the workspace must load into their structs.

use std::path::PathBuf;

use robot_ctrl::{
    layer::{
        drive::{MecanumDriveParams, TwoWheelDriveParams},
        mechanism::ShooterIntakeParams,
    },
    loc::NewtonLocalizerParams,
    pathfinding::PathfindingParams,
};
use util::params;

fn params_path(file: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.push("params");
    path.push(file);
    path
}

#[test]
fn test_mecanum_params() {
    let p: MecanumDriveParams = params::load_file(params_path("mecanum_drive.toml")).unwrap();
    assert_eq!(p.motor_names[3], "right_back_drive");
    assert_eq!(p.auto_speed_factor, 0.5);
}

#[test]
fn test_two_wheel_params() {
    let p: TwoWheelDriveParams = params::load_file(params_path("two_wheel_drive.toml")).unwrap();
    assert_eq!(p.motor_names[0], "left_front_drive");
    assert_eq!(p.wheel_span_radius_m, 0.1905);
}

#[test]
fn test_localizer_params() {
    let p: NewtonLocalizerParams = params::load_file(params_path("newton_localizer.toml")).unwrap();
    assert_eq!(p.searches, 10);
    assert_eq!(p.steps, 40);
}

#[test]
fn test_pathfinding_params() {
    let p: PathfindingParams = params::load_file(params_path("pathfinding.toml")).unwrap();
    assert_eq!(p.interval_s, 0.25);
    assert_eq!(p.static_obstacles.len(), 1);
}

#[test]
fn test_shooter_params() {
    let p: ShooterIntakeParams = params::load_file(params_path("shooter_intake.toml")).unwrap();
    assert_eq!(p.flywheel_name, "flywheel");
    assert_eq!(p.flywheel_max_velocity_tps, 2800.0);
}

#[test]
fn test_missing_file() {
    let res: Result<PathfindingParams, _> = params::load_file(params_path("does_not_exist.toml"));
    assert!(matches!(res, Err(params::LoadError::FileLoadError(_))));
}
