//! Scenario tests of pose resolution from several sources.

use nalgebra::Vector2;

use robot_ctrl::loc::{
    NewtonLocalizerParams, NewtonRobotLocalizer, RobotLocalizer, StaticLocalizationSource,
};

fn localizer_with(positions: &[[f64; 2]], heading: Option<f64>) -> NewtonRobotLocalizer {
    let mut loc = NewtonRobotLocalizer::new(NewtonLocalizerParams::default());

    for p in positions {
        loc.register_source(Box::new(StaticLocalizationSource::position(
            Vector2::new(p[0], p[1]),
            1.0,
            1.0,
        )));
    }
    if let Some(h) = heading {
        loc.register_source(Box::new(StaticLocalizationSource::rotation(h, 1.0, 1.0)));
    }

    loc
}

#[test]
fn test_two_sources_resolve_between() {
    let mut loc = localizer_with(&[[0.0, 0.0], [1.0, 0.0]], None);
    let pos = loc.resolve_position();

    assert!(pos.x > 0.4 && pos.x < 0.6, "{:?}", pos);
    assert!(pos.y.abs() < 0.1, "{:?}", pos);
}

#[test]
fn test_repeated_resolution_is_identical() {
    let mut loc = localizer_with(&[[0.3, -0.2], [0.5, 0.4]], Some(1.0));

    let first = loc.resolve_transform();
    for _ in 0..3 {
        assert_eq!(loc.resolve_transform(), first);
    }

    // After invalidation the sources are read again, and still agree closely
    loc.invalidate_cache();
    let second = loc.resolve_transform();
    assert!((second.translation.vector - first.translation.vector).norm() < 1e-3);
}

#[test]
fn test_rotation_wraps() {
    let mut loc = localizer_with(&[], Some(3.0));
    let rot = loc.resolve_rotation();

    assert!((rot - 3.0).abs() < 1e-3, "{}", rot);
}
