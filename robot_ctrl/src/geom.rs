//! # Geometry
//!
//! Field-space geometry used by the localiser and the pathfinder, on top of `nalgebra`.
//!
//! Conventions: the field frame is right handed with angles measured anticlockwise from the
//! positive x axis. A robot transform maps points in the robot frame (x forward, y left) into
//! the field frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Isometry2, Matrix2, Matrix3, Point2, Vector2};
use util::maths::wrap_to_pi;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A rigid 2D transform (rotation then translation), used for robot poses and goals.
pub type Transform2 = Isometry2<f64>;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a transform from a field position and heading.
pub fn transform(position_m: Vector2<f64>, heading_rad: f64) -> Transform2 {
    Isometry2::new(position_m, heading_rad)
}

/// The 2x2 rotation matrix for the given angle.
pub fn rotation_matrix(angle_rad: f64) -> Matrix2<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix2::new(c, -s, s, c)
}

/// Extract the angle of a rotation matrix, in the range (-pi, pi].
pub fn matrix_angle(rot: &Matrix2<f64>) -> f64 {
    wrap_to_pi(rot[(1, 0)].atan2(rot[(0, 0)]))
}

/// The homogeneous 3x3 matrix of a rotation followed by a translation.
pub fn homogeneous(angle_rad: f64, translation_m: &Vector2<f64>) -> Matrix3<f64> {
    let rot = rotation_matrix(angle_rad);
    Matrix3::new(
        rot[(0, 0)], rot[(0, 1)], translation_m.x,
        rot[(1, 0)], rot[(1, 1)], translation_m.y,
        0.0, 0.0, 1.0,
    )
}

/// Recover a transform from its homogeneous matrix.
///
/// The upper left 2x2 block is assumed to be a rotation.
pub fn from_homogeneous(mat: &Matrix3<f64>) -> Transform2 {
    let rot = Matrix2::new(mat[(0, 0)], mat[(0, 1)], mat[(1, 0)], mat[(1, 1)]);
    transform(Vector2::new(mat[(0, 2)], mat[(1, 2)]), matrix_angle(&rot))
}

/// The heading of a transform in the range (-pi, pi].
pub fn heading(t: &Transform2) -> f64 {
    wrap_to_pi(t.rotation.angle())
}

/// Unit vector pointing along the heading of a transform.
pub fn direction(t: &Transform2) -> Vector2<f64> {
    t.rotation * Vector2::x()
}

/// Apply a transform to a field point.
pub fn transform_point(t: &Transform2, point_m: &Vector2<f64>) -> Vector2<f64> {
    (t * Point2::from(*point_m)).coords
}

/// The unsigned angle between two vectors, in the range [0, pi].
///
/// Zero length vectors have no direction, in which case the angle is taken to be zero.
pub fn angle_between(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let norms = a.norm() * b.norm();
    if norms == 0.0 {
        return 0.0;
    }

    (a.dot(b) / norms).max(-1.0).min(1.0).acos()
}

/// Project `a` onto `b`.
pub fn project(a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
    let b_norm_sq = b.norm_squared();
    if b_norm_sq == 0.0 {
        return Vector2::zeros();
    }

    b * (a.dot(b) / b_norm_sq)
}

/// The vector rotated a quarter turn anticlockwise.
pub fn perpendicular(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
