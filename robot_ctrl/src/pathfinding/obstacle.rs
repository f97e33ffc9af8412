//! Obstacles, as signed distance fields over the field.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;

use crate::geom::{self, Transform2};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something the robot must not drive into.
pub trait Obstacle {
    /// Signed distance from a field point to the obstacle, positive outside and negative inside.
    fn distance_to(&self, point: &Vector2<f64>) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A circular obstacle, such as another robot.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleObstacle {
    pub centre_m: Vector2<f64>,
    pub radius_m: f64,
}

/// A fixed rectangular obstacle, such as a field element.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticObstacle {
    /// Pose of the rectangle's centre.
    pub transform: Transform2,

    /// Full extent along the rectangle's own x and y axes.
    pub size_m: Vector2<f64>,
}

/// A thin obstacle detected by a sensor, modelled as a segment centred on `transform` and lying
/// across its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentObstacle {
    pub transform: Transform2,
    pub length_m: f64,
}

/// Parameters describing a [`StaticObstacle`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StaticObstacleParams {
    pub position_m: [f64; 2],
    #[serde(default)]
    pub heading_rad: f64,
    pub size_m: [f64; 2],
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl CircleObstacle {
    pub fn new(centre_m: Vector2<f64>, radius_m: f64) -> Self {
        Self { centre_m, radius_m }
    }
}

impl Obstacle for CircleObstacle {
    fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        (point - self.centre_m).norm() - self.radius_m
    }
}

impl StaticObstacle {
    pub fn new(transform: Transform2, size_m: Vector2<f64>) -> Self {
        Self { transform, size_m }
    }
}

impl From<&StaticObstacleParams> for StaticObstacle {
    fn from(p: &StaticObstacleParams) -> Self {
        Self::new(
            geom::transform(Vector2::new(p.position_m[0], p.position_m[1]), p.heading_rad),
            Vector2::new(p.size_m[0], p.size_m[1]),
        )
    }
}

impl Obstacle for StaticObstacle {
    fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        let local = geom::transform_point(&self.transform.inverse(), point);
        let q = local.abs() - self.size_m * 0.5;

        let outside = Vector2::new(q.x.max(0.0), q.y.max(0.0)).norm();
        let inside = q.x.max(q.y).min(0.0);

        outside + inside
    }
}

impl SegmentObstacle {
    pub fn new(transform: Transform2, length_m: f64) -> Self {
        Self {
            transform,
            length_m,
        }
    }
}

impl Obstacle for SegmentObstacle {
    fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        let half = self.length_m * 0.5;
        let a = geom::transform_point(&self.transform, &Vector2::new(0.0, half));
        let b = geom::transform_point(&self.transform, &Vector2::new(0.0, -half));

        let ab = b - a;
        let len_sq = ab.norm_squared();
        let along = if len_sq == 0.0 {
            0.0
        } else {
            ((point - a).dot(&ab) / len_sq).max(0.0).min(1.0)
        };

        (point - (a + ab * along)).norm()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
