//! Constant acceleration trajectories and their closed form prediction.
//!
//! Accelerations are given in the robot frame (axial forwards, lateral to the left, yaw
//! anticlockwise) and so rotate with the robot. Over one planning interval the heading is
//! approximated as turning at its mean rate, which makes the heading at the end of the interval
//! exact and the position integrable in closed form:
//!
//! ```text
//! w  = w0 + yaw * t / 2
//! A  = axial + i lateral
//! v(t) = v0 + A e^(i th0) (e^(i w t) - 1) / (i w)
//! p(t) = p0 + v0 t + A e^(i th0) (i t / w - (e^(i w t) - 1) / w^2)
//! ```
//!
//! As `w t` goes to zero both expressions are replaced by their series expansions.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Complex, Vector2};

use crate::geom::{self, Transform2};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Below this magnitude of `w t` the series expansions are used.
const SERIES_THRESHOLD: f64 = 1e-3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Constant accelerations applied over one planning interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trajectory {
    /// Forwards acceleration.
    pub axial: f64,

    /// Leftwards acceleration.
    pub lateral: f64,

    /// Anticlockwise angular acceleration.
    pub yaw: f64,
}

/// Pose and velocity of the robot at the start of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub pose: Transform2,

    /// Field frame velocity.
    pub velocity_ms: Vector2<f64>,

    /// Anticlockwise angular velocity.
    pub yaw_rate_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Trajectory {
    pub fn new(axial: f64, lateral: f64, yaw: f64) -> Self {
        Self {
            axial,
            lateral,
            yaw,
        }
    }

    /// Rotate in place, used when nothing else is safe.
    pub fn spin() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Sum of the magnitudes of the accelerations.
    pub fn magnitude(&self) -> f64 {
        self.axial.abs() + self.lateral.abs() + self.yaw.abs()
    }

    fn mean_yaw_rate(&self, start: &KinematicState, t_s: f64) -> f64 {
        start.yaw_rate_rads + 0.5 * self.yaw * t_s
    }

    /// Field frame acceleration at the start of the trajectory, as a complex number.
    fn initial_accel(&self, start: &KinematicState) -> Complex<f64> {
        Complex::new(self.axial, self.lateral) * cis(geom::heading(&start.pose))
    }

    /// Predicted pose `t_s` seconds into the trajectory.
    pub fn pose_at(&self, start: &KinematicState, t_s: f64) -> Transform2 {
        let w = self.mean_yaw_rate(start, t_s);
        let wt = w * t_s;
        let a0 = self.initial_accel(start);

        let shape = if wt.abs() < SERIES_THRESHOLD {
            Complex::new(0.5 * t_s * t_s, w * t_s * t_s * t_s / 6.0)
        } else {
            Complex::new(0.0, t_s / w) - (cis(wt) - 1.0) / (w * w)
        };
        let disp = a0 * shape;

        let p0 = start.pose.translation.vector;
        let pos = p0 + start.velocity_ms * t_s + Vector2::new(disp.re, disp.im);
        let heading = geom::heading(&start.pose) + wt;

        geom::transform(pos, heading)
    }

    /// Predicted field frame velocity and angular velocity `t_s` seconds into the trajectory.
    pub fn velocity_at(&self, start: &KinematicState, t_s: f64) -> (Vector2<f64>, f64) {
        let w = self.mean_yaw_rate(start, t_s);
        let wt = w * t_s;
        let a0 = self.initial_accel(start);

        let shape = if wt.abs() < SERIES_THRESHOLD {
            Complex::new(t_s * (1.0 - wt * wt / 6.0), t_s * wt / 2.0)
        } else {
            (cis(wt) - 1.0) / Complex::new(0.0, w)
        };
        let dv = a0 * shape;

        (
            start.velocity_ms + Vector2::new(dv.re, dv.im),
            start.yaw_rate_rads + self.yaw * t_s,
        )
    }
}

impl KinematicState {
    /// A robot at rest at the given pose.
    pub fn at_rest(pose: Transform2) -> Self {
        Self {
            pose,
            velocity_ms: Vector2::zeros(),
            yaw_rate_rads: 0.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// `e^(i theta)`
fn cis(theta: f64) -> Complex<f64> {
    let (s, c) = theta.sin_cos();
    Complex::new(c, s)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
