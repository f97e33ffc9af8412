//! # Localisation
//!
//! Fuses the estimates of several localisation sources (odometry, vision targets, ...) into a
//! single best guess of the robot's pose. Each source produces a relative probability field over
//! field position and/or heading. The localiser finds the pose maximising the sum of the fields.
//!
//! Fields are only comparable within a single resolution pass. The localiser memoises the data of
//! each source and the resolved pose until its cache is invalidated, which the controller does at
//! the start of every tick.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod fin_diff;
mod newton;
mod sq_falloff;

pub use fin_diff::{position_deflation, rotation_deflation, ProbabilityField};
pub use newton::{NewtonLocalizerParams, NewtonRobotLocalizer};
pub use sq_falloff::{SqFalloffLocalizationData, SqFalloffParams, StaticLocalizationSource};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use nalgebra::Vector2;

use crate::geom::{self, Transform2};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default finite difference step.
pub const DEFAULT_EPSILON: f64 = 0.001;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of information about the robot's pose.
pub trait LocalizationSource {
    fn can_localize_position(&self) -> bool;

    fn can_localize_rotation(&self) -> bool;

    /// Take a snapshot of the source's current estimate.
    fn collect_data(&self) -> Box<dyn LocalizationData>;
}

/// A snapshot of one source's estimate, as relative probability functions and their derivatives.
///
/// The derivative functions take the roots already found by the localiser and deflate the
/// derivative around them, so repeated searches do not converge on the same critical point.
pub trait LocalizationData {
    fn position_probability(&self, pos: &Vector2<f64>) -> f64;

    fn position_probability_dx(&self, pos: &Vector2<f64>, ignore_roots: &[Vector2<f64>]) -> f64;

    fn position_probability_dy(&self, pos: &Vector2<f64>, ignore_roots: &[Vector2<f64>]) -> f64;

    /// Gradient of the deflated x derivative.
    fn position_probability_dx_gradient(
        &self,
        pos: &Vector2<f64>,
        ignore_roots: &[Vector2<f64>],
    ) -> Vector2<f64>;

    /// Gradient of the deflated y derivative.
    fn position_probability_dy_gradient(
        &self,
        pos: &Vector2<f64>,
        ignore_roots: &[Vector2<f64>],
    ) -> Vector2<f64>;

    fn rotation_probability(&self, rot: f64) -> f64;

    fn rotation_probability_dx(&self, rot: f64, ignore_roots: &[f64]) -> f64;

    fn rotation_probability_dx2(&self, rot: f64, ignore_roots: &[f64]) -> f64;
}

/// Resolves the robot's pose from the registered sources.
pub trait RobotLocalizer {
    /// Forget all memoised data, so the next resolution reads the sources again.
    fn invalidate_cache(&mut self);

    fn register_source(&mut self, source: Box<dyn LocalizationSource>);

    /// Best guess field position of the robot.
    fn resolve_position(&mut self) -> Vector2<f64>;

    /// Best guess heading of the robot in the range (-pi, pi].
    fn resolve_rotation(&mut self) -> f64;

    /// Best guess pose of the robot.
    fn resolve_transform(&mut self) -> Transform2 {
        let pos = self.resolve_position();
        let rot = self.resolve_rotation();
        geom::transform(pos, rot)
    }
}

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// The localiser is shared between the controller, which invalidates it, and the layers which
/// resolve poses from it.
pub type SharedLocalizer = Rc<RefCell<dyn RobotLocalizer>>;
