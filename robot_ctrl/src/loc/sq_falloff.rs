//! Square falloff estimates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;
use util::maths::wrap_to_pi;

use super::{LocalizationData, LocalizationSource, ProbabilityField, DEFAULT_EPSILON};
use crate::geom::{self, Transform2};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An estimate whose probability falls off with the square of the distance from a best guess:
/// `accuracy / (d^2 * precision + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqFalloffLocalizationData {
    /// Best guess pose.
    pub transform: Transform2,

    /// Peak probability, how much this estimate is trusted relative to others.
    pub accuracy: f64,

    /// How quickly the position probability falls off.
    pub position_precision: f64,

    /// How quickly the rotation probability falls off.
    pub rotation_precision: f64,

    pub epsilon: f64,
}

/// Parameters of a fixed square falloff estimate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqFalloffParams {
    /// Best guess field position.
    ///
    /// Units: meters
    pub position_m: [f64; 2],

    /// Best guess heading.
    ///
    /// Units: radians
    pub heading_rad: f64,

    pub accuracy: f64,
    pub position_precision: f64,
    pub rotation_precision: f64,

    /// Finite difference step.
    pub epsilon: f64,

    pub localize_position: bool,
    pub localize_rotation: bool,
}

/// A source whose estimate never changes, such as a known starting pose.
#[derive(Debug, Clone)]
pub struct StaticLocalizationSource {
    data: SqFalloffLocalizationData,
    localize_position: bool,
    localize_rotation: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl SqFalloffLocalizationData {
    pub fn new(
        transform: Transform2,
        accuracy: f64,
        position_precision: f64,
        rotation_precision: f64,
    ) -> Self {
        Self {
            transform,
            accuracy,
            position_precision,
            rotation_precision,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ProbabilityField for SqFalloffLocalizationData {
    fn position_probability(&self, pos: &Vector2<f64>) -> f64 {
        let diff = pos - self.transform.translation.vector;
        self.accuracy / (diff.dot(&diff) * self.position_precision + 1.0)
    }

    fn rotation_probability(&self, rot: f64) -> f64 {
        let diff = wrap_to_pi(rot - geom::heading(&self.transform));
        self.accuracy / (diff * diff * self.rotation_precision + 1.0)
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for SqFalloffParams {
    fn default() -> Self {
        Self {
            position_m: [0.0; 2],
            heading_rad: 0.0,
            accuracy: 1.0,
            position_precision: 1.0,
            rotation_precision: 1.0,
            epsilon: DEFAULT_EPSILON,
            localize_position: true,
            localize_rotation: true,
        }
    }
}

impl StaticLocalizationSource {
    pub fn new(params: &SqFalloffParams) -> Self {
        let transform = geom::transform(
            Vector2::new(params.position_m[0], params.position_m[1]),
            params.heading_rad,
        );

        let mut data = SqFalloffLocalizationData::new(
            transform,
            params.accuracy,
            params.position_precision,
            params.rotation_precision,
        );
        data.epsilon = params.epsilon;

        Self {
            data,
            localize_position: params.localize_position,
            localize_rotation: params.localize_rotation,
        }
    }

    /// A source estimating only position.
    pub fn position(position_m: Vector2<f64>, accuracy: f64, precision: f64) -> Self {
        Self::new(&SqFalloffParams {
            position_m: [position_m.x, position_m.y],
            accuracy,
            position_precision: precision,
            localize_rotation: false,
            ..Default::default()
        })
    }

    /// A source estimating only heading.
    pub fn rotation(heading_rad: f64, accuracy: f64, precision: f64) -> Self {
        Self::new(&SqFalloffParams {
            heading_rad,
            accuracy,
            rotation_precision: precision,
            localize_position: false,
            ..Default::default()
        })
    }
}

impl LocalizationSource for StaticLocalizationSource {
    fn can_localize_position(&self) -> bool {
        self.localize_position
    }

    fn can_localize_rotation(&self) -> bool {
        self.localize_rotation
    }

    fn collect_data(&self) -> Box<dyn LocalizationData> {
        Box::new(self.data.clone())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
