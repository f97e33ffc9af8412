//! Multi-start Newton pose resolution.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::f64::consts::TAU;

use log::debug;
use nalgebra::{Matrix2, Vector2};
use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use util::maths::wrap_to_pi;

use super::{LocalizationData, LocalizationSource, RobotLocalizer};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the Newton localiser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewtonLocalizerParams {
    /// Number of independent searches, each of which finds one root.
    pub searches: usize,

    /// Newton steps per search.
    pub steps: usize,

    /// Size of the random step taken when the Newton step is undefined.
    pub disturbance: f64,

    /// Seed of the random number generator used for disturbances.
    pub seed: u64,
}

/// Resolves the pose by finding the critical points of the summed probability fields with
/// repeated, deflated Newton searches, then taking the point of greatest probability.
///
/// Position and rotation are resolved independently, each from the sources which support it.
pub struct NewtonRobotLocalizer {
    params: NewtonLocalizerParams,
    sources: Vec<Box<dyn LocalizationSource>>,

    /// Data collected from each source this pass, by source index.
    cached_data: Vec<Option<Box<dyn LocalizationData>>>,
    cached_pos: Option<Vector2<f64>>,
    cached_rot: Option<f64>,

    rng: StdRng,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for NewtonLocalizerParams {
    fn default() -> Self {
        Self {
            searches: 10,
            steps: 40,
            disturbance: 1.0,
            seed: 0,
        }
    }
}

impl NewtonRobotLocalizer {
    pub fn new(params: NewtonLocalizerParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            params,
            sources: Vec::new(),
            cached_data: Vec::new(),
            cached_pos: None,
            cached_rot: None,
            rng,
        }
    }

    /// Collect data from every source matching the filter which has not been read this pass, and
    /// return the data of all matching sources.
    fn data_for<F>(&mut self, filter: F) -> Vec<&dyn LocalizationData>
    where
        F: Fn(&dyn LocalizationSource) -> bool,
    {
        let mut data = Vec::new();

        for (src, slot) in self.sources.iter().zip(self.cached_data.iter_mut()) {
            if !filter(&**src) {
                continue;
            }
            if slot.is_none() {
                *slot = Some(src.collect_data());
            }
            if let Some(d) = slot.as_deref() {
                data.push(d);
            }
        }

        data
    }
}

impl Default for NewtonRobotLocalizer {
    fn default() -> Self {
        Self::new(NewtonLocalizerParams::default())
    }
}

impl RobotLocalizer for NewtonRobotLocalizer {
    fn invalidate_cache(&mut self) {
        for slot in self.cached_data.iter_mut() {
            *slot = None;
        }
        self.cached_pos = None;
        self.cached_rot = None;
    }

    fn register_source(&mut self, source: Box<dyn LocalizationSource>) {
        self.sources.push(source);
        self.cached_data.push(None);
    }

    fn resolve_position(&mut self) -> Vector2<f64> {
        if let Some(pos) = self.cached_pos {
            return pos;
        }

        let params = self.params.clone();
        let mut rng = self.rng.clone();
        let pos = {
            let data = self.data_for(|s| s.can_localize_position());
            search_position(&data, &params, &mut rng)
        };
        self.rng = rng;

        debug!("Resolved position ({:.3}, {:.3})", pos.x, pos.y);
        self.cached_pos = Some(pos);
        pos
    }

    fn resolve_rotation(&mut self) -> f64 {
        if let Some(rot) = self.cached_rot {
            return rot;
        }

        let params = self.params.clone();
        let mut rng = self.rng.clone();
        let rot = {
            let data = self.data_for(|s| s.can_localize_rotation());
            search_rotation(&data, &params, &mut rng)
        };
        self.rng = rng;

        debug!("Resolved rotation {:.3} rad", rot);
        self.cached_rot = Some(rot);
        rot
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Orderable probability, with NaN sorting below everything.
fn score(p: f64) -> OrderedFloat<f64> {
    if p.is_nan() {
        OrderedFloat(f64::NEG_INFINITY)
    } else {
        OrderedFloat(p)
    }
}

fn position_probability(data: &[&dyn LocalizationData], pos: &Vector2<f64>) -> f64 {
    data.iter().map(|d| d.position_probability(pos)).sum()
}

fn rotation_probability(data: &[&dyn LocalizationData], rot: f64) -> f64 {
    data.iter().map(|d| d.rotation_probability(rot)).sum()
}

fn search_position(
    data: &[&dyn LocalizationData],
    params: &NewtonLocalizerParams,
    rng: &mut StdRng,
) -> Vector2<f64> {
    if data.is_empty() {
        debug!("No source can localize position");
        return Vector2::zeros();
    }

    let mut roots: Vec<Vector2<f64>> = Vec::with_capacity(params.searches);

    for _ in 0..params.searches {
        let mut xy = Vector2::zeros();
        let mut xy_min_err = xy;
        let mut min_err = f64::INFINITY;

        for step in 0..=params.steps {
            let grad = data.iter().fold(Vector2::zeros(), |acc, d| {
                acc + Vector2::new(
                    d.position_probability_dx(&xy, &roots),
                    d.position_probability_dy(&xy, &roots),
                )
            });

            let err = grad.norm();
            if err < min_err {
                xy_min_err = xy;
                min_err = err;
            }

            if step == params.steps {
                break;
            }

            // Jacobian of the deflated gradient, one row per component
            let (row_x, row_y) = data.iter().fold(
                (Vector2::zeros(), Vector2::zeros()),
                |(rx, ry), d| {
                    (
                        rx + d.position_probability_dx_gradient(&xy, &roots),
                        ry + d.position_probability_dy_gradient(&xy, &roots),
                    )
                },
            );
            let jac = Matrix2::new(row_x.x, row_x.y, row_y.x, row_y.y);

            let mut delta = jac
                .try_inverse()
                .map(|inv| -(inv * grad))
                .filter(|d| d.iter().all(|v| v.is_finite()))
                .unwrap_or_else(|| {
                    let dir = rng.gen::<f64>() * TAU;
                    Vector2::new(dir.cos(), dir.sin()) * params.disturbance
                });

            // Outside the concave region around a peak the Newton step points away from it
            if position_probability(data, &(xy + delta)) < position_probability(data, &xy) {
                delta = -delta;
            }

            xy += delta;
        }

        roots.push(xy_min_err);
    }

    // Roots include minima and saddles as well as maxima, so pick the most probable
    roots
        .iter()
        .copied()
        .max_by_key(|r| score(position_probability(data, r)))
        .unwrap_or_else(|| Vector2::zeros())
}

fn search_rotation(
    data: &[&dyn LocalizationData],
    params: &NewtonLocalizerParams,
    rng: &mut StdRng,
) -> f64 {
    if data.is_empty() {
        debug!("No source can localize rotation");
        return 0.0;
    }

    let mut roots: Vec<f64> = Vec::with_capacity(params.searches);

    for _ in 0..params.searches {
        let mut x = 0.0;
        let mut x_min_err = x;
        let mut min_err = f64::INFINITY;

        for step in 0..=params.steps {
            let grad: f64 = data.iter().map(|d| d.rotation_probability_dx(x, &roots)).sum();

            let err = grad.abs();
            if err < min_err {
                x_min_err = x;
                min_err = err;
            }

            if step == params.steps {
                break;
            }

            let slope: f64 = data.iter().map(|d| d.rotation_probability_dx2(x, &roots)).sum();
            let mut delta = -grad / slope;
            if !delta.is_finite() {
                delta = if rng.gen::<bool>() { 1.0 } else { -1.0 } * params.disturbance;
            }
            if rotation_probability(data, x + delta) < rotation_probability(data, x) {
                delta = -delta;
            }

            x += delta;
        }

        roots.push(x_min_err);
    }

    let best = roots
        .iter()
        .copied()
        .max_by_key(|r| score(rotation_probability(data, *r)))
        .unwrap_or(0.0);

    wrap_to_pi(best)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::StaticLocalizationSource;

    #[test]
    fn test_single_source() {
        let mut loc = NewtonRobotLocalizer::default();
        loc.register_source(Box::new(StaticLocalizationSource::position(
            Vector2::new(0.75, -0.5),
            1.0,
            1.0,
        )));
        loc.register_source(Box::new(StaticLocalizationSource::rotation(1.0, 1.0, 1.0)));

        let pos = loc.resolve_position();
        assert!((pos - Vector2::new(0.75, -0.5)).norm() < 0.01, "{:?}", pos);

        let rot = loc.resolve_rotation();
        assert!((rot - 1.0).abs() < 0.01, "{}", rot);
    }

    #[test]
    fn test_no_sources() {
        let mut loc = NewtonRobotLocalizer::default();
        assert_eq!(loc.resolve_position(), Vector2::zeros());
        assert_eq!(loc.resolve_rotation(), 0.0);
    }

    #[test]
    fn test_cache() {
        let mut loc = NewtonRobotLocalizer::default();
        loc.register_source(Box::new(StaticLocalizationSource::position(
            Vector2::new(-0.3, 0.2),
            1.0,
            2.0,
        )));

        let a = loc.resolve_transform();
        let b = loc.resolve_transform();
        assert_eq!(a, b);
        assert_eq!(loc.resolve_position(), a.translation.vector);

        // A fresh pass finds the same peak
        loc.invalidate_cache();
        assert!(loc.cached_data.iter().all(Option::is_none));
        let c = loc.resolve_position();
        assert!((c - a.translation.vector).norm() < 0.01);
    }
}
