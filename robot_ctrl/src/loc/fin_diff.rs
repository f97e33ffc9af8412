//! Finite difference derivatives of probability fields.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;

use super::{LocalizationData, DEFAULT_EPSILON};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of times an evaluation point is nudged away from a root during deflation.
const MAX_DEFLATION_NUDGES: usize = 16;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A relative probability field over position and heading.
///
/// Every `ProbabilityField` is [`LocalizationData`], with the derivatives computed by forward
/// finite differences.
pub trait ProbabilityField {
    fn position_probability(&self, pos: &Vector2<f64>) -> f64;

    fn rotation_probability(&self, rot: f64) -> f64;

    /// Finite difference step.
    fn epsilon(&self) -> f64 {
        DEFAULT_EPSILON
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Deflation factor applied to position derivatives at `pos`.
///
/// Each root `r` contributes `1 / (1 / (|pos - r|^2 + 1) - 1)`, which diverges at the root. When
/// that happens the evaluation point is nudged diagonally by `eps` until the factor is finite.
pub fn position_deflation(pos: &Vector2<f64>, roots: &[Vector2<f64>], eps: f64) -> f64 {
    roots
        .iter()
        .map(|root| {
            let mut centre = *pos;
            for _ in 0..MAX_DEFLATION_NUDGES {
                let diff = root - centre;
                let factor = 1.0 / (diff.dot(&diff) + 1.0) - 1.0;
                let product = 1.0 / factor;
                if product.is_finite() {
                    return product;
                }
                centre += Vector2::new(eps, eps);
            }

            trace!("Could not deflate position root {:?}", root);
            1.0
        })
        .product()
}

/// Deflation factor applied to rotation derivatives at `rot`, the product of `1 / (rot - r)`.
pub fn rotation_deflation(rot: f64, roots: &[f64], eps: f64) -> f64 {
    roots
        .iter()
        .map(|root| {
            let mut x = rot;
            for _ in 0..MAX_DEFLATION_NUDGES {
                let product = 1.0 / (x - root);
                if product.is_finite() {
                    return product;
                }
                x += eps;
            }

            trace!("Could not deflate rotation root {}", root);
            1.0
        })
        .product()
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<T: ProbabilityField> LocalizationData for T {
    fn position_probability(&self, pos: &Vector2<f64>) -> f64 {
        ProbabilityField::position_probability(self, pos)
    }

    fn position_probability_dx(&self, pos: &Vector2<f64>, ignore_roots: &[Vector2<f64>]) -> f64 {
        let eps = self.epsilon();
        let step = Vector2::new(eps, 0.0);

        let d = (ProbabilityField::position_probability(self, &(pos + step))
            - ProbabilityField::position_probability(self, pos))
            / eps;

        d * position_deflation(pos, ignore_roots, eps)
    }

    fn position_probability_dy(&self, pos: &Vector2<f64>, ignore_roots: &[Vector2<f64>]) -> f64 {
        let eps = self.epsilon();
        let step = Vector2::new(0.0, eps);

        let d = (ProbabilityField::position_probability(self, &(pos + step))
            - ProbabilityField::position_probability(self, pos))
            / eps;

        d * position_deflation(pos, ignore_roots, eps)
    }

    fn position_probability_dx_gradient(
        &self,
        pos: &Vector2<f64>,
        ignore_roots: &[Vector2<f64>],
    ) -> Vector2<f64> {
        let eps = self.epsilon();
        let z = self.position_probability_dx(pos, ignore_roots);

        Vector2::new(
            (self.position_probability_dx(&(pos + Vector2::new(eps, 0.0)), ignore_roots) - z) / eps,
            (self.position_probability_dx(&(pos + Vector2::new(0.0, eps)), ignore_roots) - z) / eps,
        )
    }

    fn position_probability_dy_gradient(
        &self,
        pos: &Vector2<f64>,
        ignore_roots: &[Vector2<f64>],
    ) -> Vector2<f64> {
        let eps = self.epsilon();
        let z = self.position_probability_dy(pos, ignore_roots);

        Vector2::new(
            (self.position_probability_dy(&(pos + Vector2::new(eps, 0.0)), ignore_roots) - z) / eps,
            (self.position_probability_dy(&(pos + Vector2::new(0.0, eps)), ignore_roots) - z) / eps,
        )
    }

    fn rotation_probability(&self, rot: f64) -> f64 {
        ProbabilityField::rotation_probability(self, rot)
    }

    fn rotation_probability_dx(&self, rot: f64, ignore_roots: &[f64]) -> f64 {
        let eps = self.epsilon();

        let d = (ProbabilityField::rotation_probability(self, rot + eps)
            - ProbabilityField::rotation_probability(self, rot))
            / eps;

        d * rotation_deflation(rot, ignore_roots, eps)
    }

    fn rotation_probability_dx2(&self, rot: f64, ignore_roots: &[f64]) -> f64 {
        let eps = self.epsilon();

        (self.rotation_probability_dx(rot + eps, ignore_roots)
            - self.rotation_probability_dx(rot, ignore_roots))
            / eps
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Inverted paraboloid peaking at (1, 2), and a parabola peaking at 0.5 rad.
    struct Bowl;

    impl ProbabilityField for Bowl {
        fn position_probability(&self, pos: &Vector2<f64>) -> f64 {
            -(pos - Vector2::new(1.0, 2.0)).norm_squared()
        }

        fn rotation_probability(&self, rot: f64) -> f64 {
            -(rot - 0.5).powi(2)
        }
    }

    #[test]
    fn test_derivatives() {
        let pos = Vector2::new(0.0, 0.0);

        // d/dx = -2(x - 1) = 2, d/dy = -2(y - 2) = 4
        assert!((Bowl.position_probability_dx(&pos, &[]) - 2.0).abs() < 1e-2);
        assert!((Bowl.position_probability_dy(&pos, &[]) - 4.0).abs() < 1e-2);

        let grad_x = Bowl.position_probability_dx_gradient(&pos, &[]);
        assert!((grad_x - Vector2::new(-2.0, 0.0)).norm() < 1e-2);
        let grad_y = Bowl.position_probability_dy_gradient(&pos, &[]);
        assert!((grad_y - Vector2::new(0.0, -2.0)).norm() < 1e-2);

        assert!((Bowl.rotation_probability_dx(0.0, &[]) - 1.0).abs() < 1e-2);
        assert!((Bowl.rotation_probability_dx2(0.0, &[]) + 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_deflation_always_finite() {
        let root = Vector2::new(0.25, -0.5);

        // Evaluating exactly at a root would divide by zero
        let f = position_deflation(&root, &[root], DEFAULT_EPSILON);
        assert!(f.is_finite());
        assert!(Bowl.position_probability_dx(&root, &[root]).is_finite());

        assert!(rotation_deflation(0.3, &[0.3], DEFAULT_EPSILON).is_finite());
        assert!(Bowl.rotation_probability_dx2(0.3, &[0.3]).is_finite());

        // No roots, no deflation
        assert_eq!(position_deflation(&root, &[], DEFAULT_EPSILON), 1.0);
        assert_eq!(rotation_deflation(0.3, &[], DEFAULT_EPSILON), 1.0);
    }
}
