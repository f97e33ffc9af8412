//! Parameters for the dynamic window planner.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use super::obstacle::StaticObstacleParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tuning of the dynamic window search and its objective function.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathfindingParams {
    // ---- COMPLETION ----

    /// Distance and heading offset from the goal within which the robot has arrived.
    ///
    /// Units: meters, radians
    pub goal_epsilon: f64,

    // ---- SEARCH ----

    /// Spacing of the acceleration grid searched on each recomputation.
    pub search_increment: f64,

    /// How often the trajectory is recomputed, which is also the horizon it is simulated over.
    ///
    /// Units: seconds
    pub interval_s: f64,

    /// Fraction of the interval between points checked for clearance.
    pub clearance_step: f64,

    // ---- OBJECTIVE ----

    /// Weight of the final heading to goal term.
    pub target_angle_coeff: f64,

    /// Weight of the minimum clearance term.
    pub clearance_coeff: f64,

    /// Weight of the final speed term.
    pub speed_coeff: f64,

    /// Heading term is `c / (angle + k)`, so `c / k` is its maximum.
    pub smoothing_c: f64,

    /// Controls how quickly the heading term decays as the angle grows.
    pub smoothing_k: f64,

    /// Clearance beyond which the clearance term stops growing, so open space does not outweigh
    /// heading.
    ///
    /// Units: meters
    pub clearance_cap_m: f64,

    // ---- FIELD ----

    /// Fixed obstacles known before the match starts.
    pub static_obstacles: Vec<StaticObstacleParams>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for PathfindingParams {
    fn default() -> Self {
        Self {
            goal_epsilon: 0.01,
            search_increment: 0.05,
            interval_s: 0.25,
            clearance_step: 0.05,
            target_angle_coeff: 0.5,
            clearance_coeff: 1.2,
            speed_coeff: 0.5,
            smoothing_c: 1000.0,
            smoothing_k: 1.0,
            clearance_cap_m: 1.0,
            static_obstacles: Vec::new(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let p: PathfindingParams = util::params::from_str(
            r#"
            interval_s = 0.5

            [[static_obstacles]]
            position_m = [1.0, 1.0]
            size_m = [0.2, 0.4]
            "#,
        )
        .unwrap();

        assert_eq!(p.interval_s, 0.5);
        assert_eq!(p.goal_epsilon, 0.01);
        assert_eq!(p.static_obstacles.len(), 1);
        assert_eq!(p.static_obstacles[0].heading_rad, 0.0);
    }
}
