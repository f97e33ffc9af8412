//! # Dynamic window planner
//!
//! Brute force search of the bounded acceleration space for the trajectory which best trades off
//! facing the goal, keeping clear of obstacles and moving quickly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace, warn};

use super::{
    obstacle::{Obstacle, StaticObstacle},
    params::PathfindingParams,
    trajectory::{KinematicState, Trajectory},
};
use crate::geom::{self, Transform2};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct DynamicWindowPlanner {
    params: PathfindingParams,
    obstacles: Vec<Box<dyn Obstacle>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DynamicWindowPlanner {
    /// Create a planner, populated with the static obstacles from the parameters.
    pub fn new(params: PathfindingParams) -> Self {
        let obstacles = params
            .static_obstacles
            .iter()
            .map(|p| Box::new(StaticObstacle::from(p)) as Box<dyn Obstacle>)
            .collect();

        Self { params, obstacles }
    }

    pub fn params(&self) -> &PathfindingParams {
        &self.params
    }

    pub fn add_obstacle(&mut self, obstacle: Box<dyn Obstacle>) {
        self.obstacles.push(obstacle);
    }

    pub fn num_obstacles(&self) -> usize {
        self.obstacles.len()
    }

    /// Every point of the search grid, each component in [-1, 1).
    pub fn candidates(&self) -> impl Iterator<Item = Trajectory> {
        let inc = self.params.search_increment;
        let half = (1.0 / inc).round().max(1.0) as i64;

        (-half..half).flat_map(move |a| {
            (-half..half).flat_map(move |l| {
                (-half..half).map(move |y| {
                    Trajectory::new(a as f64 * inc, l as f64 * inc, y as f64 * inc)
                })
            })
        })
    }

    /// Whether the trajectory is achievable and keeps clear of every obstacle.
    pub fn is_admissible(&self, traj: &Trajectory, state: &KinematicState) -> bool {
        traj.magnitude() < 1.0 && self.clearance(traj, state) > 0.0
    }

    /// Heading term of the objective, `c / (angle + k)` where `angle` is between the robot's final
    /// direction and the goal.
    pub fn heading_score(&self, traj: &Trajectory, state: &KinematicState, goal: &Transform2) -> f64 {
        let end = traj.pose_at(state, self.params.interval_s);
        let to_goal = goal.translation.vector - end.translation.vector;
        let angle = geom::angle_between(&geom::direction(&end), &to_goal);

        self.params.smoothing_c / (angle + self.params.smoothing_k)
    }

    /// Minimum signed distance to any obstacle along the trajectory, infinite with no obstacles.
    pub fn clearance(&self, traj: &Trajectory, state: &KinematicState) -> f64 {
        if self.obstacles.is_empty() {
            return std::f64::INFINITY;
        }

        let steps = (1.0 / self.params.clearance_step).round().max(1.0) as usize;
        let mut min = std::f64::INFINITY;

        for i in 0..=steps {
            let t_s = self.params.interval_s * i as f64 / steps as f64;
            let pos = traj.pose_at(state, t_s).translation.vector;

            for obstacle in &self.obstacles {
                min = min.min(obstacle.distance_to(&pos));
            }

            // Already culled, no need to look further
            if min <= 0.0 {
                break;
            }
        }

        min
    }

    /// Translational speed at the end of the trajectory, negative when moving away from the goal.
    pub fn speed_score(&self, traj: &Trajectory, state: &KinematicState, goal: &Transform2) -> f64 {
        let t_s = self.params.interval_s;
        let velocity = traj.velocity_at(state, t_s).0;
        let to_goal = goal.translation.vector - traj.pose_at(state, t_s).translation.vector;

        if velocity.dot(&to_goal) < 0.0 {
            -velocity.norm()
        } else {
            velocity.norm()
        }
    }

    /// Weighted objective of a trajectory.
    pub fn score(&self, traj: &Trajectory, state: &KinematicState, goal: &Transform2) -> f64 {
        let p = &self.params;
        let clearance = self.clearance(traj, state).min(p.clearance_cap_m);

        p.target_angle_coeff * self.heading_score(traj, state, goal)
            + p.clearance_coeff * clearance
            + p.speed_coeff * self.speed_score(traj, state, goal)
    }

    /// Find the best admissible trajectory from `state` towards `goal`.
    ///
    /// If every candidate collides the robot is told to spin in place, so that it keeps moving
    /// until something opens up.
    pub fn plan(&self, state: &KinematicState, goal: &Transform2) -> Trajectory {
        let mut best: Option<(Trajectory, f64)> = None;
        let mut num_admissible = 0usize;

        for traj in self.candidates() {
            if traj.magnitude() >= 1.0 {
                continue;
            }

            let clearance = self.clearance(&traj, state);
            if clearance <= 0.0 {
                continue;
            }
            num_admissible += 1;

            let score = self.score(&traj, state, goal);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((traj, score));
            }
        }

        match best {
            Some((traj, score)) => {
                debug!(
                    "Planned {:?} (score {:.3}, {} admissible)",
                    traj, score, num_admissible
                );
                traj
            }
            None => {
                warn!("No admissible trajectory, spinning in place");
                trace!("State was {:?}", state);
                Trajectory::spin()
            }
        }
    }
}

impl Default for DynamicWindowPlanner {
    fn default() -> Self {
        Self::new(PathfindingParams::default())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
