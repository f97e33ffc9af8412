//! # Pathfinding
//!
//! Receding horizon trajectory optimisation using the dynamic window approach. Every planning
//! interval the planner searches a grid of constant accelerations, predicts where each would take
//! the robot, discards any which are infeasible or hit an obstacle, and keeps the one which best
//! faces the goal while staying clear and moving quickly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod layer;
mod obstacle;
mod params;
mod planner;
mod trajectory;

pub use layer::PathfindingLayer;
pub use obstacle::{CircleObstacle, Obstacle, SegmentObstacle, StaticObstacle, StaticObstacleParams};
pub use params::PathfindingParams;
pub use planner::DynamicWindowPlanner;
pub use trajectory::{KinematicState, Trajectory};
