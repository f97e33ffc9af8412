//! # Pathfinding layer

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use std::rc::Rc;

use util::{maths::get_ang_dist_2pi, time::Clock};

use super::{
    obstacle::Obstacle,
    params::PathfindingParams,
    planner::DynamicWindowPlanner,
    trajectory::{KinematicState, Trajectory},
};
use crate::{
    geom::{self, Transform2},
    layer::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask},
    loc::SharedLocalizer,
    task::Task,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drives a holonomic robot to the goal of a [`Task::MoveToField`], steering around obstacles.
///
/// Emits one [`Task::HolonomicDrive`] per update. The trajectory is recomputed every planning
/// interval and reused in between. Arrival is checked against the pose resolved during the last
/// update, and the update which finds the goal reached commands the drive to stop.
pub struct PathfindingLayer {
    planner: DynamicWindowPlanner,
    localizer: Option<SharedLocalizer>,
    clock: Option<Rc<dyn Clock>>,

    goal: Option<Transform2>,
    trajectory: Trajectory,

    /// Whether the last resolved pose was within tolerance of the goal.
    arrived: bool,

    /// Time of the last recomputation, `None` forces a recomputation on the next update.
    last_calc_s: Option<f64>,

    /// Pose and time of the previous update, used to estimate velocity.
    last_pose: Option<(Transform2, f64)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PathfindingLayer {
    pub fn new(params: PathfindingParams) -> Self {
        Self {
            planner: DynamicWindowPlanner::new(params),
            localizer: None,
            clock: None,
            goal: None,
            trajectory: Trajectory::default(),
            arrived: false,
            last_calc_s: None,
            last_pose: None,
        }
    }

    /// Load the parameters from a file in the parameters directory.
    pub fn from_params(params_path: &str) -> Result<Self, SetupError> {
        Ok(Self::new(util::params::load(params_path)?))
    }

    pub fn add_obstacle(&mut self, obstacle: Box<dyn Obstacle>) {
        self.planner.add_obstacle(obstacle);
    }

    /// The trajectory currently being followed.
    pub fn trajectory(&self) -> Trajectory {
        self.trajectory
    }

    fn current_pose(&self) -> Option<Transform2> {
        self.localizer
            .as_ref()
            .map(|loc| loc.borrow_mut().resolve_transform())
    }

    fn is_at(&self, pose: &Transform2, goal: &Transform2) -> bool {
        let delta = pose.inverse() * goal;
        let eps = self.planner.params().goal_epsilon;

        delta.translation.vector.norm() < eps && geom::heading(&delta).abs() < eps
    }

    /// Estimate the robot's velocity from its movement since the last update.
    fn estimate_state(&mut self, pose: Transform2, now_s: f64) -> KinematicState {
        let mut state = KinematicState::at_rest(pose);

        if let Some((prev, prev_s)) = self.last_pose {
            let dt = now_s - prev_s;
            if dt > 0.0 {
                state.velocity_ms = (pose.translation.vector - prev.translation.vector) / dt;
                state.yaw_rate_rads =
                    get_ang_dist_2pi(geom::heading(&prev), geom::heading(&pose)) / dt;
            }
        }

        self.last_pose = Some((pose, now_s));
        state
    }
}

impl Default for PathfindingLayer {
    fn default() -> Self {
        Self::new(PathfindingParams::default())
    }
}

impl Layer for PathfindingLayer {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        let localizer = setup
            .localizer()
            .ok_or_else(|| SetupError::MissingLocalizer(self.name()))?;
        self.localizer = Some(localizer);
        self.clock = Some(setup.clock());

        self.goal = None;
        self.trajectory = Trajectory::default();
        self.arrived = false;
        self.last_calc_s = None;
        self.last_pose = None;

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.goal.is_none() || self.arrived
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        let goal = self.goal.ok_or_else(|| LayerError::NoTask(self.name()))?;
        let (pose, now_s) = match (self.current_pose(), &self.clock) {
            (Some(pose), Some(clock)) => (pose, clock.now_s()),
            _ => return Err(LayerError::NotSetUp(self.name())),
        };

        let state = self.estimate_state(pose, now_s);

        if self.is_at(&pose, &goal) {
            debug!("{} reached its goal, stopping", self.name());
            self.arrived = true;
            self.trajectory = Trajectory::default();
            return Ok(vec![Task::HolonomicDrive {
                axial: 0.0,
                lateral: 0.0,
                yaw: 0.0,
            }]);
        }

        let interval_s = self.planner.params().interval_s;

        let stale = match self.last_calc_s {
            Some(t) => now_s - t > interval_s,
            None => true,
        };
        if stale {
            self.trajectory = self.planner.plan(&state, &goal);
            self.last_calc_s = Some(now_s);
        } else {
            trace!("Reusing trajectory {:?}", self.trajectory);
        }

        // Trajectories take lateral as leftwards, drives take it as rightwards
        Ok(vec![Task::HolonomicDrive {
            axial: self.trajectory.axial,
            lateral: -self.trajectory.lateral,
            yaw: self.trajectory.yaw,
        }])
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        match task {
            Task::MoveToField { goal } => {
                debug!(
                    "{} moving to {:?} facing {:.3} rad",
                    self.name(),
                    goal.translation.vector,
                    geom::heading(&goal)
                );
                self.goal = Some(goal);
                self.arrived = false;
                self.last_calc_s = None;
                Ok(())
            }
            t => Err(self.reject(&t)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
