//! # Mecanum drive
//!
//! Four properly oriented mecanum wheels, giving a fully holonomic drivetrain.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::Deserialize;

use super::{normalize, wheel_done};
use crate::{
    layer::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask},
    mechanism::Wheel,
    task::Task,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of wheels, in the order left front, right front, left back, right back.
pub const NUM_WHEELS: usize = 4;

/// Whether each wheel is on the left side of the robot.
const IS_LEFT: [bool; NUM_WHEELS] = [true, false, true, false];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the mecanum drive. Per-wheel arrays are ordered left front, right front, left
/// back, right back.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MecanumDriveParams {
    // ---- HARDWARE ----

    /// Names of the drive actuators in the hardware map.
    pub motor_names: [String; NUM_WHEELS],

    /// Whether each motor's forward direction drives its wheel backwards.
    pub reversed: [bool; NUM_WHEELS],

    // ---- GEOMETRY ----

    /// Half the distance between the left and right wheels.
    ///
    /// Units: meters
    pub wheel_span_radius_m: f64,

    /// Wheel revolutions per actuator revolution.
    pub gear_ratio: [f64; NUM_WHEELS],

    /// Experimentally determined lack of friction between each wheel and the floor.
    pub slipping_constant: [f64; NUM_WHEELS],

    // ---- CONTROL ----

    /// Factor applied to wheel powers during autonomous tasks.
    pub auto_speed_factor: f64,
}

/// Drive layer for a robot on four mecanum wheels.
///
/// Supports [`Task::AxialMovement`], [`Task::Turn`], [`Task::LinearMovement`],
/// [`Task::TankDrive`] and [`Task::HolonomicDrive`].
pub struct MecanumDrive {
    params: MecanumDriveParams,
    wheels: Option<Vec<Wheel>>,
    start_pos_m: [f64; NUM_WHEELS],
    goal_deltas_m: [f64; NUM_WHEELS],
    done: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for MecanumDriveParams {
    fn default() -> Self {
        Self {
            motor_names: [
                "left_front_drive".into(),
                "right_front_drive".into(),
                "left_back_drive".into(),
                "right_back_drive".into(),
            ],
            reversed: [false; NUM_WHEELS],
            wheel_span_radius_m: 0.171,
            gear_ratio: [1.0; NUM_WHEELS],
            slipping_constant: [1.0; NUM_WHEELS],
            auto_speed_factor: 0.5,
        }
    }
}

impl MecanumDrive {
    pub fn new(params: MecanumDriveParams) -> Self {
        Self {
            params,
            wheels: None,
            start_pos_m: [0.0; NUM_WHEELS],
            goal_deltas_m: [0.0; NUM_WHEELS],
            done: true,
        }
    }

    /// Load the parameters from a file in the parameters directory.
    pub fn from_params(params_path: &str) -> Result<Self, SetupError> {
        Ok(Self::new(util::params::load(params_path)?))
    }

    /// Wheel deltas for the given axial (forwards), lateral (right) and yaw (anticlockwise)
    /// values, in arbitrary units.
    fn aly_deltas(axial: f64, lateral: f64, yaw: f64) -> [f64; NUM_WHEELS] {
        [
            axial - lateral - yaw,
            axial + lateral + yaw,
            axial + lateral - yaw,
            axial - lateral + yaw,
        ]
    }

    fn set_powers(&self, powers: &[f64; NUM_WHEELS]) {
        if let Some(wheels) = &self.wheels {
            for (wheel, power) in wheels.iter().zip(powers.iter()) {
                wheel.set_power(*power);
            }
        }
    }

    fn distances(&self) -> [f64; NUM_WHEELS] {
        let mut dist = [0.0; NUM_WHEELS];
        if let Some(wheels) = &self.wheels {
            for (d, wheel) in dist.iter_mut().zip(wheels.iter()) {
                *d = wheel.distance();
            }
        }
        dist
    }

    /// Apply teleop powers, scaled by slip but never scaled up.
    fn drive_teleop(&self, mut powers: [f64; NUM_WHEELS]) {
        for (p, slip) in powers.iter_mut().zip(self.params.slipping_constant.iter()) {
            *p *= slip;
        }
        normalize(&mut powers, false);
        self.set_powers(&powers);
    }
}

impl Default for MecanumDrive {
    fn default() -> Self {
        Self::new(MecanumDriveParams::default())
    }
}

impl Layer for MecanumDrive {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        let hw = setup.hardware();
        let p = &self.params;

        let mut wheels = Vec::with_capacity(NUM_WHEELS);
        for (name, reversed) in p.motor_names.iter().zip(p.reversed.iter()) {
            wheels.push(Wheel::from_map(hw, name, *reversed)?);
        }

        self.wheels = Some(wheels);
        self.start_pos_m = [0.0; NUM_WHEELS];
        self.goal_deltas_m = [0.0; NUM_WHEELS];
        self.done = true;

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.done
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        if self.wheels.is_none() {
            return Err(LayerError::NotSetUp(self.name()));
        }

        let dist = self.distances();
        let mut deltas = [0.0; NUM_WHEELS];
        for i in 0..NUM_WHEELS {
            deltas[i] = dist[i] - self.start_pos_m[i];
        }
        trace!("Wheel deltas {:?}, goals {:?}", deltas, self.goal_deltas_m);

        let all_done = (0..NUM_WHEELS).all(|i| wheel_done(deltas[i], self.goal_deltas_m[i]));
        let is_teleop = self.goal_deltas_m.iter().all(|g| *g == 0.0);

        if all_done && !self.done && !is_teleop {
            debug!("{} reached its goal, stopping", self.name());
            self.set_powers(&[0.0; NUM_WHEELS]);
        }
        self.done = all_done;

        Ok(Vec::new())
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        let p = &self.params;

        let goals = match task {
            Task::AxialMovement { distance_m } => {
                let mut goals = [0.0; NUM_WHEELS];
                for i in 0..NUM_WHEELS {
                    goals[i] = distance_m * p.gear_ratio[i] * p.slipping_constant[i];
                }
                Some(goals)
            }
            Task::Turn { angle_rad } => {
                let mut goals = [0.0; NUM_WHEELS];
                for i in 0..NUM_WHEELS {
                    let side = if IS_LEFT[i] { -1.0 } else { 1.0 };
                    goals[i] = side
                        * angle_rad
                        * p.wheel_span_radius_m
                        * p.gear_ratio[i]
                        * p.slipping_constant[i];
                }
                Some(goals)
            }
            Task::LinearMovement { axial_m, lateral_m } => {
                Some(Self::aly_deltas(axial_m, lateral_m, 0.0))
            }
            Task::TankDrive { left, right } => {
                self.drive_teleop([left, right, left, right]);
                None
            }
            Task::HolonomicDrive { axial, lateral, yaw } => {
                self.drive_teleop(Self::aly_deltas(axial, lateral, yaw));
                None
            }
            t => return Err(self.reject(&t)),
        };

        self.done = false;
        self.start_pos_m = self.distances();

        match goals {
            Some(goals) => {
                self.goal_deltas_m = goals;

                let mut powers = goals;
                normalize(&mut powers, true);
                for power in powers.iter_mut() {
                    *power *= self.params.auto_speed_factor;
                }
                self.set_powers(&powers);
            }
            // Teleop tasks have no goal and are done on the next update
            None => self.goal_deltas_m = [0.0; NUM_WHEELS],
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::Collaborators;
    use hw_if::{sim::SimActuator, HardwareMap};
    use std::{cell::RefCell, rc::Rc};

    fn setup_drive() -> (MecanumDrive, Vec<Rc<RefCell<SimActuator>>>) {
        let params = MecanumDriveParams::default();
        let mut hw = HardwareMap::new();
        let mut acts = Vec::new();
        for name in params.motor_names.iter() {
            let act = SimActuator::shared();
            hw.insert(name.as_str(), act.clone());
            acts.push(act);
        }

        let collab = Collaborators::new(hw);
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let mut drive = MecanumDrive::new(params);
        drive
            .setup(&mut LayerSetup::new(&collab, &mut upd, &mut td))
            .unwrap();

        (drive, acts)
    }

    fn powers(acts: &[Rc<RefCell<SimActuator>>]) -> Vec<f64> {
        acts.iter().map(|a| a.borrow().power()).collect()
    }

    #[test]
    fn test_holonomic() {
        let (mut drive, acts) = setup_drive();

        drive
            .accept_task(Task::HolonomicDrive { axial: 0.5, lateral: 0.25, yaw: 0.0 })
            .unwrap();
        assert_eq!(powers(&acts), vec![0.25, 0.75, 0.75, 0.25]);

        drive.update(&[]).unwrap();
        assert!(drive.is_task_done());

        // Large inputs are scaled down to unit power
        drive
            .accept_task(Task::HolonomicDrive { axial: 1.0, lateral: 1.0, yaw: 0.0 })
            .unwrap();
        assert_eq!(powers(&acts), vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_linear_movement() {
        let (mut drive, acts) = setup_drive();

        drive
            .accept_task(Task::LinearMovement { axial_m: 0.0, lateral_m: 0.5 })
            .unwrap();
        assert_eq!(powers(&acts), vec![-0.5, 0.5, 0.5, -0.5]);

        for act in acts.iter() {
            act.borrow_mut().step(1.0);
        }
        drive.update(&[]).unwrap();
        assert!(drive.is_task_done());
        assert_eq!(powers(&acts), vec![0.0; 4]);
    }

    #[test]
    fn test_turn_sides() {
        let (mut drive, acts) = setup_drive();

        drive.accept_task(Task::Turn { angle_rad: -1.0 }).unwrap();
        assert_eq!(powers(&acts), vec![0.5, -0.5, 0.5, -0.5]);
        assert!(drive.accept_task(Task::Win).is_err());
        assert!(!drive.is_task_done());
    }
}
