//! # Two wheel drive

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;

use super::{normalize, wheel_done};
use crate::{
    layer::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask},
    mechanism::Wheel,
    task::Task,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for a differential drive with one driven wheel per side.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwoWheelDriveParams {
    // ---- HARDWARE ----

    /// Names of the left and right drive actuators in the hardware map.
    pub motor_names: [String; 2],

    /// Whether each motor's forward direction drives its wheel backwards.
    pub reversed: [bool; 2],

    // ---- GEOMETRY ----

    /// Half the distance between the driven wheels.
    ///
    /// Units: meters
    pub wheel_span_radius_m: f64,

    /// Wheel revolutions per actuator revolution.
    pub gear_ratio: f64,

    /// Experimentally determined lack of friction between wheel and floor. Goal distances are
    /// directly proportional to this.
    pub slipping_constant: f64,

    // ---- CONTROL ----

    /// Power applied to the wheels during autonomous tasks.
    pub auto_speed_factor: f64,
}

/// Drive layer for a robot with two driven wheels.
///
/// Supports [`Task::AxialMovement`], [`Task::Turn`] and [`Task::TankDrive`].
pub struct TwoWheelDrive {
    params: TwoWheelDriveParams,
    wheels: Option<[Wheel; 2]>,
    start_pos_m: [f64; 2],
    goal_deltas_m: [f64; 2],
    done: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for TwoWheelDriveParams {
    fn default() -> Self {
        Self {
            motor_names: ["left_front_drive".into(), "right_front_drive".into()],
            reversed: [false, false],
            // 15 inch wheel span
            wheel_span_radius_m: 0.1905,
            gear_ratio: 1.0,
            slipping_constant: 1.0,
            auto_speed_factor: 1.0,
        }
    }
}

impl TwoWheelDrive {
    pub fn new(params: TwoWheelDriveParams) -> Self {
        Self {
            params,
            wheels: None,
            start_pos_m: [0.0; 2],
            goal_deltas_m: [0.0; 2],
            done: true,
        }
    }

    /// Load the parameters from a file in the parameters directory.
    pub fn from_params(params_path: &str) -> Result<Self, SetupError> {
        Ok(Self::new(util::params::load(params_path)?))
    }

    fn set_powers(&self, powers: &[f64; 2]) {
        if let Some(wheels) = &self.wheels {
            for (wheel, power) in wheels.iter().zip(powers.iter()) {
                wheel.set_power(*power);
            }
        }
    }

    fn distances(&self) -> [f64; 2] {
        match &self.wheels {
            Some([l, r]) => [l.distance(), r.distance()],
            None => [0.0; 2],
        }
    }
}

impl Default for TwoWheelDrive {
    fn default() -> Self {
        Self::new(TwoWheelDriveParams::default())
    }
}

impl Layer for TwoWheelDrive {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        let hw = setup.hardware();
        let p = &self.params;

        self.wheels = Some([
            Wheel::from_map(hw, &p.motor_names[0], p.reversed[0])?,
            Wheel::from_map(hw, &p.motor_names[1], p.reversed[1])?,
        ]);
        self.start_pos_m = [0.0; 2];
        self.goal_deltas_m = [0.0; 2];
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
        let all_done = (0..2)
            .all(|i| wheel_done(dist[i] - self.start_pos_m[i], self.goal_deltas_m[i]));
        let is_teleop = self.goal_deltas_m.iter().all(|g| *g == 0.0);

        if all_done && !self.done && !is_teleop {
            debug!("{} reached its goal, stopping", self.name());
            self.set_powers(&[0.0; 2]);
        }
        self.done = all_done;

        Ok(Vec::new())
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        let p = &self.params;
        let scale = p.gear_ratio * p.slipping_constant;

        match task {
            Task::AxialMovement { distance_m } => {
                self.goal_deltas_m = [distance_m * scale; 2];
            }
            Task::Turn { angle_rad } => {
                let arc = angle_rad * p.wheel_span_radius_m * scale;
                self.goal_deltas_m = [-arc, arc];
            }
            Task::TankDrive { left, right } => {
                let mut powers = [left, right];
                normalize(&mut powers, false);
                self.set_powers(&powers);

                // Teleop tasks have no goal and are done on the next update
                self.goal_deltas_m = [0.0; 2];
                self.done = false;
                return Ok(());
            }
            t => return Err(self.reject(&t)),
        }

        self.done = false;
        self.start_pos_m = self.distances();

        let mut powers = self.goal_deltas_m;
        normalize(&mut powers, true);
        for power in powers.iter_mut() {
            *power *= self.params.auto_speed_factor;
        }
        self.set_powers(&powers);

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

    fn setup_drive() -> (TwoWheelDrive, Rc<RefCell<SimActuator>>, Rc<RefCell<SimActuator>>) {
        let (left, right) = (SimActuator::shared(), SimActuator::shared());
        let mut hw = HardwareMap::new();
        hw.insert("left_front_drive", left.clone());
        hw.insert("right_front_drive", right.clone());

        let collab = Collaborators::new(hw);
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let mut drive = TwoWheelDrive::default();
        drive
            .setup(&mut LayerSetup::new(&collab, &mut upd, &mut td))
            .unwrap();

        (drive, left, right)
    }

    #[test]
    fn test_missing_motor() {
        let collab = Collaborators::new(HardwareMap::new());
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let mut drive = TwoWheelDrive::default();

        let res = drive.setup(&mut LayerSetup::new(&collab, &mut upd, &mut td));
        assert!(matches!(res, Err(SetupError::Hardware(_))));
    }

    #[test]
    fn test_turn() {
        let (mut drive, left, right) = setup_drive();

        drive.accept_task(Task::Turn { angle_rad: 1.0 }).unwrap();
        assert_eq!(left.borrow().power(), -1.0);
        assert_eq!(right.borrow().power(), 1.0);

        drive.update(&[]).unwrap();
        assert!(!drive.is_task_done());

        left.borrow_mut().step(0.2);
        right.borrow_mut().step(0.2);
        drive.update(&[]).unwrap();
        assert!(drive.is_task_done());
        assert_eq!(left.borrow().power(), 0.0);
        assert_eq!(right.borrow().power(), 0.0);
    }

    #[test]
    fn test_tank_drive() {
        let (mut drive, left, right) = setup_drive();

        assert!(drive.accept_task(Task::LinearMovement { axial_m: 1.0, lateral_m: 0.0 }).is_err());
        assert!(drive.is_task_done());

        drive.accept_task(Task::TankDrive { left: 0.5, right: -2.0 }).unwrap();
        assert_eq!(left.borrow().power(), 0.25);
        assert_eq!(right.borrow().power(), -1.0);
        assert!(!drive.is_task_done());

        // Done on the next update, with the power left running
        drive.update(&[]).unwrap();
        assert!(drive.is_task_done());
        assert_eq!(left.borrow().power(), 0.25);
    }
}
