//! # Mechanism layers
//!
//! Leaf layers for the robot's game piece handling. They sit beside a drive layer at the bottom of
//! the stack, usually inside a [`MultiplexLayer`](super::MultiplexLayer). Every task they accept
//! is applied to the hardware straight away, so they are always done.
//!
//! Both layers stop their actuators when the stack finishes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::Deserialize;

use super::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::{
    mechanism::{Flywheel, Wheel},
    task::Task,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Agitator power while shooting, pushing game pieces towards the feeder.
pub const SHOOT_AGITATOR_POWER: f64 = -1.0;

/// Feeder power while shooting.
pub const SHOOT_FEEDER_POWER: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the shooter and its feed path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShooterIntakeParams {
    // ---- HARDWARE ----

    pub feeder_name: String,
    pub flywheel_name: String,
    pub agitator_name: String,

    // ---- CONTROL ----

    /// Flywheel speed at full power.
    ///
    /// Units: encoder ticks/second
    pub flywheel_max_velocity_tps: f64,
}

/// Parameters for a single roller intake.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeParams {
    pub motor_name: String,

    /// Whether the motor's forward direction spits game pieces out.
    pub reversed: bool,
}

/// Drives the flywheel shooter, the feeder which loads it, and the agitator which keeps game
/// pieces moving towards the feeder.
///
/// Supports [`Task::Feeder`], [`Task::Agitator`], [`Task::Flywheel`] and [`Task::Shoot`].
pub struct ShooterIntakeLayer {
    params: ShooterIntakeParams,
    hardware: Option<ShooterHardware>,
}

#[derive(Clone)]
struct ShooterHardware {
    feeder: Wheel,
    flywheel: Flywheel,
    agitator: Wheel,
}

/// Drives a roller intake. Supports [`Task::Intake`].
pub struct IntakeLayer {
    params: IntakeParams,
    roller: Option<Wheel>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for ShooterIntakeParams {
    fn default() -> Self {
        Self {
            feeder_name: "core_hex".into(),
            flywheel_name: "flywheel".into(),
            agitator_name: "agitator".into(),
            // 28 counts per revolution at 6000 rpm
            flywheel_max_velocity_tps: 2800.0,
        }
    }
}

impl Default for IntakeParams {
    fn default() -> Self {
        Self {
            motor_name: "intake".into(),
            reversed: false,
        }
    }
}

impl ShooterHardware {
    fn stop(&self) {
        self.feeder.set_power(0.0);
        self.flywheel.set_velocity(0.0);
        self.agitator.set_power(0.0);
    }
}

impl ShooterIntakeLayer {
    pub fn new(params: ShooterIntakeParams) -> Self {
        Self {
            params,
            hardware: None,
        }
    }

    /// Load the parameters from a file in the parameters directory.
    pub fn from_params(params_path: &str) -> Result<Self, SetupError> {
        Ok(Self::new(util::params::load(params_path)?))
    }
}

impl Default for ShooterIntakeLayer {
    fn default() -> Self {
        Self::new(ShooterIntakeParams::default())
    }
}

impl Layer for ShooterIntakeLayer {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        let hw = setup.hardware();
        let p = &self.params;

        let hardware = ShooterHardware {
            feeder: Wheel::from_map(hw, &p.feeder_name, false)?,
            flywheel: Flywheel::from_map(hw, &p.flywheel_name, p.flywheel_max_velocity_tps)?,
            agitator: Wheel::from_map(hw, &p.agitator_name, false)?,
        };

        let on_teardown = hardware.clone();
        setup.add_teardown_listener(Box::new(move || on_teardown.stop()));
        self.hardware = Some(hardware);

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        true
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        match self.hardware {
            Some(_) => Ok(Vec::new()),
            None => Err(LayerError::NotSetUp(self.name())),
        }
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        let hw = match &self.hardware {
            Some(hw) => hw,
            None => return Err(self.reject(&task)),
        };

        match task {
            Task::Feeder { power } => hw.feeder.set_power(power),
            Task::Agitator { power } => hw.agitator.set_power(power),
            Task::Flywheel { velocity_tps } => hw.flywheel.set_velocity(velocity_tps),
            Task::Shoot { velocity_tps } => {
                if velocity_tps == 0.0 {
                    hw.stop();
                } else {
                    debug!("Shooting at {} ticks/s", velocity_tps);
                    hw.flywheel.set_velocity(velocity_tps);
                    hw.feeder.set_power(SHOOT_FEEDER_POWER);
                    hw.agitator.set_power(SHOOT_AGITATOR_POWER);
                }
            }
            t => return Err(self.reject(&t)),
        }

        Ok(())
    }
}

impl IntakeLayer {
    pub fn new(params: IntakeParams) -> Self {
        Self {
            params,
            roller: None,
        }
    }
}

impl Default for IntakeLayer {
    fn default() -> Self {
        Self::new(IntakeParams::default())
    }
}

impl Layer for IntakeLayer {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        let roller = Wheel::from_map(
            setup.hardware(),
            &self.params.motor_name,
            self.params.reversed,
        )?;

        let on_teardown = roller.clone();
        setup.add_teardown_listener(Box::new(move || on_teardown.set_power(0.0)));
        self.roller = Some(roller);

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        true
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        match self.roller {
            Some(_) => Ok(Vec::new()),
            None => Err(LayerError::NotSetUp(self.name())),
        }
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        match (&self.roller, task) {
            (Some(roller), Task::Intake { power }) => {
                trace!("Intake power {}", power);
                roller.set_power(power);
                Ok(())
            }
            (_, t) => Err(self.reject(&t)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::{Collaborators, Listener};
    use hw_if::{sim::SimActuator, HardwareMap};
    use std::{cell::RefCell, rc::Rc};

    type Sim = Rc<RefCell<SimActuator>>;

    fn shooter_hw() -> (HardwareMap, Sim, Sim, Sim) {
        let (feeder, flywheel, agitator) =
            (SimActuator::shared(), SimActuator::shared(), SimActuator::shared());
        let mut hw = HardwareMap::new();
        hw.insert("core_hex", feeder.clone());
        hw.insert("flywheel", flywheel.clone());
        hw.insert("agitator", agitator.clone());
        (hw, feeder, flywheel, agitator)
    }

    /// Set up the layer, returning the result and the teardown listeners it registered.
    fn setup_layer<L: Layer>(
        layer: &mut L,
        hw: HardwareMap,
    ) -> (Result<(), SetupError>, Vec<Listener>) {
        let collab = Collaborators::new(hw);
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let res = layer.setup(&mut LayerSetup::new(&collab, &mut upd, &mut td));
        (res, td)
    }

    #[test]
    fn test_shooter_tasks() {
        let (hw, feeder, flywheel, agitator) = shooter_hw();
        let mut layer = ShooterIntakeLayer::default();
        let (res, _) = setup_layer(&mut layer, hw);
        res.unwrap();

        layer.accept_task(Task::Feeder { power: 0.5 }).unwrap();
        layer.accept_task(Task::Flywheel { velocity_tps: 1400.0 }).unwrap();
        assert!(layer.is_task_done());
        assert_eq!(feeder.borrow().power(), 0.5);
        assert_eq!(flywheel.borrow().power(), 0.5);
        assert_eq!(agitator.borrow().power(), 0.0);

        layer.accept_task(Task::Shoot { velocity_tps: 2800.0 }).unwrap();
        assert_eq!(flywheel.borrow().power(), 1.0);
        assert_eq!(feeder.borrow().power(), SHOOT_FEEDER_POWER);
        assert_eq!(agitator.borrow().power(), SHOOT_AGITATOR_POWER);

        layer.accept_task(Task::Shoot { velocity_tps: 0.0 }).unwrap();
        assert_eq!(flywheel.borrow().power(), 0.0);
        assert_eq!(feeder.borrow().power(), 0.0);
        assert_eq!(agitator.borrow().power(), 0.0);

        let err = layer.accept_task(Task::Intake { power: 1.0 }).unwrap_err();
        assert_eq!(err.layer, "ShooterIntakeLayer");
    }

    #[test]
    fn test_shooter_stops_on_teardown() {
        let (hw, _, flywheel, _) = shooter_hw();
        let mut layer = ShooterIntakeLayer::default();
        let (res, mut teardown) = setup_layer(&mut layer, hw);
        res.unwrap();

        layer.accept_task(Task::Flywheel { velocity_tps: -1300.0 }).unwrap();
        assert!(flywheel.borrow().power() < 0.0);

        assert_eq!(teardown.len(), 1);
        for listener in teardown.iter_mut() {
            listener();
        }
        assert_eq!(flywheel.borrow().power(), 0.0);
    }

    #[test]
    fn test_shooter_missing_hardware() {
        let mut hw = HardwareMap::new();
        hw.insert("core_hex", SimActuator::shared());

        let mut layer = ShooterIntakeLayer::default();
        let (res, teardown) = setup_layer(&mut layer, hw);
        assert!(matches!(res, Err(SetupError::Hardware(_))));
        assert!(teardown.is_empty());
        assert!(matches!(layer.update(&[]), Err(LayerError::NotSetUp(_))));
    }

    #[test]
    fn test_intake() {
        let roller = SimActuator::shared();
        let mut hw = HardwareMap::new();
        hw.insert("intake", roller.clone());

        let mut layer = IntakeLayer::new(IntakeParams {
            reversed: true,
            ..Default::default()
        });
        assert!(layer.accept_task(Task::Intake { power: 1.0 }).is_err());

        let (res, _) = setup_layer(&mut layer, hw);
        res.unwrap();

        layer.accept_task(Task::Intake { power: 1.0 }).unwrap();
        assert_eq!(roller.borrow().power(), -1.0);
        assert!(layer.accept_task(Task::Feeder { power: 1.0 }).is_err());
        assert!(layer.is_task_done());
    }
}
