//! # Actuator interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A powered actuator, such as a drive motor.
pub trait Actuator {
    /// Set the commanded power of the actuator.
    ///
    /// Units: normalised, in the range [-1, 1]
    fn set_power(&mut self, power: f64);

    /// Get the cumulative distance travelled by the actuator's output since start up.
    ///
    /// Units: meters
    fn get_distance(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuators are shared between the hardware map and the layers that drive them.
pub type SharedActuator = Rc<RefCell<dyn Actuator>>;

/// Named collection of the actuators available to the robot.
#[derive(Default)]
pub struct HardwareMap {
    actuators: HashMap<String, SharedActuator>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur when accessing hardware.
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    #[error("No actuator named \"{0}\" is present in the hardware map")]
    UnknownActuator(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HardwareMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actuator to the map under the given name, replacing any actuator already using it.
    pub fn insert<S: Into<String>>(&mut self, name: S, actuator: SharedActuator) {
        let name = name.into();
        debug!("Actuator \"{}\" added to the hardware map", name);
        self.actuators.insert(name, actuator);
    }

    /// Get a handle to the named actuator.
    pub fn get(&self, name: &str) -> Result<SharedActuator, HwError> {
        self.actuators
            .get(name)
            .cloned()
            .ok_or_else(|| HwError::UnknownActuator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actuators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actuators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
    }
}
