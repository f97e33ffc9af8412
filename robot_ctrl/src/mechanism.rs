//! # Mechanisms
//!
//! Thin wrappers giving layers a robot-frame view of the actuators in the hardware map.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hw_if::{HardwareMap, HwError, SharedActuator};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A driven wheel or roller.
///
/// Wheels mounted on the opposite side of the robot to their motor's forward direction are
/// `reversed`, so positive power and distance are always robot-forwards.
#[derive(Clone)]
pub struct Wheel {
    actuator: SharedActuator,
    reversed: bool,
}

/// A flywheel commanded by speed rather than power.
#[derive(Clone)]
pub struct Flywheel {
    actuator: SharedActuator,

    /// Speed of the flywheel at full power.
    ///
    /// Units: encoder ticks/second
    max_velocity_tps: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Wheel {
    pub fn new(actuator: SharedActuator, reversed: bool) -> Self {
        Self { actuator, reversed }
    }

    /// Look up the named actuator in the hardware map and wrap it.
    pub fn from_map(hw: &HardwareMap, name: &str, reversed: bool) -> Result<Self, HwError> {
        Ok(Self::new(hw.get(name)?, reversed))
    }

    fn sign(&self) -> f64 {
        if self.reversed {
            -1.0
        } else {
            1.0
        }
    }

    /// Distance traveled by the wheel's circumference since the actuator was reset, in meters.
    pub fn distance(&self) -> f64 {
        self.sign() * self.actuator.borrow().get_distance()
    }

    /// Set the wheel's power in the range [-1, 1].
    pub fn set_power(&self, power: f64) {
        self.actuator.borrow_mut().set_power(self.sign() * power);
    }
}

impl Flywheel {
    pub fn from_map(hw: &HardwareMap, name: &str, max_velocity_tps: f64) -> Result<Self, HwError> {
        Ok(Self {
            actuator: hw.get(name)?,
            max_velocity_tps,
        })
    }

    /// Command a speed in encoder ticks per second, saturating at full power.
    pub fn set_velocity(&self, velocity_tps: f64) {
        let power = if self.max_velocity_tps > 0.0 {
            (velocity_tps / self.max_velocity_tps).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.actuator.borrow_mut().set_power(power);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
