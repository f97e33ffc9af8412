//! # Simulated equipment
//!
//! Stand-ins for real hardware. A [`SimActuator`] integrates its commanded power into travelled
//! distance whenever the owner calls [`SimActuator::step`], and a [`SimInputDevice`] reports
//! whatever snapshot it was last given.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::eqpt::{
    actuator::Actuator,
    gamepad::{GamepadSnapshot, InputDevice},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Speed of a simulated actuator at full power.
///
/// Units: meters/second
pub const DEFAULT_MAX_SPEED_MS: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated actuator.
#[derive(Debug, Clone)]
pub struct SimActuator {
    power: f64,
    distance_m: f64,
    max_speed_ms: f64,
}

/// Simulated input device.
#[derive(Debug, Default)]
pub struct SimInputDevice {
    snapshot: Cell<GamepadSnapshot>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimActuator {
    pub fn new(max_speed_ms: f64) -> Self {
        Self {
            power: 0.0,
            distance_m: 0.0,
            max_speed_ms,
        }
    }

    /// Create an actuator with the default max speed, ready to be placed in a `HardwareMap`.
    pub fn shared() -> Rc<RefCell<SimActuator>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Advance the simulation by `dt_s` seconds at the current power.
    pub fn step(&mut self, dt_s: f64) {
        self.distance_m += self.power * self.max_speed_ms * dt_s;
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    /// Teleport the actuator to a given distance, as if it had been pushed.
    pub fn set_distance(&mut self, distance_m: f64) {
        self.distance_m = distance_m;
    }
}

impl Default for SimActuator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED_MS)
    }
}

impl Actuator for SimActuator {
    fn set_power(&mut self, power: f64) {
        self.power = power;
    }

    fn get_distance(&self) -> f64 {
        self.distance_m
    }
}

impl SimInputDevice {
    pub fn new(snapshot: GamepadSnapshot) -> Self {
        Self {
            snapshot: Cell::new(snapshot),
        }
    }

    /// Create a device with every control at rest.
    pub fn shared() -> Rc<SimInputDevice> {
        Rc::new(Self::default())
    }

    pub fn set(&self, snapshot: GamepadSnapshot) {
        self.snapshot.set(snapshot);
    }
}

impl InputDevice for SimInputDevice {
    fn snapshot(&self) -> GamepadSnapshot {
        self.snapshot.get()
    }
}
