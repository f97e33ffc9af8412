//! # Hardware interface crate.
//!
//! Provides the interfaces through which the control core talks to the robot's hardware: named
//! actuators and input devices. Concrete drivers live outside of the core and are handed to it
//! through a [`HardwareMap`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment interfaces (actuators and input devices)
pub mod eqpt;

/// Simulated equipment, for hosts without hardware and for tests
pub mod sim;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use eqpt::{
    actuator::{Actuator, HardwareMap, HwError, SharedActuator},
    gamepad::{GamepadSnapshot, InputDevice, SharedInputDevice},
};
