//! # Gamepad input devices

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A device from which the operator's inputs are read.
pub trait InputDevice {
    /// Read the current state of every control on the device.
    fn snapshot(&self) -> GamepadSnapshot;
}

/// Input devices are shared between the host, which keeps them current, and the core.
pub type SharedInputDevice = Rc<dyn InputDevice>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw state of a gamepad at one instant, as reported by the device.
///
/// Stick axes follow the device convention: x positive to the right, y positive *downwards*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadSnapshot {
    pub left_stick_x: f32,
    pub left_stick_y: f32,
    pub right_stick_x: f32,
    pub right_stick_y: f32,

    pub left_bumper: bool,
    pub right_bumper: bool,

    /// Analogue trigger positions in the range [0, 1].
    pub left_trigger: f32,
    pub right_trigger: f32,

    pub dpad_up: bool,
    pub dpad_right: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,

    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}
