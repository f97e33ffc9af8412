//! # Equipment Interface
//!
//! This module defines the interfaces of equipment the control core consumes.

/// Actuators and the named map they are retrieved from
pub mod actuator;

/// Gamepad input devices and their snapshots
pub mod gamepad;
