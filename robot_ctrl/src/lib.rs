//! # Robot control library.
//!
//! The control core of the robot. Abstract goals are broken down into actuator commands by a stack
//! of [`layer::Layer`]s, each of which accepts a coarse [`task::Task`] from the layer above and
//! emits finer ones to the layer below. The [`controller::RobotController`] walks the stack once
//! per tick.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Geometry - 2D transforms, rotations and vector helpers
pub mod geom;

/// Tasks - the instructions passed between layers
pub mod task;

/// Layers - the units of control logic making up the stack
pub mod layer;

/// Controller - executes the layer stack once per tick
pub mod controller;

/// Localisation module - fuses localisation sources into a best guess pose
pub mod loc;

/// Pathfinding module - dynamic window trajectory search towards a goal pose
pub mod pathfinding;

/// Mechanisms - thin wrappers around hardware actuators
pub mod mechanism;
