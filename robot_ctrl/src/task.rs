//! # Tasks
//!
//! A task is an immutable instruction passed from one layer to the layer directly beneath it. The
//! vocabulary the core needs is a closed enum, matched exhaustively by the layers which accept it.
//! Tasks which only make sense to external plugin layers travel as [`Task::Custom`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{any::Any, fmt, rc::Rc};

use hw_if::GamepadSnapshot;

use crate::geom::Transform2;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum trigger position for the trigger to count as pressed.
pub const TRIGGER_MIN: f32 = 0.3;

/// Flywheel speed for a shot banked off the goal.
///
/// Units: encoder ticks/second
pub const BANK_SHOT_TPS: f64 = 1300.0;

/// Flywheel speed for a manual shot from the far side of the field.
///
/// Units: encoder ticks/second
pub const FAR_SHOT_TPS: f64 = 1900.0;

/// Flywheel speed for an automatic shot from the far side of the field.
///
/// Units: encoder ticks/second
pub const AUTO_FAR_SHOT_TPS: f64 = 1800.0;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// An instruction exchanged between adjacent layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Top level goal: win the match.
    Win,

    /// Move straight forwards (positive) or backwards by the given distance.
    AxialMovement { distance_m: f64 },

    /// Move without turning, axial positive forwards and lateral positive to the right.
    LinearMovement { axial_m: f64, lateral_m: f64 },

    /// Turn on the spot, positive anticlockwise.
    Turn { angle_rad: f64 },

    /// Teleop power for the left and right sides of the drivetrain.
    TankDrive { left: f64, right: f64 },

    /// Teleop holonomic power. Axial positive forwards, lateral positive to the right, yaw
    /// positive anticlockwise.
    HolonomicDrive { axial: f64, lateral: f64, yaw: f64 },

    /// Drive to a pose on the field.
    MoveToField { goal: Transform2 },

    /// Intake roller power, positive to take game pieces in.
    Intake { power: f64 },

    /// Feeder power, positive towards the flywheel.
    Feeder { power: f64 },

    /// Agitator power, positive to the left.
    Agitator { power: f64 },

    /// Flywheel speed in encoder ticks per second, negative to clear a jam.
    Flywheel { velocity_tps: f64 },

    /// Spin the flywheel up and feed it. A zero speed stops the whole shooter.
    Shoot { velocity_tps: f64 },

    /// A snapshot of the operators' gamepads.
    GamepadInput(GamepadInputTask),

    /// A task understood only by layers outside of the core.
    Custom(CustomTask),
}

/// The kind of a task, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Win,
    AxialMovement,
    LinearMovement,
    Turn,
    TankDrive,
    HolonomicDrive,
    MoveToField,
    Intake,
    Feeder,
    Agitator,
    Flywheel,
    Shoot,
    GamepadInput,
    Custom(&'static str),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gamepad input captured in one tick, from up to two connected gamepads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadInputTask {
    pub gamepad_0: Option<GamepadInput>,
    pub gamepad_1: Option<GamepadInput>,
}

/// Input from one gamepad, in the robot's convention: stick y axes are positive upwards and the
/// triggers are digital.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadInput {
    pub left_stick: Joystick,
    pub right_stick: Joystick,
    pub bumpers: ButtonPair,
    pub triggers: ButtonPair,
    pub dpad: DirectionalPad,
    pub buttons: Buttons,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Joystick {
    /// Positive to the right
    pub x: f32,

    /// Positive upwards
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonPair {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionalPad {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Buttons {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

/// A task carrying a payload only an external layer knows how to interpret.
///
/// Equality is identity of the payload, so a custom task compares equal only to its own clones.
#[derive(Clone)]
pub struct CustomTask {
    /// Name of the task type, used in diagnostics.
    pub name: &'static str,

    pub payload: Rc<dyn Any>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Win => TaskKind::Win,
            Task::AxialMovement { .. } => TaskKind::AxialMovement,
            Task::LinearMovement { .. } => TaskKind::LinearMovement,
            Task::Turn { .. } => TaskKind::Turn,
            Task::TankDrive { .. } => TaskKind::TankDrive,
            Task::HolonomicDrive { .. } => TaskKind::HolonomicDrive,
            Task::MoveToField { .. } => TaskKind::MoveToField,
            Task::Intake { .. } => TaskKind::Intake,
            Task::Feeder { .. } => TaskKind::Feeder,
            Task::Agitator { .. } => TaskKind::Agitator,
            Task::Flywheel { .. } => TaskKind::Flywheel,
            Task::Shoot { .. } => TaskKind::Shoot,
            Task::GamepadInput(_) => TaskKind::GamepadInput,
            Task::Custom(c) => TaskKind::Custom(c.name),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Win => write!(f, "Win"),
            TaskKind::AxialMovement => write!(f, "AxialMovement"),
            TaskKind::LinearMovement => write!(f, "LinearMovement"),
            TaskKind::Turn => write!(f, "Turn"),
            TaskKind::TankDrive => write!(f, "TankDrive"),
            TaskKind::HolonomicDrive => write!(f, "HolonomicDrive"),
            TaskKind::MoveToField => write!(f, "MoveToField"),
            TaskKind::Intake => write!(f, "Intake"),
            TaskKind::Feeder => write!(f, "Feeder"),
            TaskKind::Agitator => write!(f, "Agitator"),
            TaskKind::Flywheel => write!(f, "Flywheel"),
            TaskKind::Shoot => write!(f, "Shoot"),
            TaskKind::GamepadInput => write!(f, "GamepadInput"),
            TaskKind::Custom(name) => write!(f, "Custom({})", name),
        }
    }
}

impl GamepadInputTask {
    /// The first connected gamepad, preferring slot 0.
    pub fn primary(&self) -> Option<&GamepadInput> {
        self.gamepad_0.as_ref().or_else(|| self.gamepad_1.as_ref())
    }
}

impl GamepadInput {
    /// Convert a raw device snapshot into robot convention.
    ///
    /// If `facing_away` is set the gamepad is held by an operator facing the robot's rear, so the
    /// x axes are mirrored while the device's downward y axis already points robot-forwards.
    pub fn from_snapshot(snap: &GamepadSnapshot, facing_away: bool) -> Self {
        let (x_sign, y_sign) = if facing_away { (-1.0, 1.0) } else { (1.0, -1.0) };

        Self {
            left_stick: Joystick {
                x: x_sign * snap.left_stick_x,
                y: y_sign * snap.left_stick_y,
            },
            right_stick: Joystick {
                x: x_sign * snap.right_stick_x,
                y: y_sign * snap.right_stick_y,
            },
            bumpers: ButtonPair {
                left: snap.left_bumper,
                right: snap.right_bumper,
            },
            triggers: ButtonPair {
                left: snap.left_trigger >= TRIGGER_MIN,
                right: snap.right_trigger >= TRIGGER_MIN,
            },
            dpad: DirectionalPad {
                up: snap.dpad_up,
                right: snap.dpad_right,
                down: snap.dpad_down,
                left: snap.dpad_left,
            },
            buttons: Buttons {
                a: snap.a,
                b: snap.b,
                x: snap.x,
                y: snap.y,
            },
        }
    }
}

impl CustomTask {
    pub fn new<T: Any>(name: &'static str, payload: T) -> Self {
        Self {
            name,
            payload: Rc::new(payload),
        }
    }

    /// Borrow the payload as a concrete type, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTask").field("name", &self.name).finish()
    }
}

impl PartialEq for CustomTask {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.payload, &other.payload)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
