//! # Input mappings
//!
//! Function layers which map each accepted task to exactly one subtask, used to turn raw gamepad
//! input into drive and mechanism tasks. Mappings only read the primary gamepad.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::layer::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::{GamepadInput, Task, AUTO_FAR_SHOT_TPS, BANK_SHOT_TPS, FAR_SHOT_TPS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Feeder power while a dpad button is held.
pub const TELEOP_FEEDER_POWER: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A pure mapping from one task to one subtask.
pub trait TaskMapping {
    /// Map the task, or `None` if the mapping does not support it.
    fn map(&self, task: &Task) -> Option<Task>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Layer which maps each accepted task to a single subtask using a [`TaskMapping`].
pub struct FunctionLayer<M: TaskMapping> {
    mapping: M,
    pending: Option<Task>,
}

/// Left stick drives and strafes, right stick x turns.
#[derive(Debug, Default, Clone, Copy)]
pub struct JoystickHoloDriveMapping;

/// Each stick's y axis drives one side of the robot.
#[derive(Debug, Default, Clone, Copy)]
pub struct TankDriveMapping;

/// The left stick alone drives and turns, leaving the right stick free.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeldaDriveMapping;

/// Holding the left trigger takes game pieces in, the right trigger spits them out.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriggerIntakeMapping;

/// Dpad up runs the feeder towards the flywheel, dpad down runs it back.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeleopFeederMapping;

/// Dpad left and right run the agitator in either direction.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeleopAgitatorMapping;

/// Manual flywheel control: A for a bank shot, Y for a far shot, X runs the flywheel backwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeleopShooterMapping;

/// One button shooting: the left bumper takes a bank shot, the right bumper a far shot. With
/// neither held the shooter is stopped.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoShooterMapping;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<M: TaskMapping> FunctionLayer<M> {
    pub fn new(mapping: M) -> Self {
        Self {
            mapping,
            pending: None,
        }
    }
}

impl<M: TaskMapping> Layer for FunctionLayer<M> {
    fn setup(&mut self, _setup: &mut LayerSetup) -> Result<(), SetupError> {
        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.pending.is_none()
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        match self.pending.take() {
            Some(t) => Ok(vec![t]),
            None => Err(LayerError::NoTask(self.name())),
        }
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        match self.mapping.map(&task) {
            Some(subtask) => {
                self.pending = Some(subtask);
                Ok(())
            }
            None => Err(self.reject(&task)),
        }
    }
}

impl TaskMapping for JoystickHoloDriveMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        match task {
            Task::GamepadInput(input) => {
                let pad = input.primary()?;
                Some(Task::HolonomicDrive {
                    axial: pad.left_stick.y as f64,
                    lateral: pad.left_stick.x as f64,
                    yaw: -pad.right_stick.x as f64,
                })
            }
            _ => None,
        }
    }
}

impl TaskMapping for TankDriveMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        match task {
            Task::GamepadInput(input) => {
                let pad = input.primary()?;
                Some(Task::TankDrive {
                    left: pad.left_stick.y as f64,
                    right: pad.right_stick.y as f64,
                })
            }
            _ => None,
        }
    }
}

impl TaskMapping for ZeldaDriveMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        match task {
            Task::GamepadInput(input) => {
                let pad = input.primary()?;
                let axial = pad.left_stick.y as f64;
                let yaw = pad.left_stick.x as f64;
                Some(Task::TankDrive {
                    left: axial + yaw,
                    right: axial - yaw,
                })
            }
            _ => None,
        }
    }
}

impl TaskMapping for TriggerIntakeMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        map_gamepad(task, |pad| Task::Intake {
            power: axis(pad.triggers.left, pad.triggers.right),
        })
    }
}

impl TaskMapping for TeleopFeederMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        map_gamepad(task, |pad| Task::Feeder {
            power: TELEOP_FEEDER_POWER * axis(pad.dpad.up, pad.dpad.down),
        })
    }
}

impl TaskMapping for TeleopAgitatorMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        map_gamepad(task, |pad| Task::Agitator {
            power: axis(pad.dpad.left, pad.dpad.right),
        })
    }
}

impl TaskMapping for TeleopShooterMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        map_gamepad(task, |pad| {
            let b = &pad.buttons;
            let velocity_tps = if b.a {
                BANK_SHOT_TPS
            } else if b.y {
                FAR_SHOT_TPS
            } else if b.x {
                -BANK_SHOT_TPS
            } else {
                0.0
            };
            Task::Flywheel { velocity_tps }
        })
    }
}

impl TaskMapping for AutoShooterMapping {
    fn map(&self, task: &Task) -> Option<Task> {
        map_gamepad(task, |pad| {
            let velocity_tps = if pad.bumpers.left {
                BANK_SHOT_TPS
            } else if pad.bumpers.right {
                AUTO_FAR_SHOT_TPS
            } else {
                0.0
            };
            Task::Shoot { velocity_tps }
        })
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply `f` to the primary gamepad of a gamepad input task.
fn map_gamepad<F: Fn(&GamepadInput) -> Task>(task: &Task, f: F) -> Option<Task> {
    match task {
        Task::GamepadInput(input) => input.primary().map(f),
        _ => None,
    }
}

/// 1 for the first button, -1 for the second, 0 for both or neither.
fn axis(positive: bool, negative: bool) -> f64 {
    (positive as i8 - negative as i8) as f64
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
