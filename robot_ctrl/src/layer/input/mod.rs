//! # Input layers
//!
//! Input generators sit at the top of the stack. They never accept a task and never report done,
//! so they are re-queried every time the layers beneath them finish.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod mapping;

pub use mapping::{
    AutoShooterMapping, FunctionLayer, JoystickHoloDriveMapping, TankDriveMapping, TaskMapping,
    TeleopAgitatorMapping, TeleopFeederMapping, TeleopShooterMapping, TriggerIntakeMapping,
    ZeldaDriveMapping, TELEOP_FEEDER_POWER,
};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hw_if::SharedInputDevice;

use super::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::{GamepadInput, GamepadInputTask, Task};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of tasks at the top of the stack.
pub trait InputGenerator {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError>;

    /// Produce the tasks for this tick.
    fn generate(&mut self) -> Result<Vec<Task>, LayerError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Wraps an [`InputGenerator`] into a layer which is never done and accepts no tasks.
pub struct InputLayer<G: InputGenerator> {
    generator: G,
}

/// Snapshots the connected gamepads into a [`Task::GamepadInput`] on every update.
#[derive(Default)]
pub struct GamepadInputGenerator {
    gamepads: [Option<SharedInputDevice>; 2],
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<G: InputGenerator> InputLayer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: InputGenerator> Layer for InputLayer<G> {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        self.generator.setup(setup)
    }

    fn is_task_done(&self) -> bool {
        false
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        self.generator.generate()
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        Err(self.reject(&task))
    }
}

impl GamepadInputGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the usual case of wrapping the generator in its layer.
    pub fn layer() -> InputLayer<Self> {
        InputLayer::new(Self::new())
    }
}

impl InputGenerator for GamepadInputGenerator {
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        self.gamepads = [setup.gamepad(0), setup.gamepad(1)];

        if self.gamepads.iter().all(Option::is_none) {
            return Err(SetupError::NoInputDevice);
        }

        Ok(())
    }

    fn generate(&mut self) -> Result<Vec<Task>, LayerError> {
        // The second operator stands on the far side of the field, facing the robot's rear
        let read = |slot: usize| {
            self.gamepads[slot]
                .as_ref()
                .map(|dev| GamepadInput::from_snapshot(&dev.snapshot(), slot == 1))
        };

        Ok(vec![Task::GamepadInput(GamepadInputTask {
            gamepad_0: read(0),
            gamepad_1: read(1),
        })])
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::Collaborators;
    use hw_if::{sim::SimInputDevice, GamepadSnapshot, HardwareMap};

    #[test]
    fn test_setup_requires_gamepad() {
        let collab = Collaborators::new(HardwareMap::new());
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let mut setup = LayerSetup::new(&collab, &mut upd, &mut td);

        let mut layer = GamepadInputGenerator::layer();
        assert!(matches!(layer.setup(&mut setup), Err(SetupError::NoInputDevice)));
    }

    #[test]
    fn test_generates_snapshots() {
        let pad = SimInputDevice::shared();
        let collab = Collaborators::new(HardwareMap::new()).with_gamepad(1, pad.clone());
        let (mut upd, mut td) = (Vec::new(), Vec::new());
        let mut setup = LayerSetup::new(&collab, &mut upd, &mut td);

        let mut layer = GamepadInputGenerator::layer();
        layer.setup(&mut setup).unwrap();
        assert_eq!(layer.name(), "InputLayer<GamepadInputGenerator>");
        assert!(!layer.is_task_done());
        assert!(layer.accept_task(Task::Win).is_err());

        pad.set(GamepadSnapshot {
            left_stick_x: 0.25,
            left_stick_y: 0.5,
            ..Default::default()
        });

        let tasks = layer.update(&[]).unwrap();
        assert_eq!(tasks.len(), 1);
        match &tasks[0] {
            Task::GamepadInput(input) => {
                assert!(input.gamepad_0.is_none());
                let pad_1 = input.gamepad_1.unwrap();
                assert_eq!(pad_1.left_stick.x, -0.25);
                assert_eq!(pad_1.left_stick.y, 0.5);
            }
            t => panic!("Unexpected task {:?}", t),
        }

        // Still never done
        assert!(!layer.is_task_done());
    }
}
