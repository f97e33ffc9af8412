//! # Layers
//!
//! A layer is one unit of control logic in the stack. It accepts a coarse task from the layer above
//! it, and on each update emits a finite batch of finer tasks for the layer below. The bottom layer
//! drives hardware, the top layer generates tasks from nothing (operator input or a strategy).
//!
//! ## Contract
//!
//! - `is_task_done` is pure, and must return `true` before `accept_task` may be called.
//! - A layer which rejects a task with [`UnsupportedTask`] leaves its state exactly as it was.
//! - `update` returns a finite batch. The batch is fully fed to the layer below before the next
//!   update, so a layer must not emit more tasks than the layer below can take without becoming
//!   busy.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod multiplex;
mod queued;
mod sequence;
mod win;

/// Drive layers, which sit at the bottom of the stack and command the drivetrain
pub mod drive;

/// Input generating layers and the mappings from operator input to drive and mechanism tasks
pub mod input;

/// Mechanism layers, which sit beside the drive and run the shooter and intake
pub mod mechanism;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use multiplex::MultiplexLayer;
pub use queued::{RoutineLayer, TaskQueue};
pub use sequence::TopLayerSequence;
pub use win::WinLayer;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::rc::Rc;

use hw_if::{HardwareMap, HwError, SharedInputDevice};
use thiserror::Error;
use util::{params::LoadError, time::{Clock, SystemClock}};

use crate::{
    loc::SharedLocalizer,
    task::{Task, TaskKind},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A unit of control logic occupying one position in the stack.
pub trait Layer {
    /// Human readable name of the layer, used in logs and errors.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Acquire hardware and collaborators. Called once, before the first tick.
    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError>;

    /// Whether the layer has finished its current task and is ready for another.
    fn is_task_done(&self) -> bool;

    /// Progress the current task.
    ///
    /// `completed` holds the tasks this layer previously emitted which the layer below has since
    /// finished. The returned batch is fed to the layer below.
    fn update(&mut self, completed: &[Task]) -> Result<Vec<Task>, LayerError>;

    /// Start work on a new task from the layer above.
    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask>;

    /// Build the rejection for a task this layer does not understand.
    fn reject(&self, task: &Task) -> UnsupportedTask {
        UnsupportedTask {
            layer: self.name(),
            kind: task.kind(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A callback run by the controller on every tick or on teardown.
pub type Listener = Box<dyn FnMut()>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Everything outside of the stack that the layers may use, supplied by the host at setup.
pub struct Collaborators {
    pub hardware: HardwareMap,

    /// Pose resolution, if the robot has one.
    pub localizer: Option<SharedLocalizer>,

    /// Input devices in slots 0 and 1.
    pub gamepads: [Option<SharedInputDevice>; 2],

    pub clock: Rc<dyn Clock>,
}

/// Information passed to each layer during setup.
pub struct LayerSetup<'a> {
    collaborators: &'a Collaborators,
    update_listeners: &'a mut Vec<Listener>,
    teardown_listeners: &'a mut Vec<Listener>,
}

/// A task was passed to a layer which does not support it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Layer '{layer}' does not support task of type '{kind}'")]
pub struct UnsupportedTask {
    pub layer: String,
    pub kind: TaskKind,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Contract violations raised from inside a layer's update.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Layer '{0}' was updated before it was set up")]
    NotSetUp(String),

    #[error("Layer '{0}' was updated while it had no task")]
    NoTask(String),
}

/// Configuration errors found while setting up the stack.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("At least one input device must be connected to the robot")]
    NoInputDevice,

    #[error("Hardware error: {0}")]
    Hardware(#[from] HwError),

    #[error("Layer '{0}' requires a localizer but none was provided")]
    MissingLocalizer(String),

    #[error("Layer '{0}' was given no child layers")]
    EmptyLayerList(String),

    #[error("Could not load parameters: {0}")]
    Params(#[from] LoadError),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Collaborators {
    /// Collaborators with only a hardware map, using the system clock.
    pub fn new(hardware: HardwareMap) -> Self {
        Self {
            hardware,
            localizer: None,
            gamepads: [None, None],
            clock: Rc::new(SystemClock::new()),
        }
    }

    pub fn with_localizer(mut self, localizer: SharedLocalizer) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Connect an input device to slot 0 or 1. Other slots are ignored.
    pub fn with_gamepad(mut self, slot: usize, device: SharedInputDevice) -> Self {
        if let Some(s) = self.gamepads.get_mut(slot) {
            *s = Some(device);
        }
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<'a> LayerSetup<'a> {
    pub fn new(
        collaborators: &'a Collaborators,
        update_listeners: &'a mut Vec<Listener>,
        teardown_listeners: &'a mut Vec<Listener>,
    ) -> Self {
        Self {
            collaborators,
            update_listeners,
            teardown_listeners,
        }
    }

    pub fn hardware(&self) -> &HardwareMap {
        &self.collaborators.hardware
    }

    pub fn localizer(&self) -> Option<SharedLocalizer> {
        self.collaborators.localizer.clone()
    }

    /// The input device in the given slot, if one is connected.
    pub fn gamepad(&self, slot: usize) -> Option<SharedInputDevice> {
        self.collaborators.gamepads.get(slot).cloned().flatten()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.collaborators.clock.clone()
    }

    /// Register a callback run at the start of every tick.
    pub fn add_update_listener(&mut self, listener: Listener) {
        self.update_listeners.push(listener);
    }

    /// Register a callback run once when the stack finishes.
    pub fn add_teardown_listener(&mut self, listener: Listener) {
        self.teardown_listeners.push(listener);
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Strip the module paths from a type name, keeping generic arguments.
///
/// `a::b::Outer<c::Inner>` becomes `Outer<Inner>`.
pub fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        match path.rfind("::") {
            Some(i) => &path[i + 2..],
            None => path,
        }
    }

    let mut out = String::with_capacity(full.len());
    let mut seg_start = 0;

    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';') {
            out.push_str(last_segment(&full[seg_start..i]));
            out.push(c);
            seg_start = i + c.len_utf8();
        }
    }
    out.push_str(last_segment(&full[seg_start..]));

    out
}

/// Comma separated names of a list of layers.
pub(crate) fn join_names(layers: &[Box<dyn Layer>]) -> String {
    layers.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Layer which accepts a single kind of task and finishes it on the following update.
    pub(crate) struct Recorder {
        pub accepts: TaskKind,
        pub done: bool,
        pub accepted: Vec<Task>,
    }

    impl Recorder {
        pub fn new(accepts: TaskKind) -> Self {
            Self {
                accepts,
                done: true,
                accepted: Vec::new(),
            }
        }
    }

    impl Layer for Recorder {
        fn setup(&mut self, _: &mut LayerSetup) -> Result<(), SetupError> {
            Ok(())
        }

        fn is_task_done(&self) -> bool {
            self.done
        }

        fn update(&mut self, _: &[Task]) -> Result<Vec<Task>, LayerError> {
            self.done = true;
            Ok(Vec::new())
        }

        fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
            if task.kind() != self.accepts {
                return Err(self.reject(&task));
            }
            self.done = false;
            self.accepted.push(task);
            Ok(())
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Outer"), "Outer");
        assert_eq!(
            short_type_name("a::Outer<b::c::Inner, d::Other>"),
            "Outer<Inner, Other>"
        );
        assert_eq!(short_type_name("Plain"), "Plain");

        let rec = Recorder::new(TaskKind::Win);
        assert_eq!(rec.name(), "Recorder");
    }

    #[test]
    fn test_rejection_message() {
        let rec = Recorder::new(TaskKind::Win);
        let err = rec.reject(&Task::Turn { angle_rad: 0.1 });
        assert_eq!(
            format!("{}", err),
            "Layer 'Recorder' does not support task of type 'Turn'"
        );
    }

    #[test]
    fn test_setup_listeners() {
        let collab = Collaborators::new(HardwareMap::new());
        let mut updates = Vec::new();
        let mut teardowns = Vec::new();

        {
            let mut setup = LayerSetup::new(&collab, &mut updates, &mut teardowns);
            assert!(setup.localizer().is_none());
            assert!(setup.gamepad(0).is_none());
            assert!(setup.gamepad(7).is_none());
            setup.add_update_listener(Box::new(|| ()));
            setup.add_teardown_listener(Box::new(|| ()));
            setup.add_teardown_listener(Box::new(|| ()));
        }

        assert_eq!(updates.len(), 1);
        assert_eq!(teardowns.len(), 2);
    }
}
