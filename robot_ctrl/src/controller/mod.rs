//! # Robot controller
//!
//! The controller owns the layer stack and walks it once per tick. Index 0 of the stack is the
//! layer closest to the hardware, the last index the layer closest to the operator or strategy.
//!
//! Each tick:
//!
//! 1. The update listeners are run.
//! 2. The lowest layer which is not done is found, the "frontier". If every layer is done the
//!    stack has finished, the teardown listeners are run and the stack is dropped.
//! 3. Starting at the frontier, each layer is updated and the tasks it emits are fed to the layer
//!    below it, until a layer is reached which has nothing to do or the bottom layer is updated.
//!
//! Layers above the frontier are not updated, they are waiting for the layers beneath them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info, trace, warn};
use thiserror::Error;

use crate::{
    layer::{Collaborators, Layer, LayerError, LayerSetup, Listener, SetupError, UnsupportedTask},
    task::{Task, TaskKind},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of unconsumed tasks listed in an error.
pub const MAX_UNCONSUMED_REPORT_TASKS: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Executes the layer stack.
#[derive(Default)]
pub struct RobotController {
    layers: Option<Vec<LayerInfo>>,
    update_listeners: Vec<Listener>,
    teardown_listeners: Vec<Listener>,
}

/// A layer in the stack along with the tasks it was most recently given.
struct LayerInfo {
    layer: Box<dyn Layer>,
    name: String,

    /// Tasks accepted since the layer was last done. Once the layer is done again these are the
    /// tasks it has completed.
    last_tasks: Vec<Task>,

    /// Whether the layer became busy after its last accepted task.
    saturated: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which abort a tick.
///
/// All of these are contract violations between layers or configuration errors, and none can be
/// recovered from by ticking again.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    UnsupportedTask(#[from] UnsupportedTask),

    #[error(
        "Layer '{layer}' did not consume all tasks from the layer above it. Remaining tasks: {}",
        fmt_remaining(.remaining, .more)
    )]
    UnconsumedTasks {
        layer: String,

        /// Kinds of the first few unconsumed tasks.
        remaining: Vec<TaskKind>,

        /// Whether there were more unconsumed tasks than are listed.
        more: bool,
    },

    #[error("Layer '{layer}' failed during update: {source}")]
    Layer { layer: String, source: LayerError },

    #[error("Could not set up layer '{layer}': {source}")]
    Setup { layer: String, source: SetupError },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl RobotController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install and set up a layer stack, bottom layer first.
    ///
    /// If a localizer is provided its cache is invalidated at the start of every tick, so each
    /// tick resolves the pose at most once. A stack which has not finished is torn down before
    /// being replaced. On error no stack is installed and none of the listeners registered by
    /// the new stack are kept.
    pub fn setup(
        &mut self,
        collaborators: Collaborators,
        stack: Vec<Box<dyn Layer>>,
    ) -> Result<(), ControllerError> {
        if self.layers.is_some() {
            warn!("Replacing a layer stack which has not finished");
            self.finish();
        }

        let mut update_listeners: Vec<Listener> = Vec::new();
        let mut teardown_listeners: Vec<Listener> = Vec::new();

        if let Some(loc) = collaborators.localizer.clone() {
            update_listeners.push(Box::new(move || loc.borrow_mut().invalidate_cache()));
        }

        let mut layers = Vec::with_capacity(stack.len());
        {
            let mut setup = LayerSetup::new(
                &collaborators,
                &mut update_listeners,
                &mut teardown_listeners,
            );

            for mut layer in stack {
                if let Err(e) = layer.setup(&mut setup) {
                    error!("Setup of layer '{}' failed: {}", layer.name(), e);
                    return Err(ControllerError::Setup {
                        layer: layer.name(),
                        source: e,
                    });
                }
                layers.push(LayerInfo::new(layer));
            }
        }

        info!(
            "Layer stack set up: [{}]",
            layers.iter().map(|l| l.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        self.update_listeners.append(&mut update_listeners);
        self.teardown_listeners.append(&mut teardown_listeners);
        self.layers = Some(layers);

        Ok(())
    }

    /// Register a callback run at the start of every tick.
    pub fn add_update_listener(&mut self, listener: Listener) {
        self.update_listeners.push(listener);
    }

    /// Register a callback run once when the stack finishes.
    pub fn add_teardown_listener(&mut self, listener: Listener) {
        self.teardown_listeners.push(listener);
    }

    /// Whether a stack is installed which has not yet finished.
    pub fn is_running(&self) -> bool {
        self.layers.is_some()
    }

    /// Run one control period.
    ///
    /// Returns `true` once the stack has finished (or if none was set up), after which further
    /// ticks do nothing and keep returning `true`.
    pub fn tick(&mut self) -> Result<bool, ControllerError> {
        for listener in self.update_listeners.iter_mut() {
            listener();
        }

        let frontier = match &self.layers {
            Some(layers) => layers.iter().position(|l| !l.layer.is_task_done()),
            None => return Ok(true),
        };

        let mut idx = match frontier {
            Some(i) => i,
            None => {
                self.finish();
                return Ok(true);
            }
        };

        let layers = match self.layers.as_mut() {
            Some(l) => l,
            None => return Ok(true),
        };

        loop {
            // Nothing lies below the bottom layer, so its output is discarded
            if idx == 0 {
                let bottom = &mut layers[0];
                if let Err(e) = bottom.layer.update(&[]) {
                    return Err(bottom.layer_error(e));
                }
                break;
            }

            let (below, above) = layers.split_at_mut(idx);
            let upper = &mut above[0];
            let lower = &mut below[idx - 1];

            let tasks = match upper.layer.update(&lower.last_tasks) {
                Ok(t) => t,
                Err(e) => return Err(upper.layer_error(e)),
            };
            trace!("{} emitted {} task(s)", upper.name, tasks.len());

            let mut tasks = tasks.into_iter();
            while lower.layer.is_task_done() {
                match tasks.next() {
                    Some(task) => lower.accept_task(task)?,
                    None => break,
                }
            }

            let remaining: Vec<Task> = tasks.collect();
            if !remaining.is_empty() {
                let err = ControllerError::UnconsumedTasks {
                    layer: lower.name.clone(),
                    remaining: remaining
                        .iter()
                        .take(MAX_UNCONSUMED_REPORT_TASKS)
                        .map(|t| t.kind())
                        .collect(),
                    more: remaining.len() > MAX_UNCONSUMED_REPORT_TASKS,
                };
                error!("{}", err);
                return Err(err);
            }

            // Nothing to do further down this tick
            if lower.layer.is_task_done() {
                break;
            }

            idx -= 1;
        }

        Ok(false)
    }

    /// Tear down a finished stack.
    fn finish(&mut self) {
        info!("Layer stack finished");

        for listener in self.teardown_listeners.iter_mut() {
            listener();
        }
        self.teardown_listeners.clear();
        self.update_listeners.clear();
        self.layers = None;
    }
}

impl LayerInfo {
    fn new(layer: Box<dyn Layer>) -> Self {
        Self {
            name: layer.name(),
            layer,
            last_tasks: Vec::new(),
            saturated: true,
        }
    }

    fn accept_task(&mut self, task: Task) -> Result<(), ControllerError> {
        if self.saturated {
            self.last_tasks.clear();
        }

        if let Err(e) = self.layer.accept_task(task.clone()) {
            error!("{}", e);
            return Err(e.into());
        }

        self.last_tasks.push(task);
        self.saturated = !self.layer.is_task_done();

        Ok(())
    }

    fn layer_error(&self, source: LayerError) -> ControllerError {
        error!("Layer '{}' failed during update: {}", self.name, source);
        ControllerError::Layer {
            layer: self.name.clone(),
            source,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn fmt_remaining(remaining: &[TaskKind], more: &bool) -> String {
    let mut s = remaining
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if *more {
        s.push_str(" (and more)");
    }
    s
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
