//! # Top layer sequence
//!
//! Chains mutually exclusive top level layers, for example an autonomous routine followed by
//! teleop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{join_names, Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::Task;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Runs a list of top level layers one after another.
pub struct TopLayerSequence {
    layers: Vec<Box<dyn Layer>>,
    current: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TopLayerSequence {
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers, current: 0 }
    }

    fn has_next(&self) -> bool {
        self.current + 1 < self.layers.len()
    }

    fn advance(&mut self) {
        self.current += 1;
        if let Some(layer) = self.layers.get(self.current) {
            info!("{} moving on to {}", self.name(), layer.name());
        }
    }
}

impl Layer for TopLayerSequence {
    fn name(&self) -> String {
        format!("TopLayerSequence[{}]", join_names(&self.layers))
    }

    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        if self.layers.is_empty() {
            return Err(SetupError::EmptyLayerList(self.name()));
        }

        for layer in self.layers.iter_mut() {
            layer.setup(setup)?;
        }
        self.current = 0;

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        match self.layers.get(self.current) {
            Some(layer) => layer.is_task_done() && !self.has_next(),
            None => true,
        }
    }

    fn update(&mut self, completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        // Skip over layers which finished without ever being updated
        while self.has_next() && self.layers[self.current].is_task_done() {
            self.advance();
        }

        let tasks = match self.layers.get_mut(self.current) {
            Some(layer) => layer.update(completed)?,
            None => return Ok(Vec::new()),
        };

        if self.layers[self.current].is_task_done() && self.has_next() {
            self.advance();
        }

        Ok(tasks)
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        Err(self.reject(&task))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
