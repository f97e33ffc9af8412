//! # Win layer

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::Task;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Top level layer which emits a single [`Task::Win`] and is then done.
#[derive(Debug, Default)]
pub struct WinLayer {
    emitted_win: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl WinLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for WinLayer {
    fn setup(&mut self, _setup: &mut LayerSetup) -> Result<(), SetupError> {
        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.emitted_win
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        self.emitted_win = true;
        Ok(vec![Task::Win])
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        Err(self.reject(&task))
    }
}
