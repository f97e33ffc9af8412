//! # Queued layers
//!
//! Layers which turn one accepted task into a fixed list of subtasks, emitted one per update.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use log::debug;

use super::{Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::{Task, TaskKind};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A queue of subtasks, emitted one at a time.
///
/// Layers built on a queue are done once the queue has been drained.
#[derive(Debug, Default, Clone)]
pub struct TaskQueue {
    subtasks: VecDeque<Task>,
}

/// An autonomous routine: on receiving [`Task::Win`] it plays a fixed list of subtasks to the layer
/// below, waiting for each to complete before emitting the next.
pub struct RoutineLayer {
    routine: Vec<Task>,
    queue: TaskQueue,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of the queue.
    pub fn set_subtasks<I: IntoIterator<Item = Task>>(&mut self, subtasks: I) {
        self.subtasks = subtasks.into_iter().collect();
    }

    pub fn is_done(&self) -> bool {
        self.subtasks.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.subtasks.len()
    }

    /// Pop the next subtask as a single element batch.
    pub fn next_batch(&mut self, layer: &str) -> Result<Vec<Task>, LayerError> {
        match self.subtasks.pop_front() {
            Some(t) => Ok(vec![t]),
            None => Err(LayerError::NoTask(layer.to_string())),
        }
    }
}

impl RoutineLayer {
    pub fn new(routine: Vec<Task>) -> Self {
        Self {
            routine,
            queue: TaskQueue::new(),
        }
    }
}

impl Layer for RoutineLayer {
    fn setup(&mut self, _setup: &mut LayerSetup) -> Result<(), SetupError> {
        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.queue.is_done()
    }

    fn update(&mut self, _completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        let name = self.name();
        self.queue.next_batch(&name)
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        match task.kind() {
            TaskKind::Win => {
                debug!("Starting routine of {} subtasks", self.routine.len());
                self.queue.set_subtasks(self.routine.iter().cloned());
                Ok(())
            }
            _ => Err(self.reject(&task)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_routine() {
        let mut routine = RoutineLayer::new(vec![
            Task::AxialMovement { distance_m: 1.0 },
            Task::Turn { angle_rad: 1.5 },
        ]);
        assert!(routine.is_task_done());

        assert!(routine.accept_task(Task::Turn { angle_rad: 0.0 }).is_err());
        assert!(routine.is_task_done());

        routine.accept_task(Task::Win).unwrap();
        assert!(!routine.is_task_done());
        assert_eq!(routine.queue.remaining(), 2);

        assert_eq!(
            routine.update(&[]).unwrap(),
            vec![Task::AxialMovement { distance_m: 1.0 }]
        );
        assert!(!routine.is_task_done());
        assert_eq!(routine.update(&[]).unwrap(), vec![Task::Turn { angle_rad: 1.5 }]);
        assert!(routine.is_task_done());

        // Updating a drained queue is a contract violation
        assert!(matches!(routine.update(&[]), Err(LayerError::NoTask(_))));
    }
}
