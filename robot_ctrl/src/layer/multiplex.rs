//! # Multiplex layer
//!
//! Runs several sibling layers side by side at the same position in the stack, for example a
//! drivetrain and an intake which both sit at the bottom.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{join_names, Layer, LayerError, LayerSetup, SetupError, UnsupportedTask};
use crate::task::Task;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A layer composed of sibling layers which share one position in the stack.
///
/// Tasks are offered to every sibling, and the layer is done as soon as *any* sibling is done.
/// This lets one sibling take new work while another is still busy, at the cost of reporting done
/// while some siblings are still running.
pub struct MultiplexLayer {
    layers: Vec<Box<dyn Layer>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl MultiplexLayer {
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers }
    }
}

impl Layer for MultiplexLayer {
    fn name(&self) -> String {
        format!("MultiplexLayer[{}]", join_names(&self.layers))
    }

    fn setup(&mut self, setup: &mut LayerSetup) -> Result<(), SetupError> {
        if self.layers.is_empty() {
            return Err(SetupError::EmptyLayerList(self.name()));
        }

        for layer in self.layers.iter_mut() {
            layer.setup(setup)?;
        }

        Ok(())
    }

    fn is_task_done(&self) -> bool {
        self.layers.iter().any(|l| l.is_task_done())
    }

    fn update(&mut self, completed: &[Task]) -> Result<Vec<Task>, LayerError> {
        let mut tasks = Vec::new();

        for layer in self.layers.iter_mut() {
            if layer.is_task_done() {
                continue;
            }
            tasks.extend(layer.update(completed)?);
        }

        Ok(tasks)
    }

    fn accept_task(&mut self, task: Task) -> Result<(), UnsupportedTask> {
        let mut any_accepted = false;

        // Every sibling is offered the task, even after one has accepted it
        for layer in self.layers.iter_mut() {
            match layer.accept_task(task.clone()) {
                Ok(()) => any_accepted = true,
                Err(e) => trace!("{}", e),
            }
        }

        if any_accepted {
            Ok(())
        } else {
            Err(self.reject(&task))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::layer::test::Recorder;
    use crate::task::TaskKind;

    fn multiplex() -> MultiplexLayer {
        MultiplexLayer::new(vec![
            Box::new(Recorder::new(TaskKind::Turn)),
            Box::new(Recorder::new(TaskKind::Win)),
        ])
    }

    #[test]
    fn test_accepted_by_second_only() {
        let mut mux = multiplex();

        assert!(mux.accept_task(Task::Win).is_ok());

        // First sibling rejected and is still done, so the multiplex is done too
        assert!(mux.layers[0].is_task_done());
        assert!(!mux.layers[1].is_task_done());
        assert!(mux.is_task_done());
    }

    #[test]
    fn test_done_if_any_sibling_done() {
        let mut mux = multiplex();
        assert!(mux.is_task_done());

        mux.accept_task(Task::Win).unwrap();
        mux.accept_task(Task::Turn { angle_rad: 1.0 }).unwrap();
        assert!(!mux.is_task_done());

        // Only busy siblings are updated, and one finishing is enough
        mux.update(&[]).unwrap();
        assert!(mux.layers.iter().all(|l| l.is_task_done()));
        assert!(mux.is_task_done());
    }

    #[test]
    fn test_rejected_by_all() {
        let mut mux = multiplex();
        let err = mux.accept_task(Task::TankDrive { left: 1.0, right: 1.0 }).unwrap_err();

        assert_eq!(err.layer, "MultiplexLayer[Recorder, Recorder]");
        assert_eq!(err.kind, TaskKind::TankDrive);
        assert!(mux.is_task_done());
    }
}
