//! # Drive layers
//!
//! Drive layers are the bottom of the stack. Autonomous tasks (axial moves, turns, linear moves)
//! set a goal distance for each wheel and run until every wheel has covered its goal, then stop the
//! wheels. Teleop tasks (tank and holonomic drive) set wheel powers directly and are done on the
//! next update.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod mecanum;
mod two_wheel;

pub use mecanum::{MecanumDrive, MecanumDriveParams};
pub use two_wheel::{TwoWheelDrive, TwoWheelDriveParams};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Whether a wheel which has moved `delta` since the task started has reached `goal`.
///
/// The wheel must have moved in the same direction as the goal. A zero goal is always reached.
pub(crate) fn wheel_done(delta: f64, goal: f64) -> bool {
    ((delta < 0.0) == (goal < 0.0) && delta.abs() >= goal.abs()) || goal == 0.0
}

/// Scale the values so that the largest magnitude is no more than 1.
///
/// If `scale_up` is set small values are also scaled up so the largest magnitude is exactly 1.
/// Operator input should not be scaled up, so drivers can be gentle.
pub(crate) fn normalize(values: &mut [f64], scale_up: bool) {
    let floor = if scale_up { f64::MIN_POSITIVE } else { 1.0 };
    let max_abs = values.iter().fold(floor, |max, v| max.max(v.abs()));

    for v in values.iter_mut() {
        *v /= max_abs;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
