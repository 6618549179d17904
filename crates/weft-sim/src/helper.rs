//! Per-solver parallel-execution helper.
//!
//! The helper owns its solver. Starting a step moves the solver into a
//! scheduler job; waiting moves it back. While a step is in flight the
//! solver is unreachable, so nothing can read or write its particle
//! buffers mid-step. A step that panics still hands the solver back,
//! with the panic reported as [`WeftError::StepPanicked`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::trace;
use weft_jobs::{JobScheduler, TaskHandle};
use weft_solver::{Solver, StepResult};
use weft_types::{WeftError, WeftResult};

type StepOutcome = (Box<dyn Solver>, WeftResult<StepResult>);

/// Pairs one solver with its in-flight step, if any.
pub struct StepHelper {
    solver: Option<Box<dyn Solver>>,
    pending: Option<TaskHandle<StepOutcome>>,
}

impl StepHelper {
    pub fn new(solver: Box<dyn Solver>) -> Self {
        Self {
            solver: Some(solver),
            pending: None,
        }
    }

    /// Submits `solver.step(dt)` to the scheduler. Returns false if a
    /// step is already in flight.
    pub fn start(&mut self, scheduler: &JobScheduler, dt: f32) -> bool {
        let Some(mut solver) = self.solver.take() else {
            return false;
        };
        trace!(solver = solver.name(), dt, "submitting solver step");
        self.pending = Some(scheduler.submit(move || {
            // The solver must come back even when its step unwinds.
            let result = panic::catch_unwind(AssertUnwindSafe(|| solver.step(dt)))
                .unwrap_or_else(|payload| Err(WeftError::StepPanicked(panic_message(&*payload))));
            (solver, result)
        }));
        true
    }

    /// Blocks until the in-flight step finishes and takes the solver back.
    ///
    /// Returns `None` when nothing was in flight.
    pub fn wait(&mut self) -> Option<WeftResult<StepResult>> {
        let handle = self.pending.take()?;
        let (solver, result) = handle.wait();
        self.solver = Some(solver);
        Some(result)
    }

    pub fn is_stepping(&self) -> bool {
        self.pending.is_some()
    }

    /// The solver, unless a step is in flight.
    pub fn solver(&self) -> Option<&dyn Solver> {
        match &self.solver {
            Some(solver) => Some(&**solver),
            None => None,
        }
    }

    pub fn solver_mut(&mut self) -> Option<&mut dyn Solver> {
        match &mut self.solver {
            Some(solver) => Some(&mut **solver),
            None => None,
        }
    }

    /// Finishes any in-flight step and releases the solver.
    pub fn into_solver(mut self) -> Option<Box<dyn Solver>> {
        self.wait();
        self.solver.take()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl Drop for StepHelper {
    fn drop(&mut self) {
        // Never leave a job running against a solver nobody owns.
        self.wait();
    }
}
