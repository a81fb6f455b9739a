//! Managed problem object.

use crate::engine::Engine;
use crate::handle::NativeHandle;
use crate::term;
use mpl_solver::{
    InteriorParams, IntoptParams, MplError, ObjectKind, ReturnCode, SimplexParams, SolutionKind,
    SolutionStatus, SolveStatus,
};
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Owner of one native problem object.
///
/// Created empty with [`Problem::new`] or filled by
/// [`Workspace::build_problem`](crate::Workspace::build_problem). Solves
/// attach their solution inside the native object.
///
/// Solves block the calling thread until the engine returns; the engine
/// offers no way to interrupt them. A `Problem` is neither `Send` nor
/// `Sync`: it must stay on the thread that created it. Run long solves on a
/// dedicated thread that owns its own problem; graceful cancellation is not
/// supported.
pub struct Problem<E: Engine> {
    handle: NativeHandle<E::Prob>,
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> Problem<E> {
    /// Allocate an empty problem object.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Construction`] if the engine returns no object.
    pub fn new() -> Result<Self, MplError> {
        let handle = NativeHandle::from_raw(E::create_prob(), ObjectKind::Problem).inspect_err(
            |_| {
                warn!(
                    component = "problem",
                    operation = "alloc",
                    status = "error",
                    engine = E::NAME,
                    "Native problem allocation returned null"
                );
            },
        )?;
        debug!(
            component = "problem",
            operation = "alloc",
            status = "success",
            engine = E::NAME,
            "Allocated problem object"
        );
        Ok(Problem {
            handle,
            _engine: PhantomData,
        })
    }

    /// Free the native object.
    ///
    /// Idempotent: returns `true` if this call freed it, `false` if it was
    /// already released. Dropping the problem releases it as well.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(prob) => {
                // SAFETY: the pointer came from `E::create_prob` and `take`
                // guarantees it is freed at most once.
                unsafe { E::delete_prob(prob.as_ptr()) };
                debug!(
                    component = "problem",
                    operation = "release",
                    status = "success",
                    engine = E::NAME,
                    "Released problem object"
                );
                true
            }
            None => {
                trace!(
                    component = "problem",
                    operation = "release",
                    status = "success",
                    engine = E::NAME,
                    "Problem object already released"
                );
                false
            }
        }
    }

    pub fn is_released(&self) -> bool {
        !self.handle.is_live()
    }

    pub(crate) fn as_raw(&self) -> Result<*mut E::Prob, MplError> {
        self.handle.get()
    }

    /// Number of rows (constraints).
    pub fn num_rows(&self) -> Result<usize, MplError> {
        let prob = self.as_raw()?;
        // SAFETY: `prob` is live.
        Ok(count(unsafe { E::num_rows(prob) }))
    }

    /// Number of columns (variables).
    pub fn num_cols(&self) -> Result<usize, MplError> {
        let prob = self.as_raw()?;
        // SAFETY: `prob` is live.
        Ok(count(unsafe { E::num_cols(prob) }))
    }

    /// Solve the LP relaxation with the simplex method.
    ///
    /// Infeasible, unbounded and limit outcomes are statuses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::UseAfterRelease`] on a released problem and
    /// [`MplError::InvalidParameter`] for parameters the engine rejects.
    pub fn solve_continuous(&mut self, params: &SimplexParams) -> Result<SolveStatus, MplError> {
        let prob = self.as_raw()?;
        params.validate()?;
        let started = Instant::now();
        // SAFETY: `prob` is live and `params` passed validation.
        let rc = unsafe { E::simplex(prob, params) };
        let status = self.status_after(rc, SolutionKind::Basic, "solve_continuous")?;
        log_solve::<E>("solve_continuous", rc, status, started);
        Ok(status)
    }

    /// Solve the LP relaxation with the interior-point method.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::UseAfterRelease`] on a released problem.
    pub fn solve_interior(&mut self, params: &InteriorParams) -> Result<SolveStatus, MplError> {
        let prob = self.as_raw()?;
        let started = Instant::now();
        // SAFETY: `prob` is live.
        let rc = unsafe { E::interior(prob, params) };
        let status = self.status_after(rc, SolutionKind::InteriorPoint, "solve_interior")?;
        log_solve::<E>("solve_interior", rc, status, started);
        Ok(status)
    }

    /// Solve the integer problem with branch-and-bound.
    ///
    /// Unless `params.presolve` is set, the problem must already hold an
    /// optimal basic solution from [`Problem::solve_continuous`]; the engine
    /// reports a missing one as [`ReturnCode::Root`].
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Solve`] carrying the native return code when the
    /// engine returns nonzero, and [`MplError::UseAfterRelease`] on a
    /// released problem.
    pub fn solve_integer(&mut self, params: &IntoptParams) -> Result<SolveStatus, MplError> {
        let prob = self.as_raw()?;
        params.validate()?;
        let started = Instant::now();
        // SAFETY: `prob` is live and `params` passed validation.
        let rc = unsafe { E::intopt(prob, params) };
        if rc != 0 {
            let code = ReturnCode::from_raw(rc);
            warn!(
                component = "problem",
                operation = "solve_integer",
                status = "warn",
                engine = E::NAME,
                return_code = rc,
                reason = code.message(),
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Branch-and-bound returned nonzero"
            );
            return Err(MplError::Solve { code });
        }
        let status = SolveStatus::from_solution_status(
            self.read_status(SolutionKind::MixedInteger, "solve_integer")?,
        );
        log_solve::<E>("solve_integer", rc, status, started);
        Ok(status)
    }

    /// Status of the stored solution of the given kind.
    pub fn status(&self, kind: SolutionKind) -> Result<SolutionStatus, MplError> {
        self.read_status(kind, "status")
    }

    /// Objective value of the stored solution of the given kind.
    pub fn objective_value(&self, kind: SolutionKind) -> Result<f64, MplError> {
        let prob = self.as_raw()?;
        // SAFETY: `prob` is live.
        Ok(unsafe { E::objective_value(prob, kind) })
    }

    /// Value of column `index` (0-based) in the stored solution of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Precondition`] if `index` is out of range.
    pub fn column_value(&self, kind: SolutionKind, index: usize) -> Result<f64, MplError> {
        let prob = self.as_raw()?;
        let j = self.column_number("column_value", index)?;
        // SAFETY: `prob` is live and `j` is within 1..=num_cols.
        Ok(unsafe { E::column_value(prob, kind, j) })
    }

    /// Symbolic name of column `index` (0-based), if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Precondition`] if `index` is out of range.
    pub fn column_name(&self, index: usize) -> Result<Option<String>, MplError> {
        let prob = self.as_raw()?;
        let j = self.column_number("column_name", index)?;
        // SAFETY: `prob` is live and `j` is within 1..=num_cols.
        let name = unsafe { E::col_name(prob, j) };
        if name.is_null() {
            return Ok(None);
        }
        // SAFETY: non-null names are NUL-terminated and owned by the problem.
        Ok(Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()))
    }

    /// The engine aborts on out-of-range column numbers; check them here.
    fn column_number(&self, operation: &'static str, index: usize) -> Result<c_int, MplError> {
        let num_cols = self.num_cols()?;
        if index >= num_cols {
            return Err(MplError::Precondition {
                operation,
                reason: format!("column {index} out of range (num_cols = {num_cols})"),
            });
        }
        c_int::try_from(index + 1).map_err(|_| MplError::Precondition {
            operation,
            reason: format!("column {index} does not fit a native index"),
        })
    }

    fn read_status(
        &self,
        kind: SolutionKind,
        operation: &'static str,
    ) -> Result<SolutionStatus, MplError> {
        let prob = self.as_raw()?;
        // SAFETY: `prob` is live.
        let (raw, diagnostics) = term::capture(|| unsafe { E::solution_status(prob, kind) });
        SolutionStatus::from_raw(raw).ok_or_else(|| {
            warn!(
                component = "problem",
                operation,
                status = "error",
                engine = E::NAME,
                raw,
                "Engine reported an undocumented solution status"
            );
            MplError::Native {
                operation,
                message: format!("undocumented {kind} solution status {raw}"),
                diagnostics,
            }
        })
    }

    fn status_after(
        &self,
        rc: c_int,
        kind: SolutionKind,
        operation: &'static str,
    ) -> Result<SolveStatus, MplError> {
        if rc == 0 {
            Ok(SolveStatus::from_solution_status(
                self.read_status(kind, operation)?,
            ))
        } else {
            Ok(SolveStatus::from_return_code(ReturnCode::from_raw(rc)))
        }
    }
}

impl<E: Engine> Drop for Problem<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: Engine> fmt::Debug for Problem<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("engine", &E::NAME)
            .field("num_rows", &self.num_rows().ok())
            .field("num_cols", &self.num_cols().ok())
            .field("released", &self.is_released())
            .finish()
    }
}

fn count(raw: c_int) -> usize {
    usize::try_from(raw).unwrap_or(0)
}

fn log_solve<E: Engine>(operation: &'static str, rc: c_int, status: SolveStatus, started: Instant) {
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    if status.is_feasible() {
        debug!(
            component = "problem",
            operation,
            status = "success",
            engine = E::NAME,
            return_code = rc,
            solve_status = %status,
            duration_ms,
            "Solve completed"
        );
    } else {
        warn!(
            component = "problem",
            operation,
            status = "warn",
            engine = E::NAME,
            return_code = rc,
            solve_status = %status,
            duration_ms,
            "Solve completed without a feasible solution"
        );
    }
}
