//! Managed MathProg translator workspace.

use crate::engine::Engine;
use crate::handle::{NativeHandle, path_to_cstring};
use crate::problem::Problem;
use crate::term;
use mpl_solver::{MplError, ObjectKind, SolutionKind};
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Position of a workspace in the translation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceState {
    /// Freshly allocated; nothing read yet.
    Allocated,
    /// Model section read.
    ModelLoaded,
    /// At least one data section read after the model.
    DataLoaded,
    /// Variables, constraints and objectives generated.
    Generated,
    /// Generated model copied into at least one problem object.
    Built,
    /// Solution copied back and trailing statements executed.
    PostSolved,
    /// Native workspace freed.
    Released,
}

impl WorkspaceState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkspaceState::Allocated => "allocated",
            WorkspaceState::ModelLoaded => "model_loaded",
            WorkspaceState::DataLoaded => "data_loaded",
            WorkspaceState::Generated => "generated",
            WorkspaceState::Built => "built",
            WorkspaceState::PostSolved => "post_solved",
            WorkspaceState::Released => "released",
        }
    }
}

impl fmt::Display for WorkspaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of one native translator workspace.
///
/// Operations must follow the pipeline
/// `read_model → read_data* → generate → build_problem → post_solve`.
/// Calls out of order fail with [`MplError::Precondition`] instead of
/// reaching the engine. Once a native step has failed the engine considers
/// the workspace invalid, so every later call except [`Workspace::release`]
/// is rejected as well.
///
/// Like [`Problem`], a workspace is neither `Send` nor `Sync`.
pub struct Workspace<E: Engine> {
    handle: NativeHandle<E::Tran>,
    state: WorkspaceState,
    failed_step: Option<&'static str>,
    built_dims: Option<(usize, usize)>,
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> Workspace<E> {
    /// Allocate a translator workspace.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Construction`] if the engine returns no object.
    pub fn new() -> Result<Self, MplError> {
        let handle = NativeHandle::from_raw(E::mpl_alloc(), ObjectKind::Workspace).inspect_err(
            |_| {
                warn!(
                    component = "workspace",
                    operation = "alloc",
                    status = "error",
                    engine = E::NAME,
                    "Native workspace allocation returned null"
                );
            },
        )?;
        debug!(
            component = "workspace",
            operation = "alloc",
            status = "success",
            engine = E::NAME,
            "Allocated translator workspace"
        );
        Ok(Workspace {
            handle,
            state: WorkspaceState::Allocated,
            failed_step: None,
            built_dims: None,
            _engine: PhantomData,
        })
    }

    /// Current pipeline state.
    pub fn state(&self) -> WorkspaceState {
        if self.handle.is_live() {
            self.state
        } else {
            WorkspaceState::Released
        }
    }

    pub fn is_released(&self) -> bool {
        !self.handle.is_live()
    }

    /// Native step whose failure invalidated this workspace, if any.
    pub fn failed_step(&self) -> Option<&'static str> {
        self.failed_step
    }

    /// Seed the translator's pseudo-random number generator.
    ///
    /// Only valid before the model is read.
    pub fn init_rand(&mut self, seed: i32) -> Result<(), MplError> {
        let tran = self.enter("init_rand", &[WorkspaceState::Allocated], "before read_model")?;
        // SAFETY: `tran` is live and still in the allocated state.
        unsafe { E::mpl_init_rand(tran, seed) };
        trace!(
            component = "workspace",
            operation = "init_rand",
            status = "success",
            seed,
            "Seeded translator RNG"
        );
        Ok(())
    }

    /// Read the model section from `path`.
    ///
    /// When `skip_data` is `true`, a data section following the model in the
    /// same file is ignored so data can be read from other files instead.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::ModelParse`] if the engine rejects the file.
    pub fn read_model(&mut self, path: impl AsRef<Path>, skip_data: bool) -> Result<(), MplError> {
        let path = path.as_ref();
        let tran = self.enter(
            "read_model",
            &[WorkspaceState::Allocated],
            "a model can only be read into a fresh workspace",
        )?;
        let fname = path_to_cstring(path)?;
        let started = Instant::now();
        // SAFETY: `tran` is live and in the allocated state.
        let (rc, diagnostics) =
            term::capture(|| unsafe { E::mpl_read_model(tran, &fname, skip_data) });
        if rc != 0 {
            self.fail("read_model", rc);
            return Err(MplError::ModelParse {
                path: path.to_path_buf(),
                diagnostics,
            });
        }
        self.advance("read_model", WorkspaceState::ModelLoaded, started);
        Ok(())
    }

    /// Read a data section from `path`. May be called repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::DataParse`] if the engine rejects the file.
    pub fn read_data(&mut self, path: impl AsRef<Path>) -> Result<(), MplError> {
        let path = path.as_ref();
        let tran = self.enter(
            "read_data",
            &[WorkspaceState::ModelLoaded, WorkspaceState::DataLoaded],
            "data is read after the model and before generate",
        )?;
        let fname = path_to_cstring(path)?;
        let started = Instant::now();
        // SAFETY: `tran` is live and holds a model.
        let (rc, diagnostics) = term::capture(|| unsafe { E::mpl_read_data(tran, &fname) });
        if rc != 0 {
            self.fail("read_data", rc);
            return Err(MplError::DataParse {
                path: path.to_path_buf(),
                diagnostics,
            });
        }
        self.advance("read_data", WorkspaceState::DataLoaded, started);
        Ok(())
    }

    /// Generate the model, running the statements that precede `solve`.
    ///
    /// Display output goes to `output` when given, otherwise to the terminal
    /// (and through the [`TerminalHook`](crate::TerminalHook) if installed).
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Generation`] if the engine reports an error.
    pub fn generate(&mut self, output: Option<&Path>) -> Result<(), MplError> {
        let tran = self.enter(
            "generate",
            &[WorkspaceState::ModelLoaded, WorkspaceState::DataLoaded],
            "a model must be read and not yet generated",
        )?;
        let fname = output.map(path_to_cstring).transpose()?;
        let started = Instant::now();
        // SAFETY: `tran` is live and holds a model.
        let (rc, diagnostics) =
            term::capture(|| unsafe { E::mpl_generate(tran, fname.as_deref()) });
        if rc != 0 {
            self.fail("generate", rc);
            return Err(MplError::Generation {
                output: output.map(Path::to_path_buf),
                diagnostics,
            });
        }
        self.advance("generate", WorkspaceState::Generated, started);
        Ok(())
    }

    /// Generate the model, writing display output to `output`.
    pub fn generate_to(&mut self, output: impl AsRef<Path>) -> Result<(), MplError> {
        self.generate(Some(output.as_ref()))
    }

    /// Copy the generated model into `problem`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::Precondition`] before `generate`, and
    /// [`MplError::UseAfterRelease`] if either object is released. In both
    /// cases `problem` is left untouched.
    pub fn build_problem(&mut self, problem: &mut Problem<E>) -> Result<(), MplError> {
        let tran = self.enter(
            "build_problem",
            &[WorkspaceState::Generated, WorkspaceState::Built],
            "the model must be generated first",
        )?;
        let prob = problem.as_raw()?;
        // SAFETY: both pointers are live and the workspace holds a generated model.
        unsafe { E::mpl_build_prob(tran, prob) };
        let dims = (problem.num_rows()?, problem.num_cols()?);
        self.built_dims = Some(dims);
        self.state = WorkspaceState::Built;
        debug!(
            component = "workspace",
            operation = "build_problem",
            status = "success",
            engine = E::NAME,
            num_rows = dims.0,
            num_cols = dims.1,
            "Built problem from model"
        );
        Ok(())
    }

    /// Copy the `kind` solution of `problem` back and run the statements
    /// following `solve`.
    ///
    /// `problem` must be the one built from this workspace and must hold a
    /// solution of the requested kind.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::PostSolve`] if the engine reports an error,
    /// [`MplError::Precondition`] before `build_problem` or when `problem`
    /// no longer matches the built model.
    pub fn post_solve(&mut self, problem: &Problem<E>, kind: SolutionKind) -> Result<(), MplError> {
        let tran = self.enter(
            "post_solve",
            &[WorkspaceState::Built],
            "the model must be built into a problem first",
        )?;
        let prob = problem.as_raw()?;
        let dims = (problem.num_rows()?, problem.num_cols()?);
        if self.built_dims != Some(dims) {
            return Err(MplError::Precondition {
                operation: "post_solve",
                reason: format!(
                    "problem has {} rows and {} columns, built model has {:?}",
                    dims.0, dims.1, self.built_dims
                ),
            });
        }
        let started = Instant::now();
        // SAFETY: both pointers are live and the problem matches the model.
        let (rc, diagnostics) = term::capture(|| unsafe { E::mpl_postsolve(tran, prob, kind) });
        if rc != 0 {
            self.fail("post_solve", rc);
            return Err(MplError::PostSolve {
                solution: kind,
                diagnostics,
            });
        }
        self.advance("post_solve", WorkspaceState::PostSolved, started);
        Ok(())
    }

    /// Free the native workspace.
    ///
    /// Idempotent: returns `true` if this call freed it, `false` if it was
    /// already released. Dropping the workspace releases it as well.
    pub fn release(&mut self) -> bool {
        match self.handle.take() {
            Some(tran) => {
                // SAFETY: the pointer came from `E::mpl_alloc` and `take`
                // guarantees it is freed at most once.
                unsafe { E::mpl_free(tran.as_ptr()) };
                self.state = WorkspaceState::Released;
                debug!(
                    component = "workspace",
                    operation = "release",
                    status = "success",
                    engine = E::NAME,
                    "Released translator workspace"
                );
                true
            }
            None => {
                trace!(
                    component = "workspace",
                    operation = "release",
                    status = "success",
                    engine = E::NAME,
                    "Translator workspace already released"
                );
                false
            }
        }
    }

    /// Check liveness, validity and state before a native call.
    fn enter(
        &self,
        operation: &'static str,
        allowed: &[WorkspaceState],
        expectation: &str,
    ) -> Result<*mut E::Tran, MplError> {
        let tran = self.handle.get()?;
        let rejection = if let Some(step) = self.failed_step {
            Some(format!("workspace invalidated by failed {step}"))
        } else if !allowed.contains(&self.state) {
            Some(format!("state is {}; {}", self.state, expectation))
        } else {
            None
        };
        if let Some(reason) = rejection {
            warn!(
                component = "workspace",
                operation,
                status = "error",
                engine = E::NAME,
                state = %self.state,
                %reason,
                "Rejected out-of-sequence call"
            );
            return Err(MplError::Precondition { operation, reason });
        }
        Ok(tran)
    }

    fn advance(&mut self, operation: &'static str, next: WorkspaceState, started: Instant) {
        debug!(
            component = "workspace",
            operation,
            status = "success",
            engine = E::NAME,
            from = %self.state,
            to = %next,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Translator step completed"
        );
        self.state = next;
    }

    fn fail(&mut self, operation: &'static str, rc: c_int) {
        self.failed_step = Some(operation);
        warn!(
            component = "workspace",
            operation,
            status = "error",
            engine = E::NAME,
            state = %self.state,
            return_code = rc,
            "Translator step failed; workspace invalidated"
        );
    }
}

impl<E: Engine> Drop for Workspace<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: Engine> fmt::Debug for Workspace<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("engine", &E::NAME)
            .field("state", &self.state())
            .field("failed_step", &self.failed_step)
            .finish_non_exhaustive()
    }
}
