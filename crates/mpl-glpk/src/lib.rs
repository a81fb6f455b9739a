//! Managed access to GLPK problem objects and the MathProg translator.
//!
//! The crate owns native objects through [`Problem`] and [`Workspace`],
//! sequences the translator pipeline, and bridges the engine's terminal
//! output to a single process-wide callback ([`TerminalHook`]).
//!
//! Every managed type is generic over an [`Engine`]. Enable the `glpk`
//! feature to link `libglpk` and use the [`GlpkProblem`], [`GlpkWorkspace`]
//! and [`GlpkTerminal`] aliases.
//!
//! ```ignore
//! use mpl_glpk::{GlpkProblem, GlpkWorkspace, IntoptParams, SimplexParams, SolutionKind};
//!
//! let mut tran = GlpkWorkspace::new()?;
//! tran.read_model("diet.mod", true)?;
//! tran.read_data("diet.dat")?;
//! tran.generate(None)?;
//! let mut prob = GlpkProblem::new()?;
//! tran.build_problem(&mut prob)?;
//! prob.solve_continuous(&SimplexParams::default())?;
//! prob.solve_integer(&IntoptParams::default())?;
//! tran.post_solve(&prob, SolutionKind::MixedInteger)?;
//! ```

pub mod engine;
#[cfg(feature = "glpk")]
pub mod ffi;
mod handle;
pub mod logging;
mod problem;
mod term;
mod workspace;

pub use engine::{Engine, TermHookFn};
pub use logging::{LoggingError, init_logging};
pub use mpl_solver::{
    Backtracking, Branching, InteriorParams, IntoptParams, MessageLevel, MplError, ObjectKind,
    Ordering, Preprocessing, Pricing, RatioTest, ReturnCode, SimplexMethod, SimplexParams,
    SolutionKind, SolutionStatus, SolveStatus,
};
pub use problem::Problem;
pub use term::{TermCallback, TerminalHook};
pub use workspace::{Workspace, WorkspaceState};

#[cfg(feature = "glpk")]
pub use ffi::{Glpk, glpk_version};

/// Problem object backed by `libglpk`.
#[cfg(feature = "glpk")]
pub type GlpkProblem = Problem<Glpk>;

/// Translator workspace backed by `libglpk`.
#[cfg(feature = "glpk")]
pub type GlpkWorkspace = Workspace<Glpk>;

/// Terminal hook of `libglpk`.
#[cfg(feature = "glpk")]
pub type GlpkTerminal = TerminalHook<Glpk>;
