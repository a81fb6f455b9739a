//! Error types for the managed layer.

use crate::{ReturnCode, SolutionKind};
use std::path::PathBuf;

/// Kind of native object a managed wrapper owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Problem object.
    Problem,
    /// MathProg translator workspace.
    Workspace,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Problem => "problem",
            ObjectKind::Workspace => "translator workspace",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for every managed operation.
///
/// Native steps that fail carry the diagnostic text the terminal hook saw
/// while the step ran (empty when no hook was installed).
#[derive(Debug, Clone, PartialEq)]
pub enum MplError {
    /// Native allocation returned no object.
    Construction { object: ObjectKind },
    /// Model section could not be read.
    ModelParse {
        path: PathBuf,
        diagnostics: Vec<String>,
    },
    /// Data section could not be read.
    DataParse {
        path: PathBuf,
        diagnostics: Vec<String>,
    },
    /// Model generation failed.
    Generation {
        output: Option<PathBuf>,
        diagnostics: Vec<String>,
    },
    /// Post-solve statements failed.
    PostSolve {
        solution: SolutionKind,
        diagnostics: Vec<String>,
    },
    /// Native solve returned a nonzero code.
    Solve { code: ReturnCode },
    /// The native object has already been released.
    UseAfterRelease { object: ObjectKind },
    /// Operation invoked outside the required call sequence.
    Precondition {
        operation: &'static str,
        reason: String,
    },
    /// Path cannot be passed to the engine.
    InvalidPath { path: PathBuf },
    /// Control parameter outside the range the engine accepts.
    InvalidParameter { name: &'static str, reason: String },
    /// Engine answered outside its documented contract.
    Native {
        operation: &'static str,
        message: String,
        diagnostics: Vec<String>,
    },
}

impl MplError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            MplError::Construction { .. } => "NATIVE_ALLOC_FAILED",
            MplError::ModelParse { .. } => "MODEL_PARSE",
            MplError::DataParse { .. } => "DATA_PARSE",
            MplError::Generation { .. } => "MODEL_GENERATE",
            MplError::PostSolve { .. } => "MODEL_POSTSOLVE",
            MplError::Solve { code } => match code {
                ReturnCode::NoPrimalFeasible | ReturnCode::NoFeasible => "SOLVER_INFEASIBLE",
                ReturnCode::TimeLimit => "SOLVER_TIME_LIMIT",
                ReturnCode::IterationLimit => "SOLVER_ITERATION_LIMIT",
                ReturnCode::Root => "SOLVER_NO_ROOT_BASIS",
                _ => "SOLVER_FAILED",
            },
            MplError::UseAfterRelease { .. } => "HANDLE_RELEASED",
            MplError::Precondition { .. } => "CALL_SEQUENCE",
            MplError::InvalidPath { .. } => "PATH_INVALID",
            MplError::InvalidParameter { .. } => "PARAMETER_INVALID",
            MplError::Native { .. } => "NATIVE_FAILURE",
        }
    }

    /// Diagnostic text captured while the failing native step ran.
    pub fn diagnostics(&self) -> &[String] {
        match self {
            MplError::ModelParse { diagnostics, .. }
            | MplError::DataParse { diagnostics, .. }
            | MplError::Generation { diagnostics, .. }
            | MplError::PostSolve { diagnostics, .. }
            | MplError::Native { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }

    pub fn is_use_after_release(&self) -> bool {
        matches!(self, MplError::UseAfterRelease { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, MplError::Precondition { .. })
    }
}

impl std::fmt::Display for MplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MplError::Construction { object } => {
                write!(f, "[{}] Failed to allocate native {}", self.code(), object)
            }
            MplError::ModelParse { path, .. } => write!(
                f,
                "[{}] Failed to read model from {}",
                self.code(),
                path.display()
            ),
            MplError::DataParse { path, .. } => write!(
                f,
                "[{}] Failed to read data from {}",
                self.code(),
                path.display()
            ),
            MplError::Generation { output, .. } => match output {
                Some(path) => write!(
                    f,
                    "[{}] Model generation failed (output to {})",
                    self.code(),
                    path.display()
                ),
                None => write!(f, "[{}] Model generation failed", self.code()),
            },
            MplError::PostSolve { solution, .. } => write!(
                f,
                "[{}] Post-solve failed for {} solution",
                self.code(),
                solution
            ),
            MplError::Solve { code } => write!(f, "[{}] Solve failed: {}", self.code(), code),
            MplError::UseAfterRelease { object } => {
                write!(f, "[{}] Native {} already released", self.code(), object)
            }
            MplError::Precondition { operation, reason } => {
                write!(f, "[{}] {} called out of sequence: {}", self.code(), operation, reason)
            }
            MplError::InvalidPath { path } => write!(
                f,
                "[{}] Path contains an interior NUL byte: {}",
                self.code(),
                path.display()
            ),
            MplError::InvalidParameter { name, reason } => {
                write!(f, "[{}] Invalid parameter {}: {}", self.code(), name, reason)
            }
            MplError::Native {
                operation, message, ..
            } => {
                write!(f, "[{}] {}: {}", self.code(), operation, message)
            }
        }
    }
}

impl std::error::Error for MplError {}
