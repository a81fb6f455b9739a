//! Solve status types and native status codes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which of the engine's solutions an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolutionKind {
    /// Basic solution produced by the simplex method.
    Basic,
    /// Interior-point solution.
    InteriorPoint,
    /// Mixed integer solution produced by branch-and-bound.
    MixedInteger,
}

impl SolutionKind {
    /// Native `GLP_SOL`/`GLP_IPT`/`GLP_MIP` value.
    pub fn as_raw(self) -> i32 {
        match self {
            SolutionKind::Basic => 1,
            SolutionKind::InteriorPoint => 2,
            SolutionKind::MixedInteger => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionKind::Basic => "basic",
            SolutionKind::InteriorPoint => "interior_point",
            SolutionKind::MixedInteger => "mixed_integer",
        }
    }
}

impl std::fmt::Display for SolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a solution stored inside a problem object (`GLP_UNDEF`..`GLP_UNBND`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolutionStatus {
    Undefined,
    Feasible,
    Infeasible,
    NoFeasible,
    Optimal,
    Unbounded,
}

impl SolutionStatus {
    /// Decode a native status value. Returns `None` for values outside the
    /// documented range.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(SolutionStatus::Undefined),
            2 => Some(SolutionStatus::Feasible),
            3 => Some(SolutionStatus::Infeasible),
            4 => Some(SolutionStatus::NoFeasible),
            5 => Some(SolutionStatus::Optimal),
            6 => Some(SolutionStatus::Unbounded),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            SolutionStatus::Undefined => 1,
            SolutionStatus::Feasible => 2,
            SolutionStatus::Infeasible => 3,
            SolutionStatus::NoFeasible => 4,
            SolutionStatus::Optimal => 5,
            SolutionStatus::Unbounded => 6,
        }
    }
}

/// Nonzero return code of a native solve routine (`GLP_E*`).
///
/// Numeric values are preserved bit-for-bit; codes the engine documents
/// after this list was written are kept in [`ReturnCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReturnCode {
    /// Invalid basis.
    BadBasis,
    /// Singular matrix.
    Singular,
    /// Ill-conditioned matrix.
    IllConditioned,
    /// Invalid bounds.
    InvalidBounds,
    /// Solver failed.
    Failed,
    /// Objective lower limit reached.
    ObjLowerLimit,
    /// Objective upper limit reached.
    ObjUpperLimit,
    /// Iteration limit exceeded.
    IterationLimit,
    /// Time limit exceeded.
    TimeLimit,
    /// No primal feasible solution.
    NoPrimalFeasible,
    /// No dual feasible solution.
    NoDualFeasible,
    /// Root LP optimum not provided.
    Root,
    /// Search terminated by application.
    Stopped,
    /// Relative MIP gap tolerance reached.
    MipGap,
    /// No primal/dual feasible solution.
    NoFeasible,
    /// No convergence.
    NoConvergence,
    /// Numerical instability.
    Instability,
    /// Invalid data.
    InvalidData,
    /// Result out of range.
    OutOfRange,
    /// Undocumented native code.
    Other(i32),
}

impl ReturnCode {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0x01 => ReturnCode::BadBasis,
            0x02 => ReturnCode::Singular,
            0x03 => ReturnCode::IllConditioned,
            0x04 => ReturnCode::InvalidBounds,
            0x05 => ReturnCode::Failed,
            0x06 => ReturnCode::ObjLowerLimit,
            0x07 => ReturnCode::ObjUpperLimit,
            0x08 => ReturnCode::IterationLimit,
            0x09 => ReturnCode::TimeLimit,
            0x0A => ReturnCode::NoPrimalFeasible,
            0x0B => ReturnCode::NoDualFeasible,
            0x0C => ReturnCode::Root,
            0x0D => ReturnCode::Stopped,
            0x0E => ReturnCode::MipGap,
            0x0F => ReturnCode::NoFeasible,
            0x10 => ReturnCode::NoConvergence,
            0x11 => ReturnCode::Instability,
            0x12 => ReturnCode::InvalidData,
            0x13 => ReturnCode::OutOfRange,
            other => ReturnCode::Other(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            ReturnCode::BadBasis => 0x01,
            ReturnCode::Singular => 0x02,
            ReturnCode::IllConditioned => 0x03,
            ReturnCode::InvalidBounds => 0x04,
            ReturnCode::Failed => 0x05,
            ReturnCode::ObjLowerLimit => 0x06,
            ReturnCode::ObjUpperLimit => 0x07,
            ReturnCode::IterationLimit => 0x08,
            ReturnCode::TimeLimit => 0x09,
            ReturnCode::NoPrimalFeasible => 0x0A,
            ReturnCode::NoDualFeasible => 0x0B,
            ReturnCode::Root => 0x0C,
            ReturnCode::Stopped => 0x0D,
            ReturnCode::MipGap => 0x0E,
            ReturnCode::NoFeasible => 0x0F,
            ReturnCode::NoConvergence => 0x10,
            ReturnCode::Instability => 0x11,
            ReturnCode::InvalidData => 0x12,
            ReturnCode::OutOfRange => 0x13,
            ReturnCode::Other(raw) => raw,
        }
    }

    /// Short human-readable description.
    pub fn message(self) -> &'static str {
        match self {
            ReturnCode::BadBasis => "invalid basis",
            ReturnCode::Singular => "singular matrix",
            ReturnCode::IllConditioned => "ill-conditioned matrix",
            ReturnCode::InvalidBounds => "invalid bounds",
            ReturnCode::Failed => "solver failed",
            ReturnCode::ObjLowerLimit => "objective lower limit reached",
            ReturnCode::ObjUpperLimit => "objective upper limit reached",
            ReturnCode::IterationLimit => "iteration limit exceeded",
            ReturnCode::TimeLimit => "time limit exceeded",
            ReturnCode::NoPrimalFeasible => "no primal feasible solution",
            ReturnCode::NoDualFeasible => "no dual feasible solution",
            ReturnCode::Root => "root LP optimum not provided",
            ReturnCode::Stopped => "search terminated by application",
            ReturnCode::MipGap => "relative mip gap tolerance reached",
            ReturnCode::NoFeasible => "no primal/dual feasible solution",
            ReturnCode::NoConvergence => "no convergence",
            ReturnCode::Instability => "numerical instability",
            ReturnCode::InvalidData => "invalid data",
            ReturnCode::OutOfRange => "result out of range",
            ReturnCode::Other(_) => "undocumented return code",
        }
    }
}

impl std::fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.message(), self.as_raw())
    }
}

/// Outcome of a solve, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Feasible solution found, optimality not proven.
    Feasible,
    /// Problem has no feasible solution.
    Infeasible,
    /// Problem has unbounded solution.
    Unbounded,
    /// Problem is either unbounded or infeasible.
    UnboundedOrInfeasible,
    /// Solution status is undefined.
    Undefined,
    /// Iteration limit reached before the search finished.
    IterationLimit,
    /// Time limit reached before the search finished.
    TimeLimit,
    /// Native solver failed with the given code.
    Failed(ReturnCode),
}

impl SolveStatus {
    /// Map a solution status reported after a successful native call.
    pub fn from_solution_status(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal => SolveStatus::Optimal,
            SolutionStatus::Feasible => SolveStatus::Feasible,
            SolutionStatus::NoFeasible => SolveStatus::Infeasible,
            SolutionStatus::Unbounded => SolveStatus::Unbounded,
            SolutionStatus::Infeasible | SolutionStatus::Undefined => SolveStatus::Undefined,
        }
    }

    /// Map a nonzero native return code of a continuous solve.
    pub fn from_return_code(code: ReturnCode) -> Self {
        match code {
            ReturnCode::NoPrimalFeasible | ReturnCode::NoFeasible => SolveStatus::Infeasible,
            ReturnCode::NoDualFeasible => SolveStatus::UnboundedOrInfeasible,
            ReturnCode::IterationLimit => SolveStatus::IterationLimit,
            ReturnCode::TimeLimit => SolveStatus::TimeLimit,
            other => SolveStatus::Failed(other),
        }
    }

    pub fn is_optimal(self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    /// Check if the status indicates a usable solution.
    pub fn is_feasible(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, SolveStatus::Infeasible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
            SolveStatus::Undefined => "undefined",
            SolveStatus::IterationLimit => "iteration_limit",
            SolveStatus::TimeLimit => "time_limit",
            SolveStatus::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Failed(code) => write!(f, "failed: {code}"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_code_preserves_native_values() {
        for raw in 0x01..=0x13 {
            assert_eq!(ReturnCode::from_raw(raw).as_raw(), raw);
            assert!(!matches!(ReturnCode::from_raw(raw), ReturnCode::Other(_)));
        }
        assert_eq!(ReturnCode::from_raw(0x42), ReturnCode::Other(0x42));
        assert_eq!(ReturnCode::Other(0x42).as_raw(), 0x42);
    }

    #[test]
    fn test_solution_status_range() {
        assert_eq!(SolutionStatus::from_raw(5), Some(SolutionStatus::Optimal));
        assert_eq!(SolutionStatus::from_raw(4), Some(SolutionStatus::NoFeasible));
        assert_eq!(SolutionStatus::from_raw(0), None);
        assert_eq!(SolutionStatus::from_raw(7), None);
        assert_eq!(SolutionStatus::Unbounded.as_raw(), 6);
    }

    #[test]
    fn test_solve_status_mapping() {
        assert_eq!(
            SolveStatus::from_solution_status(SolutionStatus::NoFeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            SolveStatus::from_return_code(ReturnCode::NoPrimalFeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            SolveStatus::from_return_code(ReturnCode::NoDualFeasible),
            SolveStatus::UnboundedOrInfeasible
        );
        assert_eq!(
            SolveStatus::from_return_code(ReturnCode::Singular),
            SolveStatus::Failed(ReturnCode::Singular)
        );
    }

    #[test]
    fn test_status_helpers() {
        assert!(SolveStatus::Optimal.is_optimal());
        assert!(SolveStatus::Feasible.is_feasible());
        assert!(!SolveStatus::Infeasible.is_feasible());
        assert!(SolveStatus::Infeasible.is_infeasible());
        assert_eq!(SolveStatus::IterationLimit.as_str(), "iteration_limit");
        assert_eq!(
            SolveStatus::Failed(ReturnCode::Singular).to_string(),
            "failed: singular matrix (0x02)"
        );
    }

    #[test]
    fn test_solution_kind_raw_values() {
        assert_eq!(SolutionKind::Basic.as_raw(), 1);
        assert_eq!(SolutionKind::InteriorPoint.as_raw(), 2);
        assert_eq!(SolutionKind::MixedInteger.as_raw(), 3);
        assert_eq!(SolutionKind::MixedInteger.to_string(), "mixed_integer");
    }
}
