//! Control parameter types for the solve operations.
//!
//! Every `Default` impl mirrors the defaults GLPK documents for
//! `glp_init_smcp`, `glp_init_iptcp` and `glp_init_iocp`, so a
//! default-constructed value behaves exactly like the native engine
//! initialising its own control block.

use crate::MplError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GLPK aborts the process on tolerances outside the open interval (0, 1).
fn check_tolerance(name: &'static str, value: f64) -> Result<(), MplError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(MplError::InvalidParameter {
            name,
            reason: format!("{value} is not in (0, 1)"),
        })
    }
}

fn check_non_negative(name: &'static str, value: i32) -> Result<(), MplError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(MplError::InvalidParameter {
            name,
            reason: format!("{value} is negative"),
        })
    }
}

/// Verbosity of the native engine's terminal output during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MessageLevel {
    /// No output.
    Off,
    /// Error and warning messages only.
    Error,
    /// Normal output.
    Normal,
    /// Full output, including informational messages.
    #[default]
    All,
    /// Debug output.
    Debug,
}

impl MessageLevel {
    /// Native `GLP_MSG_*` value.
    pub fn as_raw(self) -> i32 {
        match self {
            MessageLevel::Off => 0,
            MessageLevel::Error => 1,
            MessageLevel::Normal => 2,
            MessageLevel::All => 3,
            MessageLevel::Debug => 4,
        }
    }
}

/// Simplex method variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SimplexMethod {
    /// Two-phase primal simplex.
    #[default]
    Primal,
    /// Dual simplex, falling back to primal if it fails.
    DualPrimal,
    /// Two-phase dual simplex.
    Dual,
}

impl SimplexMethod {
    pub fn as_raw(self) -> i32 {
        match self {
            SimplexMethod::Primal => 1,
            SimplexMethod::DualPrimal => 2,
            SimplexMethod::Dual => 3,
        }
    }
}

/// Pricing technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Pricing {
    /// Textbook pricing.
    Standard,
    /// Projected steepest edge.
    #[default]
    SteepestEdge,
}

impl Pricing {
    pub fn as_raw(self) -> i32 {
        match self {
            Pricing::Standard => 0x11,
            Pricing::SteepestEdge => 0x22,
        }
    }
}

/// Ratio test technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RatioTest {
    /// Textbook ratio test.
    Standard,
    /// Harris' two-pass ratio test.
    #[default]
    Harris,
}

impl RatioTest {
    pub fn as_raw(self) -> i32 {
        match self {
            RatioTest::Standard => 0x11,
            RatioTest::Harris => 0x22,
        }
    }
}

/// Control parameters for the continuous (simplex) solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimplexParams {
    /// Message level for terminal output.
    pub msg_level: MessageLevel,
    /// Simplex method option.
    pub method: SimplexMethod,
    /// Pricing technique.
    pub pricing: Pricing,
    /// Ratio test technique.
    pub ratio_test: RatioTest,
    /// Tolerance used to check if the basic solution is primal feasible.
    pub tol_bnd: f64,
    /// Tolerance used to check if the basic solution is dual feasible.
    pub tol_dj: f64,
    /// Tolerance used to choose eligible pivotal elements.
    pub tol_piv: f64,
    /// Lower limit of the objective function (dual simplex only).
    pub obj_ll: f64,
    /// Upper limit of the objective function (dual simplex only).
    pub obj_ul: f64,
    /// Simplex iteration limit.
    pub it_lim: i32,
    /// Searching time limit, in milliseconds.
    pub tm_lim: i32,
    /// Output frequency, in milliseconds.
    pub out_frq: i32,
    /// Output delay, in milliseconds.
    pub out_dly: i32,
    /// Run the LP presolver before the simplex.
    pub presolve: bool,
}

impl Default for SimplexParams {
    fn default() -> Self {
        SimplexParams {
            msg_level: MessageLevel::All,
            method: SimplexMethod::Primal,
            pricing: Pricing::SteepestEdge,
            ratio_test: RatioTest::Harris,
            tol_bnd: 1e-7,
            tol_dj: 1e-7,
            tol_piv: 1e-10,
            obj_ll: -f64::MAX,
            obj_ul: f64::MAX,
            it_lim: i32::MAX,
            tm_lim: i32::MAX,
            out_frq: 500,
            out_dly: 0,
            presolve: false,
        }
    }
}

impl SimplexParams {
    /// Create parameters with the native defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message level.
    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = level;
        self
    }

    /// Set the simplex method.
    pub fn with_method(mut self, method: SimplexMethod) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable the LP presolver.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = enabled;
        self
    }

    /// Set the iteration limit.
    pub fn with_iteration_limit(mut self, limit: i32) -> Self {
        self.it_lim = limit;
        self
    }

    /// Set the time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, limit: i32) -> Self {
        self.tm_lim = limit;
        self
    }

    /// Check every value against the ranges `glp_simplex` accepts.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), MplError> {
        check_tolerance("tol_bnd", self.tol_bnd)?;
        check_tolerance("tol_dj", self.tol_dj)?;
        check_tolerance("tol_piv", self.tol_piv)?;
        check_non_negative("it_lim", self.it_lim)?;
        check_non_negative("tm_lim", self.tm_lim)?;
        if self.out_frq < 1 {
            return Err(MplError::InvalidParameter {
                name: "out_frq",
                reason: format!("{} is less than 1", self.out_frq),
            });
        }
        check_non_negative("out_dly", self.out_dly)
    }
}

/// Ordering algorithm used by the interior-point method before Cholesky
/// factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Ordering {
    /// Natural (original) ordering.
    None,
    /// Quotient minimum degree.
    Qmd,
    /// Approximate minimum degree.
    #[default]
    Amd,
    /// Approximate minimum degree for symmetric matrices.
    Symamd,
}

impl Ordering {
    pub fn as_raw(self) -> i32 {
        match self {
            Ordering::None => 0,
            Ordering::Qmd => 1,
            Ordering::Amd => 2,
            Ordering::Symamd => 3,
        }
    }
}

/// Control parameters for the interior-point solve.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteriorParams {
    /// Message level for terminal output.
    pub msg_level: MessageLevel,
    /// Ordering algorithm.
    pub ordering: Ordering,
}

impl InteriorParams {
    /// Create parameters with the native defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message level.
    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = level;
        self
    }

    /// Set the ordering algorithm.
    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }
}

/// Branching technique for branch-and-bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Branching {
    /// First fractional variable.
    FirstFractional,
    /// Last fractional variable.
    LastFractional,
    /// Most fractional variable.
    MostFractional,
    /// Heuristic by Driebeck and Tomlin.
    #[default]
    DriebeckTomlin,
    /// Hybrid pseudo-cost heuristic.
    PseudoCost,
}

impl Branching {
    pub fn as_raw(self) -> i32 {
        match self {
            Branching::FirstFractional => 1,
            Branching::LastFractional => 2,
            Branching::MostFractional => 3,
            Branching::DriebeckTomlin => 4,
            Branching::PseudoCost => 5,
        }
    }
}

/// Backtracking technique for branch-and-bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Backtracking {
    /// Depth first search.
    DepthFirst,
    /// Breadth first search.
    BreadthFirst,
    /// Best local bound.
    #[default]
    BestLocalBound,
    /// Best projection heuristic.
    BestProjection,
}

impl Backtracking {
    pub fn as_raw(self) -> i32 {
        match self {
            Backtracking::DepthFirst => 1,
            Backtracking::BreadthFirst => 2,
            Backtracking::BestLocalBound => 3,
            Backtracking::BestProjection => 4,
        }
    }
}

/// MIP preprocessing technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Preprocessing {
    /// Disable preprocessing.
    None,
    /// Preprocess only at the root level.
    Root,
    /// Preprocess at all levels.
    #[default]
    All,
}

impl Preprocessing {
    pub fn as_raw(self) -> i32 {
        match self {
            Preprocessing::None => 0,
            Preprocessing::Root => 1,
            Preprocessing::All => 2,
        }
    }
}

/// Control parameters for the integer (branch-and-bound) solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntoptParams {
    /// Message level for terminal output.
    pub msg_level: MessageLevel,
    /// Branching technique.
    pub branching: Branching,
    /// Backtracking technique.
    pub backtracking: Backtracking,
    /// Absolute tolerance used to check integrality.
    pub tol_int: f64,
    /// Relative tolerance used to check if the objective is better than the incumbent.
    pub tol_obj: f64,
    /// Searching time limit, in milliseconds.
    pub tm_lim: i32,
    /// Output frequency, in milliseconds.
    pub out_frq: i32,
    /// Output delay, in milliseconds.
    pub out_dly: i32,
    /// Preprocessing technique.
    pub preprocessing: Preprocessing,
    /// Relative MIP gap tolerance.
    pub mip_gap: f64,
    /// Generate mixed integer rounding cuts.
    pub mir_cuts: bool,
    /// Generate Gomory's mixed integer cuts.
    pub gomory_cuts: bool,
    /// Generate mixed cover cuts.
    pub cover_cuts: bool,
    /// Generate clique cuts.
    pub clique_cuts: bool,
    /// Run the MIP presolver. When disabled, the problem must already hold an
    /// optimal basic solution of its LP relaxation.
    pub presolve: bool,
    /// Replace general integer variables by binary ones (presolve only).
    pub binarize: bool,
    /// Feasibility pump heuristic.
    pub fp_heur: bool,
    /// Proximity search heuristic.
    pub ps_heur: bool,
    /// Time limit for the proximity search heuristic, in milliseconds.
    pub ps_tm_lim: i32,
    /// Simple rounding heuristic.
    pub sr_heur: bool,
}

impl Default for IntoptParams {
    fn default() -> Self {
        IntoptParams {
            msg_level: MessageLevel::All,
            branching: Branching::DriebeckTomlin,
            backtracking: Backtracking::BestLocalBound,
            tol_int: 1e-5,
            tol_obj: 1e-7,
            tm_lim: i32::MAX,
            out_frq: 5000,
            out_dly: 10000,
            preprocessing: Preprocessing::All,
            mip_gap: 0.0,
            mir_cuts: false,
            gomory_cuts: false,
            cover_cuts: false,
            clique_cuts: false,
            presolve: false,
            binarize: false,
            fp_heur: false,
            ps_heur: false,
            ps_tm_lim: 60000,
            sr_heur: true,
        }
    }
}

impl IntoptParams {
    /// Create parameters with the native defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message level.
    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = level;
        self
    }

    /// Enable or disable the MIP presolver.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = enabled;
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = gap;
        self
    }

    /// Set the time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, limit: i32) -> Self {
        self.tm_lim = limit;
        self
    }

    /// Enable or disable all cut generators at once.
    pub fn with_cuts(mut self, enabled: bool) -> Self {
        self.mir_cuts = enabled;
        self.gomory_cuts = enabled;
        self.cover_cuts = enabled;
        self.clique_cuts = enabled;
        self
    }

    /// Check every value against the ranges `glp_intopt` accepts.
    ///
    /// # Errors
    ///
    /// Returns [`MplError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), MplError> {
        check_tolerance("tol_int", self.tol_int)?;
        check_tolerance("tol_obj", self.tol_obj)?;
        check_non_negative("tm_lim", self.tm_lim)?;
        check_non_negative("out_frq", self.out_frq)?;
        check_non_negative("out_dly", self.out_dly)?;
        check_non_negative("ps_tm_lim", self.ps_tm_lim)?;
        if self.mip_gap.is_nan() || self.mip_gap < 0.0 {
            return Err(MplError::InvalidParameter {
                name: "mip_gap",
                reason: format!("{} is not a non-negative number", self.mip_gap),
            });
        }
        Ok(())
    }
}
