//! Engine-independent types for the MathProg / GLPK access layer.
//!
//! # Overview
//!
//! - [`SimplexParams`], [`InteriorParams`], [`IntoptParams`]: control
//!   parameters for the solve operations
//! - [`SolveStatus`], [`SolutionStatus`], [`ReturnCode`]: solve outcomes and
//!   the native codes behind them
//! - [`SolutionKind`]: which solution a post-solve copies back
//! - [`MplError`]: error taxonomy shared by every managed operation

mod config;
mod error;
mod status;

pub use config::{
    Backtracking, Branching, InteriorParams, IntoptParams, MessageLevel, Ordering, Preprocessing,
    Pricing, RatioTest, SimplexMethod, SimplexParams,
};
pub use error::{MplError, ObjectKind};
pub use status::{ReturnCode, SolutionKind, SolutionStatus, SolveStatus};
