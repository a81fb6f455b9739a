//! The seam between the managed layer and a native engine.
//!
//! Every managed type is generic over [`Engine`]. The trait lists the raw
//! entry points the managed layer needs and nothing more; sequencing,
//! liveness checks and error mapping all live above it.

use mpl_solver::{InteriorParams, IntoptParams, SimplexParams, SolutionKind};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

/// Signature of the terminal hook the engine calls for every chunk of
/// diagnostic text. A nonzero return tells the engine the text was consumed
/// and must not be printed.
pub type TermHookFn = unsafe extern "C" fn(info: *mut c_void, text: *const c_char) -> c_int;

/// Raw native engine entry points.
///
/// # Safety
///
/// Implementors must uphold the native engine's own contract:
///
/// - `create_prob`/`mpl_alloc` return either null or a pointer that stays
///   valid until the matching `delete_prob`/`mpl_free`.
/// - Functions taking a pointer are only called by the managed layer with a
///   live pointer obtained from the same engine, on the thread that owns the
///   handle.
/// - `term_hook` stores at most one hook; installing replaces the previous
///   one and `None` removes it. The engine calls the hook synchronously on
///   the thread producing the output.
pub unsafe trait Engine: 'static {
    /// Opaque native problem object.
    type Prob;
    /// Opaque native translator workspace.
    type Tran;

    /// Engine name used in log fields.
    const NAME: &'static str;

    /// Enable or disable terminal output.
    fn term_out(enabled: bool);

    /// Register or remove the terminal hook.
    fn term_hook(hook: Option<TermHookFn>);

    fn create_prob() -> *mut Self::Prob;
    unsafe fn delete_prob(prob: *mut Self::Prob);
    unsafe fn num_rows(prob: *mut Self::Prob) -> c_int;
    unsafe fn num_cols(prob: *mut Self::Prob) -> c_int;
    /// Name of column `j` (1-based); null when the column is unnamed.
    unsafe fn col_name(prob: *mut Self::Prob, j: c_int) -> *const c_char;

    unsafe fn simplex(prob: *mut Self::Prob, params: &SimplexParams) -> c_int;
    unsafe fn interior(prob: *mut Self::Prob, params: &InteriorParams) -> c_int;
    unsafe fn intopt(prob: *mut Self::Prob, params: &IntoptParams) -> c_int;

    unsafe fn solution_status(prob: *mut Self::Prob, kind: SolutionKind) -> c_int;
    unsafe fn objective_value(prob: *mut Self::Prob, kind: SolutionKind) -> f64;
    /// Value of column `j` (1-based) in the given solution.
    unsafe fn column_value(prob: *mut Self::Prob, kind: SolutionKind, j: c_int) -> f64;

    fn mpl_alloc() -> *mut Self::Tran;
    unsafe fn mpl_free(tran: *mut Self::Tran);
    unsafe fn mpl_init_rand(tran: *mut Self::Tran, seed: c_int);
    unsafe fn mpl_read_model(tran: *mut Self::Tran, fname: &CStr, skip_data: bool) -> c_int;
    unsafe fn mpl_read_data(tran: *mut Self::Tran, fname: &CStr) -> c_int;
    unsafe fn mpl_generate(tran: *mut Self::Tran, fname: Option<&CStr>) -> c_int;
    unsafe fn mpl_build_prob(tran: *mut Self::Tran, prob: *mut Self::Prob);
    unsafe fn mpl_postsolve(
        tran: *mut Self::Tran,
        prob: *mut Self::Prob,
        kind: SolutionKind,
    ) -> c_int;
}
