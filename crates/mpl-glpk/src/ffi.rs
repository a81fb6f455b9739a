//! FFI bindings to the GLPK library.
//!
//! Struct layouts follow `glpk.h` from GLPK 5.0. Control blocks are always
//! filled by the library's own `glp_init_*` first, so fields we do not set
//! keep the library defaults.
#![allow(unsafe_code)]

use crate::engine::{Engine, TermHookFn};
use mpl_solver::{InteriorParams, IntoptParams, SimplexParams, SolutionKind};
use std::ffi::CStr;
use std::marker::{PhantomData, PhantomPinned};
use std::mem::MaybeUninit;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

const GLP_ON: c_int = 1;
const GLP_OFF: c_int = 0;

/// Opaque `glp_prob`.
#[repr(C)]
pub struct GlpProb {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Opaque `glp_tran`.
#[repr(C)]
pub struct GlpTran {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

#[repr(C)]
#[allow(dead_code)]
struct Smcp {
    msg_lev: c_int,
    meth: c_int,
    pricing: c_int,
    r_test: c_int,
    tol_bnd: f64,
    tol_dj: f64,
    tol_piv: f64,
    obj_ll: f64,
    obj_ul: f64,
    it_lim: c_int,
    tm_lim: c_int,
    out_frq: c_int,
    out_dly: c_int,
    presolve: c_int,
    excl: c_int,
    shift: c_int,
    aorn: c_int,
    foo_bar: [f64; 33],
    // Older headers reserve a longer tail.
    _spare: [f64; 8],
}

#[repr(C)]
#[allow(dead_code)]
struct Iptcp {
    msg_lev: c_int,
    ord_alg: c_int,
    foo_bar: [f64; 48],
}

#[repr(C)]
#[allow(dead_code)]
struct Iocp {
    msg_lev: c_int,
    br_tech: c_int,
    bt_tech: c_int,
    tol_int: f64,
    tol_obj: f64,
    tm_lim: c_int,
    out_frq: c_int,
    out_dly: c_int,
    cb_func: Option<unsafe extern "C" fn(tree: *mut c_void, info: *mut c_void)>,
    cb_info: *mut c_void,
    cb_size: c_int,
    pp_tech: c_int,
    mip_gap: f64,
    mir_cuts: c_int,
    gmi_cuts: c_int,
    cov_cuts: c_int,
    clq_cuts: c_int,
    presolve: c_int,
    binarize: c_int,
    fp_heur: c_int,
    ps_heur: c_int,
    ps_tm_lim: c_int,
    sr_heur: c_int,
    use_sol: c_int,
    save_sol: *const c_char,
    alien: c_int,
    flip: c_int,
    foo_bar: [f64; 23],
    _spare: [f64; 8],
}

#[link(name = "glpk")]
unsafe extern "C" {
    fn glp_version() -> *const c_char;
    fn glp_term_out(flag: c_int) -> c_int;
    fn glp_term_hook(
        func: Option<unsafe extern "C" fn(info: *mut c_void, s: *const c_char) -> c_int>,
        info: *mut c_void,
    );

    fn glp_create_prob() -> *mut GlpProb;
    fn glp_delete_prob(prob: *mut GlpProb);
    fn glp_get_num_rows(prob: *mut GlpProb) -> c_int;
    fn glp_get_num_cols(prob: *mut GlpProb) -> c_int;
    fn glp_get_col_name(prob: *mut GlpProb, j: c_int) -> *const c_char;

    fn glp_init_smcp(parm: *mut Smcp);
    fn glp_simplex(prob: *mut GlpProb, parm: *const Smcp) -> c_int;
    fn glp_init_iptcp(parm: *mut Iptcp);
    fn glp_interior(prob: *mut GlpProb, parm: *const Iptcp) -> c_int;
    fn glp_init_iocp(parm: *mut Iocp);
    fn glp_intopt(prob: *mut GlpProb, parm: *const Iocp) -> c_int;

    fn glp_get_status(prob: *mut GlpProb) -> c_int;
    fn glp_get_obj_val(prob: *mut GlpProb) -> f64;
    fn glp_get_col_prim(prob: *mut GlpProb, j: c_int) -> f64;
    fn glp_ipt_status(prob: *mut GlpProb) -> c_int;
    fn glp_ipt_obj_val(prob: *mut GlpProb) -> f64;
    fn glp_ipt_col_prim(prob: *mut GlpProb, j: c_int) -> f64;
    fn glp_mip_status(prob: *mut GlpProb) -> c_int;
    fn glp_mip_obj_val(prob: *mut GlpProb) -> f64;
    fn glp_mip_col_val(prob: *mut GlpProb, j: c_int) -> f64;

    fn glp_mpl_alloc_wksp() -> *mut GlpTran;
    fn glp_mpl_free_wksp(tran: *mut GlpTran);
    fn glp_mpl_init_rand(tran: *mut GlpTran, seed: c_int);
    fn glp_mpl_read_model(tran: *mut GlpTran, fname: *const c_char, skip: c_int) -> c_int;
    fn glp_mpl_read_data(tran: *mut GlpTran, fname: *const c_char) -> c_int;
    fn glp_mpl_generate(tran: *mut GlpTran, fname: *const c_char) -> c_int;
    fn glp_mpl_build_prob(tran: *mut GlpTran, prob: *mut GlpProb);
    fn glp_mpl_postsolve(tran: *mut GlpTran, prob: *mut GlpProb, sol: c_int) -> c_int;
}

fn flag(value: bool) -> c_int {
    if value { GLP_ON } else { GLP_OFF }
}

fn smcp(params: &SimplexParams) -> Smcp {
    let mut parm = MaybeUninit::<Smcp>::zeroed();
    // SAFETY: glp_init_smcp writes every documented field; the rest stays zero.
    let mut parm = unsafe {
        glp_init_smcp(parm.as_mut_ptr());
        parm.assume_init()
    };
    parm.msg_lev = params.msg_level.as_raw();
    parm.meth = params.method.as_raw();
    parm.pricing = params.pricing.as_raw();
    parm.r_test = params.ratio_test.as_raw();
    parm.tol_bnd = params.tol_bnd;
    parm.tol_dj = params.tol_dj;
    parm.tol_piv = params.tol_piv;
    parm.obj_ll = params.obj_ll;
    parm.obj_ul = params.obj_ul;
    parm.it_lim = params.it_lim;
    parm.tm_lim = params.tm_lim;
    parm.out_frq = params.out_frq;
    parm.out_dly = params.out_dly;
    parm.presolve = flag(params.presolve);
    parm
}

fn iptcp(params: &InteriorParams) -> Iptcp {
    let mut parm = MaybeUninit::<Iptcp>::zeroed();
    // SAFETY: see `smcp`.
    let mut parm = unsafe {
        glp_init_iptcp(parm.as_mut_ptr());
        parm.assume_init()
    };
    parm.msg_lev = params.msg_level.as_raw();
    parm.ord_alg = params.ordering.as_raw();
    parm
}

fn iocp(params: &IntoptParams) -> Iocp {
    let mut parm = MaybeUninit::<Iocp>::zeroed();
    // SAFETY: see `smcp`. The callback and solution-file fields stay null.
    let mut parm = unsafe {
        glp_init_iocp(parm.as_mut_ptr());
        parm.assume_init()
    };
    parm.msg_lev = params.msg_level.as_raw();
    parm.br_tech = params.branching.as_raw();
    parm.bt_tech = params.backtracking.as_raw();
    parm.tol_int = params.tol_int;
    parm.tol_obj = params.tol_obj;
    parm.tm_lim = params.tm_lim;
    parm.out_frq = params.out_frq;
    parm.out_dly = params.out_dly;
    parm.pp_tech = params.preprocessing.as_raw();
    parm.mip_gap = params.mip_gap;
    parm.mir_cuts = flag(params.mir_cuts);
    parm.gmi_cuts = flag(params.gomory_cuts);
    parm.cov_cuts = flag(params.cover_cuts);
    parm.clq_cuts = flag(params.clique_cuts);
    parm.presolve = flag(params.presolve);
    parm.binarize = flag(params.binarize);
    parm.fp_heur = flag(params.fp_heur);
    parm.ps_heur = flag(params.ps_heur);
    parm.ps_tm_lim = params.ps_tm_lim;
    parm.sr_heur = flag(params.sr_heur);
    parm
}

/// The GLPK engine, linked from `libglpk`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Glpk;

// SAFETY: every method forwards to the GLPK routine of the same contract.
unsafe impl Engine for Glpk {
    type Prob = GlpProb;
    type Tran = GlpTran;

    const NAME: &'static str = "glpk";

    fn term_out(enabled: bool) {
        // SAFETY: glp_term_out only updates library state.
        unsafe { glp_term_out(flag(enabled)) };
    }

    fn term_hook(hook: Option<TermHookFn>) {
        // SAFETY: the hook, when given, is a valid `extern "C"` function for
        // the program's lifetime and ignores `info`.
        unsafe { glp_term_hook(hook, ptr::null_mut()) };
    }

    fn create_prob() -> *mut GlpProb {
        // SAFETY: no preconditions.
        unsafe { glp_create_prob() }
    }

    unsafe fn delete_prob(prob: *mut GlpProb) {
        unsafe { glp_delete_prob(prob) }
    }

    unsafe fn num_rows(prob: *mut GlpProb) -> c_int {
        unsafe { glp_get_num_rows(prob) }
    }

    unsafe fn num_cols(prob: *mut GlpProb) -> c_int {
        unsafe { glp_get_num_cols(prob) }
    }

    unsafe fn col_name(prob: *mut GlpProb, j: c_int) -> *const c_char {
        unsafe { glp_get_col_name(prob, j) }
    }

    unsafe fn simplex(prob: *mut GlpProb, params: &SimplexParams) -> c_int {
        let parm = smcp(params);
        unsafe { glp_simplex(prob, &parm) }
    }

    unsafe fn interior(prob: *mut GlpProb, params: &InteriorParams) -> c_int {
        let parm = iptcp(params);
        unsafe { glp_interior(prob, &parm) }
    }

    unsafe fn intopt(prob: *mut GlpProb, params: &IntoptParams) -> c_int {
        let parm = iocp(params);
        unsafe { glp_intopt(prob, &parm) }
    }

    unsafe fn solution_status(prob: *mut GlpProb, kind: SolutionKind) -> c_int {
        unsafe {
            match kind {
                SolutionKind::Basic => glp_get_status(prob),
                SolutionKind::InteriorPoint => glp_ipt_status(prob),
                SolutionKind::MixedInteger => glp_mip_status(prob),
            }
        }
    }

    unsafe fn objective_value(prob: *mut GlpProb, kind: SolutionKind) -> f64 {
        unsafe {
            match kind {
                SolutionKind::Basic => glp_get_obj_val(prob),
                SolutionKind::InteriorPoint => glp_ipt_obj_val(prob),
                SolutionKind::MixedInteger => glp_mip_obj_val(prob),
            }
        }
    }

    unsafe fn column_value(prob: *mut GlpProb, kind: SolutionKind, j: c_int) -> f64 {
        unsafe {
            match kind {
                SolutionKind::Basic => glp_get_col_prim(prob, j),
                SolutionKind::InteriorPoint => glp_ipt_col_prim(prob, j),
                SolutionKind::MixedInteger => glp_mip_col_val(prob, j),
            }
        }
    }

    fn mpl_alloc() -> *mut GlpTran {
        // SAFETY: no preconditions.
        unsafe { glp_mpl_alloc_wksp() }
    }

    unsafe fn mpl_free(tran: *mut GlpTran) {
        unsafe { glp_mpl_free_wksp(tran) }
    }

    unsafe fn mpl_init_rand(tran: *mut GlpTran, seed: c_int) {
        unsafe { glp_mpl_init_rand(tran, seed) }
    }

    unsafe fn mpl_read_model(tran: *mut GlpTran, fname: &CStr, skip_data: bool) -> c_int {
        unsafe { glp_mpl_read_model(tran, fname.as_ptr(), c_int::from(skip_data)) }
    }

    unsafe fn mpl_read_data(tran: *mut GlpTran, fname: &CStr) -> c_int {
        unsafe { glp_mpl_read_data(tran, fname.as_ptr()) }
    }

    unsafe fn mpl_generate(tran: *mut GlpTran, fname: Option<&CStr>) -> c_int {
        let fname = fname.map_or(ptr::null(), CStr::as_ptr);
        unsafe { glp_mpl_generate(tran, fname) }
    }

    unsafe fn mpl_build_prob(tran: *mut GlpTran, prob: *mut GlpProb) {
        unsafe { glp_mpl_build_prob(tran, prob) }
    }

    unsafe fn mpl_postsolve(tran: *mut GlpTran, prob: *mut GlpProb, kind: SolutionKind) -> c_int {
        unsafe { glp_mpl_postsolve(tran, prob, kind.as_raw()) }
    }
}

/// Version string of the linked GLPK library.
pub fn glpk_version() -> Option<String> {
    // SAFETY: glp_version returns a static NUL-terminated string or null.
    unsafe {
        let ptr = glp_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
        }
    }
}
