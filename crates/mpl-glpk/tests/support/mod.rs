//! Scripted in-process engine for tests that must not link `libglpk`.
//!
//! `Fake` behaves like GLPK where the managed layer depends on it: one
//! terminal hook slot, an output flag, 1-based columns, translator phases.
//! Calls that GLPK would abort on panic here instead, so a test fails if the
//! managed layer lets one through.
//!
//! Model files use a tiny line format:
//!
//! - `var NAME;` adds a column, `s.t. ...` adds a row
//! - `param ...` makes the model need a data section
//! - `data;` starts an inline data section
//! - `display ...` prints during generate, or during post-solve after `solve;`
//! - `/* infeasible */` makes the simplex report no feasible solution
//! - a line starting with `!` is a syntax error
#![allow(dead_code)]
#![allow(unsafe_code)]

use mpl_glpk::{
    Engine, InteriorParams, IntoptParams, Problem, SimplexParams, SolutionKind, TermHookFn,
    TerminalHook, Workspace,
};
use std::collections::BTreeSet;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type FakeProblem = Problem<Fake>;
pub type FakeWorkspace = Workspace<Fake>;
pub type FakeTerminal = TerminalHook<Fake>;

const GLP_UNDEF: c_int = 1;
const GLP_OPT: c_int = 5;
const GLP_NOFEAS: c_int = 4;
const GLP_EROOT: c_int = 0x0C;

struct EngineState {
    term_out: bool,
    hook: Option<TermHookFn>,
    hook_registrations: usize,
    printed: Vec<String>,
    live: BTreeSet<usize>,
    fail_alloc: bool,
    forced_status: Option<c_int>,
}

static STATE: Mutex<EngineState> = Mutex::new(EngineState {
    term_out: true,
    hook: None,
    hook_registrations: 0,
    printed: Vec::new(),
    live: BTreeSet::new(),
    fail_alloc: false,
    forced_status: None,
});

static SERIAL: Mutex<()> = Mutex::new(());

fn state() -> MutexGuard<'static, EngineState> {
    STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serialize tests that touch process-wide engine or hook state, and reset
/// both to their initial configuration.
pub fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    FakeTerminal::clear_hook();
    FakeTerminal::set_output(true);
    let mut engine = state();
    engine.printed.clear();
    engine.hook_registrations = 0;
    engine.fail_alloc = false;
    engine.forced_status = None;
    guard
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Produce terminal output the way the engine does.
///
/// Nothing is printed while output is off. Otherwise the registered hook
/// sees the text first; unless it returns nonzero the text is printed.
pub fn emit(text: &str) {
    let (enabled, hook) = {
        let engine = state();
        (engine.term_out, engine.hook)
    };
    if !enabled {
        return;
    }
    let consumed = match hook {
        Some(hook) => {
            let text = CString::new(text).expect("engine output has no NUL");
            // SAFETY: the text lives for the duration of the call.
            unsafe { hook(ptr::null_mut(), text.as_ptr()) != 0 }
        }
        None => false,
    };
    if !consumed {
        state().printed.push(text.to_string());
    }
}

/// Text the engine printed itself (not consumed by a hook).
pub fn printed() -> Vec<String> {
    state().printed.clone()
}

pub fn hook_registered() -> bool {
    state().hook.is_some()
}

/// The function pointer currently registered with the engine.
pub fn registered_hook() -> Option<TermHookFn> {
    state().hook
}

/// Number of times a hook was registered with the engine since `serial()`.
pub fn hook_registrations() -> usize {
    state().hook_registrations
}

pub fn live_objects() -> usize {
    state().live.len()
}

/// Make the next allocations return null.
pub fn set_fail_alloc(fail: bool) {
    state().fail_alloc = fail;
}

/// Make status queries print a complaint and return `raw`.
pub fn force_status(raw: Option<c_int>) {
    state().forced_status = raw;
}

fn track<T>(object: T) -> *mut T {
    let ptr = Box::into_raw(Box::new(object));
    state().live.insert(ptr as usize);
    ptr
}

fn untrack<T>(ptr: *mut T) -> Box<T> {
    assert!(
        state().live.remove(&(ptr as usize)),
        "engine would abort: double free of {ptr:p}"
    );
    // SAFETY: the pointer came from `track` and was live.
    unsafe { Box::from_raw(ptr) }
}

fn live<'a, T>(ptr: *mut T) -> &'a mut T {
    assert!(
        state().live.contains(&(ptr as usize)),
        "engine would abort: use of freed object {ptr:p}"
    );
    // SAFETY: the pointer is live and only touched on the owning thread.
    unsafe { &mut *ptr }
}

#[derive(Clone)]
struct Solution {
    status: c_int,
    objective: f64,
    values: Vec<f64>,
}

pub struct FakeProb {
    rows: usize,
    names: Vec<CString>,
    infeasible: bool,
    basic: Option<Solution>,
    interior: Option<Solution>,
    integer: Option<Solution>,
}

impl FakeProb {
    fn solution(&self, kind: SolutionKind) -> Option<&Solution> {
        match kind {
            SolutionKind::Basic => self.basic.as_ref(),
            SolutionKind::InteriorPoint => self.interior.as_ref(),
            SolutionKind::MixedInteger => self.integer.as_ref(),
        }
    }

    fn check_column(&self, j: c_int) -> usize {
        let index = usize::try_from(j).unwrap_or(0);
        assert!(
            (1..=self.names.len()).contains(&index),
            "engine would abort: column number {j} out of range"
        );
        index - 1
    }

    fn solve(&self) -> Solution {
        let values = vec![1.0; self.names.len()];
        Solution {
            status: if self.infeasible { GLP_NOFEAS } else { GLP_OPT },
            objective: values.iter().sum(),
            values,
        }
    }
}

#[derive(Default)]
struct Model {
    rows: usize,
    columns: Vec<String>,
    needs_data: bool,
    infeasible: bool,
    generate_display: Vec<String>,
    postsolve_display: Vec<String>,
}

#[derive(Default)]
pub struct FakeTran {
    model: Option<Model>,
    data_sections: usize,
    generated: bool,
    invalid: bool,
    seed: Option<c_int>,
}

impl FakeTran {
    fn check_valid(&self) {
        assert!(!self.invalid, "engine would abort: workspace used after error");
    }
}

fn read_source(fname: &CStr) -> Result<(String, String), String> {
    let name = fname.to_string_lossy().into_owned();
    match std::fs::read_to_string(Path::new(&name)) {
        Ok(text) => Ok((name, text)),
        Err(err) => Err(format!("Unable to open {name} - {err}\n")),
    }
}

fn syntax_error(name: &str, text: &str) -> Option<String> {
    text.lines()
        .position(|line| line.trim_start().starts_with('!'))
        .map(|index| format!("{name}:{}: syntax error in statement\n", index + 1))
}

fn parse_model(text: &str, skip_data: bool) -> (Model, bool) {
    let mut model = Model::default();
    let mut after_solve = false;
    let mut in_data = false;
    for line in text.lines().map(str::trim) {
        if line == "data;" {
            in_data = true;
            continue;
        }
        if in_data {
            continue;
        }
        if line == "/* infeasible */" {
            model.infeasible = true;
        } else if line == "solve;" {
            after_solve = true;
        } else if let Some(rest) = line.strip_prefix("var ") {
            let name = rest.trim_end_matches(';').split([',', ' ']).next().unwrap_or("");
            model.columns.push(name.to_string());
        } else if line.starts_with("s.t.") {
            model.rows += 1;
        } else if line.starts_with("param ") {
            model.needs_data = true;
        } else if let Some(rest) = line.strip_prefix("display ") {
            let shown = format!("Display statement: {}\n", rest.trim_end_matches(';'));
            if after_solve {
                model.postsolve_display.push(shown);
            } else {
                model.generate_display.push(shown);
            }
        }
    }
    (model, in_data && !skip_data)
}

/// The scripted engine.
pub struct Fake;

// SAFETY: the fake upholds the engine contract for the pointers it hands out
// and asserts on every misuse.
unsafe impl Engine for Fake {
    type Prob = FakeProb;
    type Tran = FakeTran;

    const NAME: &'static str = "fake";

    fn term_out(enabled: bool) {
        state().term_out = enabled;
    }

    fn term_hook(hook: Option<TermHookFn>) {
        let mut engine = state();
        if hook.is_some() {
            engine.hook_registrations += 1;
        }
        engine.hook = hook;
    }

    fn create_prob() -> *mut FakeProb {
        if state().fail_alloc {
            return ptr::null_mut();
        }
        track(FakeProb {
            rows: 0,
            names: Vec::new(),
            infeasible: false,
            basic: None,
            interior: None,
            integer: None,
        })
    }

    unsafe fn delete_prob(prob: *mut FakeProb) {
        drop(untrack(prob));
    }

    unsafe fn num_rows(prob: *mut FakeProb) -> c_int {
        live(prob).rows as c_int
    }

    unsafe fn num_cols(prob: *mut FakeProb) -> c_int {
        live(prob).names.len() as c_int
    }

    unsafe fn col_name(prob: *mut FakeProb, j: c_int) -> *const c_char {
        let prob = live(prob);
        let index = prob.check_column(j);
        let name = &prob.names[index];
        if name.is_empty() { ptr::null() } else { name.as_ptr() }
    }

    unsafe fn simplex(prob: *mut FakeProb, params: &SimplexParams) -> c_int {
        assert!(params.validate().is_ok(), "engine would abort: bad smcp");
        let prob = live(prob);
        emit("GLPK Simplex Optimizer\n");
        prob.basic = Some(prob.solve());
        0
    }

    unsafe fn interior(prob: *mut FakeProb, _params: &InteriorParams) -> c_int {
        let prob = live(prob);
        emit("GLPK Interior-Point Optimizer\n");
        prob.interior = Some(prob.solve());
        0
    }

    unsafe fn intopt(prob: *mut FakeProb, params: &IntoptParams) -> c_int {
        assert!(params.validate().is_ok(), "engine would abort: bad iocp");
        let prob = live(prob);
        let has_basis = prob.basic.as_ref().is_some_and(|s| s.status == GLP_OPT);
        if !params.presolve && !has_basis {
            emit("glp_intopt: optimal basis to initial LP relaxation not provided\n");
            return GLP_EROOT;
        }
        emit("GLPK Integer Optimizer\n");
        prob.integer = Some(prob.solve());
        0
    }

    unsafe fn solution_status(prob: *mut FakeProb, kind: SolutionKind) -> c_int {
        let forced = state().forced_status;
        if let Some(raw) = forced {
            emit(&format!("status: bad value {raw}\n"));
            return raw;
        }
        live(prob).solution(kind).map_or(GLP_UNDEF, |s| s.status)
    }

    unsafe fn objective_value(prob: *mut FakeProb, kind: SolutionKind) -> f64 {
        live(prob).solution(kind).map_or(0.0, |s| s.objective)
    }

    unsafe fn column_value(prob: *mut FakeProb, kind: SolutionKind, j: c_int) -> f64 {
        let prob = live(prob);
        let index = prob.check_column(j);
        prob.solution(kind).map_or(0.0, |s| s.values[index])
    }

    fn mpl_alloc() -> *mut FakeTran {
        if state().fail_alloc {
            return ptr::null_mut();
        }
        track(FakeTran::default())
    }

    unsafe fn mpl_free(tran: *mut FakeTran) {
        drop(untrack(tran));
    }

    unsafe fn mpl_init_rand(tran: *mut FakeTran, seed: c_int) {
        let tran = live(tran);
        tran.check_valid();
        assert!(tran.model.is_none(), "engine would abort: init_rand after read");
        tran.seed = Some(seed);
    }

    unsafe fn mpl_read_model(tran: *mut FakeTran, fname: &CStr, skip_data: bool) -> c_int {
        let tran = live(tran);
        tran.check_valid();
        assert!(tran.model.is_none(), "engine would abort: model already read");
        let (name, text) = match read_source(fname) {
            Ok(source) => source,
            Err(message) => {
                emit(&message);
                tran.invalid = true;
                return 1;
            }
        };
        emit(&format!("Reading model section from {name}...\n"));
        if let Some(message) = syntax_error(&name, &text) {
            emit(&message);
            emit("Context: model processing error\n");
            tran.invalid = true;
            return 1;
        }
        let (model, inline_data) = parse_model(&text, skip_data);
        if inline_data {
            tran.data_sections += 1;
        }
        emit(&format!("{} lines were read\n", text.lines().count()));
        tran.model = Some(model);
        0
    }

    unsafe fn mpl_read_data(tran: *mut FakeTran, fname: &CStr) -> c_int {
        let tran = live(tran);
        tran.check_valid();
        assert!(
            tran.model.is_some() && !tran.generated,
            "engine would abort: read_data out of phase"
        );
        let (name, text) = match read_source(fname) {
            Ok(source) => source,
            Err(message) => {
                emit(&message);
                tran.invalid = true;
                return 1;
            }
        };
        emit(&format!("Reading data section from {name}...\n"));
        if let Some(message) = syntax_error(&name, &text) {
            emit(&message);
            tran.invalid = true;
            return 1;
        }
        tran.data_sections += 1;
        0
    }

    unsafe fn mpl_generate(tran: *mut FakeTran, fname: Option<&CStr>) -> c_int {
        let tran = live(tran);
        tran.check_valid();
        assert!(!tran.generated, "engine would abort: generate called twice");
        let Some(model) = tran.model.as_ref() else {
            panic!("engine would abort: generate without model");
        };
        emit("Generating model...\n");
        if model.needs_data && tran.data_sections == 0 {
            emit("no value for parameter\n");
            tran.invalid = true;
            return 1;
        }
        match fname {
            Some(fname) => {
                let path = PathBuf::from(fname.to_string_lossy().into_owned());
                if std::fs::write(&path, model.generate_display.concat()).is_err() {
                    emit(&format!("Unable to create {}\n", path.display()));
                    tran.invalid = true;
                    return 1;
                }
            }
            None => model.generate_display.iter().for_each(|line| emit(line)),
        }
        emit("Model has been successfully generated\n");
        tran.generated = true;
        0
    }

    unsafe fn mpl_build_prob(tran: *mut FakeTran, prob: *mut FakeProb) {
        let tran = live(tran);
        tran.check_valid();
        assert!(tran.generated, "engine would abort: build before generate");
        let prob = live(prob);
        let Some(model) = tran.model.as_ref() else {
            panic!("engine would abort: build without model");
        };
        prob.rows = model.rows;
        prob.names = model
            .columns
            .iter()
            .map(|name| CString::new(name.as_str()).unwrap_or_default())
            .collect();
        prob.infeasible = model.infeasible;
        prob.basic = None;
        prob.interior = None;
        prob.integer = None;
    }

    unsafe fn mpl_postsolve(tran: *mut FakeTran, prob: *mut FakeProb, kind: SolutionKind) -> c_int {
        let tran = live(tran);
        tran.check_valid();
        assert!(tran.generated, "engine would abort: postsolve before generate");
        let prob = live(prob);
        let Some(model) = tran.model.as_ref() else {
            panic!("engine would abort: postsolve without model");
        };
        assert_eq!(
            prob.names.len(),
            model.columns.len(),
            "engine would abort: problem does not match model"
        );
        if prob.solution(kind).is_none() {
            emit(&format!("postsolve: {kind} solution not available\n"));
            tran.invalid = true;
            return 1;
        }
        model.postsolve_display.iter().for_each(|line| emit(line));
        emit("Model has been successfully processed\n");
        0
    }
}

/// Write a fixture under a per-test temporary directory.
pub fn fixture(test: &str, name: &str, contents: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "mpl-glpk-{}-{}-{}",
        std::process::id(),
        test,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("create fixture dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

pub const PRODUCTION_MODEL: &str = "\
param cost;
var x;
var y;
s.t. capacity: x + y <= 10;
s.t. demand: x >= 1;
display cost;
solve;
display x, y;
end;
";

pub const PRODUCTION_DATA: &str = "\
data;
param cost := 3;
end;
";

pub const INFEASIBLE_MODEL: &str = "\
/* infeasible */
var x;
s.t. lo: x >= 1;
s.t. hi: x <= 0;
solve;
end;
";
