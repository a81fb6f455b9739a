//! Process-wide terminal output hook.
//!
//! The engine prints diagnostics through a single registered hook. This
//! module owns the one slot holding the managed callback, the trampoline
//! registered with the engine, and the global output flag. All three are
//! mutated under one mutex so installs and clears never interleave.

use crate::engine::Engine;
use std::cell::RefCell;
use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Managed terminal callback.
///
/// Receives one chunk of engine output. Returning `true` tells the engine
/// the text was consumed and must not be printed; `false` lets the engine's
/// default printing proceed. This is GLPK's own `glp_term_hook` polarity,
/// passed through unchanged.
pub type TermCallback = Box<dyn Fn(&str) -> bool + Send + Sync + 'static>;

type SharedCallback = Arc<dyn Fn(&str) -> bool + Send + Sync + 'static>;

struct HookState {
    callback: Option<SharedCallback>,
    output_enabled: bool,
}

static HOOK: Mutex<HookState> = Mutex::new(HookState {
    callback: None,
    output_enabled: true,
});

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

fn lock_state() -> MutexGuard<'static, HookState> {
    HOOK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Access to the process-wide hook for engine `E`.
///
/// Engine output is delivered synchronously on the thread that produced it.
/// The callback runs outside the slot lock, so it may itself install or
/// clear the hook.
pub struct TerminalHook<E: Engine> {
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> TerminalHook<E> {
    /// Enable or disable engine terminal output globally.
    pub fn set_output(enabled: bool) {
        let mut state = lock_state();
        E::term_out(enabled);
        state.output_enabled = enabled;
        debug!(
            component = "term",
            operation = "set_output",
            status = "success",
            engine = E::NAME,
            enabled,
            "Terminal output toggled"
        );
    }

    /// Last value written with [`TerminalHook::set_output`] (`true` initially).
    pub fn output_enabled() -> bool {
        lock_state().output_enabled
    }

    /// Install `callback`, or clear the slot with `None`.
    ///
    /// Installing stores the callback before registering the trampoline;
    /// clearing unregisters the trampoline before emptying the slot. Once
    /// this returns, a replaced callback is never invoked for later output.
    pub fn set_hook(callback: Option<TermCallback>) {
        let previous = {
            let mut state = lock_state();
            match callback {
                Some(callback) => {
                    let previous = state.callback.replace(Arc::from(callback));
                    E::term_hook(Some(trampoline::<E>));
                    previous
                }
                None => {
                    E::term_hook(None);
                    state.callback.take()
                }
            }
        };
        debug!(
            component = "term",
            operation = "set_hook",
            status = "success",
            engine = E::NAME,
            installed = Self::is_installed(),
            replaced = previous.is_some(),
            "Terminal hook updated"
        );
        // Dropped outside the lock; the closure's destructor is user code.
        drop(previous);
    }

    /// Install a callback.
    pub fn install<F>(callback: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::set_hook(Some(Box::new(callback)));
    }

    /// Clear the callback. Clearing an empty slot is a no-op.
    pub fn clear_hook() {
        Self::set_hook(None);
    }

    pub fn is_installed() -> bool {
        lock_state().callback.is_some()
    }
}

/// Puts the enclosing capture buffer back, on return or unwind.
struct CaptureGuard {
    previous: Option<Option<Vec<String>>>,
}

impl CaptureGuard {
    fn arm() -> Self {
        let previous = CAPTURE.with(|slot| slot.replace(Some(Vec::new())));
        Self {
            previous: Some(previous),
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.restore().unwrap_or_default()
    }

    fn restore(&mut self) -> Option<Vec<String>> {
        let previous = self.previous.take()?;
        CAPTURE.with(|slot| slot.replace(previous))
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Run `f`, collecting every chunk the trampoline sees on this thread.
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let guard = CaptureGuard::arm();
    let result = f();
    (result, guard.finish())
}

fn record(text: &str) {
    CAPTURE.with(|slot| {
        if let Ok(mut slot) = slot.try_borrow_mut() {
            if let Some(buffer) = slot.as_mut() {
                buffer.push(text.to_owned());
            }
        }
    });
}

fn dispatch<E: Engine>(text: &str) -> bool {
    record(text);
    let callback = {
        let state = lock_state();
        match state.callback.clone() {
            Some(callback) => callback,
            None => {
                // Stale registration: nothing to deliver to.
                E::term_hook(None);
                warn!(
                    component = "term",
                    operation = "dispatch",
                    status = "warn",
                    engine = E::NAME,
                    "Hook fired with empty slot; unregistered trampoline"
                );
                return false;
            }
        }
    };
    callback(text)
}

/// Registered with the engine; forwards output into the managed slot.
unsafe extern "C" fn trampoline<E: Engine>(_info: *mut c_void, text: *const c_char) -> c_int {
    if text.is_null() {
        return 0;
    }
    // SAFETY: the engine passes a NUL-terminated string valid for this call.
    let text = unsafe { CStr::from_ptr(text) }.to_string_lossy();
    match catch_unwind(AssertUnwindSafe(|| dispatch::<E>(&text))) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(_) => {
            warn!(
                component = "term",
                operation = "dispatch",
                status = "error",
                engine = E::NAME,
                "Terminal callback panicked; treating output as not handled"
            );
            0
        }
    }
}
