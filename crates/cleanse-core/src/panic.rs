//! Panic capture at the phase boundary.
//!
//! A chained panic hook records a forced backtrace for the panicking thread,
//! so a caught panic carries real frames into its error record.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static BACKTRACE_HOOK: Once = Once::new();

/// A panic caught by [`catch_panic`].
#[derive(Debug, Clone)]
pub(crate) struct CaughtPanic {
    pub message: String,
    pub backtrace: Option<String>,
}

fn install_backtrace_hook() {
    BACKTRACE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

/// Run `f`, turning a panic into its message and backtrace.
pub(crate) fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, CaughtPanic> {
    install_backtrace_hook();
    LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = None);
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| CaughtPanic {
        message: panic_message(payload.as_ref()),
        backtrace: LAST_BACKTRACE.with(|slot| slot.borrow_mut().take()),
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
