// signals.rs

//! SIGINT handling. The handler only raises a flag; the shell loop notices it
//! at its next safe point and prints the help listing there.

use std::sync::atomic::{AtomicBool, Ordering};

use log::trace;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::ShellError;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Installs the handler without `SA_RESTART`, so a blocking read on stdin
/// fails with `EINTR` and the loop gets to react.
pub fn install_interrupt_handler() -> Result<(), ShellError> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGINT, &action) }.map_err(ShellError::Signal)?;
    trace!("SIGINT handler installed");
    Ok(())
}

/// Returns whether an interrupt arrived since the last call, clearing it.
pub fn take_pending() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
