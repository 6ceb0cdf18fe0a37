//! Ctrl-C handling for long scans.
//!
//! The handler only sets a flag; the scan engine polls it through a plain
//! `Fn() -> bool` and unwinds on its own.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{self, SigHandler, Signal};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Route SIGINT to the interrupt flag instead of terminating.
pub fn install_interrupt_handler() -> nix::Result<()> {
    clear_interrupt();
    // SAFETY: the handler only touches an atomic, which is async-signal-safe
    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::Handler(handle_interrupt))?;
    }
    Ok(())
}

/// Put SIGINT back to its default (terminate) behaviour.
pub fn restore_default_interrupt() -> nix::Result<()> {
    // SAFETY: restoring the default disposition installs no Rust code
    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::SigDfl)?;
    }
    Ok(())
}

/// True once SIGINT has arrived since the last clear.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

pub fn clear_interrupt() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

extern "C" fn handle_interrupt(_: i32) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}
