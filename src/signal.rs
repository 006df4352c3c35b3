//! Crash-signal fallback.
//!
//! A memory-safety fault cannot be recovered; the handler emits one fixed
//! bug-report notice and terminates the process with a failure status. The
//! handler body is restricted to async-signal-safe calls: an atomic
//! re-entrancy guard, a raw write, `_exit`.

#[cfg(unix)]
mod imp {
    use std::sync::atomic::{AtomicBool, Ordering};

    // Keeps the fallback message atomic if the handler is entered twice.
    static FATAL_GUARD: AtomicBool = AtomicBool::new(false);

    const FATAL_MESSAGE: &[u8] = b"\n\n[rill] rill encountered a fatal error. \
Please submit a bug report, at: https://github.com/rill-lang/rill/issues\n\n";

    extern "C" fn fatal_handler(
        _signal: libc::c_int,
        _info: *mut libc::siginfo_t,
        _context: *mut libc::c_void,
    ) {
        if !FATAL_GUARD.swap(true, Ordering::SeqCst) {
            // SAFETY: write(2) on a fixed buffer is async-signal-safe.
            unsafe {
                let _ = libc::write(
                    libc::STDERR_FILENO,
                    FATAL_MESSAGE.as_ptr().cast(),
                    FATAL_MESSAGE.len(),
                );
            }
        }
        // SAFETY: _exit(2) is async-signal-safe and does not return.
        unsafe { libc::_exit(1) }
    }

    /// Install the SIGSEGV fallback handler.
    pub fn install() {
        type Handler = extern "C" fn(libc::c_int, *mut libc::siginfo_t, *mut libc::c_void);
        // SAFETY: sigaction is initialized to zero before every field we set,
        // and the handler only performs async-signal-safe calls.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = fatal_handler as Handler as usize;
            action.sa_flags = libc::SA_SIGINFO;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(libc::SIGSEGV, &action, std::ptr::null_mut());
        }
    }
}

#[cfg(unix)]
pub use imp::install;

/// No crash-signal fallback outside unix.
#[cfg(not(unix))]
pub fn install() {}
