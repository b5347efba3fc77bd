// Termination requests
//
// SIGINT and SIGTERM only set a flag; the main loop notices it between
// frames, stops, and powers the panel off on its way out.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set from the signal handler
static SIGNALLED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    SIGNALLED.store(true, Ordering::SeqCst);
}

fn install_handler(signal: libc::c_int) -> io::Result<()> {
    // SAFETY: the handler only touches an atomic, which is async-signal-safe
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);

        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Shared stop flag for the main loop
///
/// Cloning shares the flag. A handle created with `from_signals` also
/// reports SIGINT/SIGTERM.
#[derive(Debug, Clone, Default)]
pub struct Termination {
    flag: Arc<AtomicBool>,
    watch_signals: bool,
}

impl Termination {
    /// A flag that is only set through `request`
    pub fn new() -> Self {
        Self::default()
    }

    /// Install SIGINT and SIGTERM handlers and watch for them
    pub fn from_signals() -> io::Result<Self> {
        install_handler(libc::SIGINT)?;
        install_handler(libc::SIGTERM)?;
        Ok(Self {
            flag: Arc::new(AtomicBool::new(false)),
            watch_signals: true,
        })
    }

    /// Ask the loop to stop
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested or a termination signal arrived
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || (self.watch_signals && SIGNALLED.load(Ordering::SeqCst))
    }
}
