//! Deterministic teardown when the driver is killed.
//!
//! The handler releases the grab on the touchpad and destroys the virtual
//! device directly with `ioctl`, then exits. Both calls are async-signal-safe,
//! so nothing depends on the blocking read ever returning.

use std::io;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};

/// `_IOW('E', 0x90, int)`
const EVIOCGRAB: libc::c_ulong = 0x4004_4590;
/// `_IO('U', 2)`
const UI_DEV_DESTROY: libc::c_ulong = 0x5502;

const SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

static TOUCHPAD_FD: AtomicI32 = AtomicI32::new(-1);
static UINPUT_FD: AtomicI32 = AtomicI32::new(-1);

/// Install handlers for SIGINT, SIGTERM and SIGHUP tearing down the given fds.
pub fn install(touchpad: RawFd, uinput: RawFd) -> io::Result<()> {
    TOUCHPAD_FD.store(touchpad, Ordering::SeqCst);
    UINPUT_FD.store(uinput, Ordering::SeqCst);

    for sig in SIGNALS {
        // SAFETY: the action is fully initialised and the handler only makes
        // async-signal-safe calls.
        let rc = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handle_signal as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(sig, &action, std::ptr::null_mut())
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    log::debug!("Shutdown handlers installed");
    Ok(())
}

/// Forget the fds before they are closed by the regular drop path.
pub fn disarm() {
    TOUCHPAD_FD.store(-1, Ordering::SeqCst);
    UINPUT_FD.store(-1, Ordering::SeqCst);
}

extern "C" fn handle_signal(sig: libc::c_int) {
    let touchpad = TOUCHPAD_FD.swap(-1, Ordering::SeqCst);
    let uinput = UINPUT_FD.swap(-1, Ordering::SeqCst);
    // SAFETY: ioctl and _exit are async-signal-safe; stale fds only yield EBADF.
    unsafe {
        if touchpad >= 0 {
            libc::ioctl(touchpad, EVIOCGRAB as _, 0 as libc::c_int);
        }
        if uinput >= 0 {
            libc::ioctl(uinput, UI_DEV_DESTROY as _);
        }
        libc::_exit(128 + sig);
    }
}
